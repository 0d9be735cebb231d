//! # Lexicard Watch
//!
//! Finds digest files in a directory and reports when they change.
//!
//! - [`scan_existing`] lists matching files once, for the startup pass
//! - [`DigestWatcher`] delivers debounced create/modify paths over a tokio
//!   channel until dropped

pub mod error;
pub mod matcher;
pub mod scanner;
pub mod watcher;

pub use error::{WatchError, WatchResult};
pub use matcher::DigestMatcher;
pub use scanner::scan_existing;
pub use watcher::{digest_paths, DigestWatcher, WatchOptions};
