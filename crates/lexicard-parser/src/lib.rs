//! Digest parser for Lexicard
//!
//! Pure text → [`DigestEntry`](lexicard_core::DigestEntry) transform. See
//! [`digest`] for the accepted format.

pub mod digest;

pub use digest::{is_reference_line, parse, parse_at, parse_with_stats, ParseStats};
