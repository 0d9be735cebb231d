//! # Lexicard Deck
//!
//! Mirrors locally stored cards into a remote note store.
//!
//! - [`AnkiConnectClient`] implements [`DeckClient`](lexicard_core::DeckClient)
//!   over the AnkiConnect JSON protocol
//! - [`DeckReconciler`] diffs local cards against existing notes and pushes
//!   only what changed
//! - [`naming`] holds deck, tag and search-query construction

pub mod anki_connect;
pub mod error;
pub mod naming;
pub mod reconciler;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use anki_connect::{AnkiConnectClient, API_VERSION, DEFAULT_ENDPOINT};
pub use error::{ReconcileError, ReconcileResult};
pub use reconciler::{DeckReconciler, NoteFields, PushSummary, ReconcilerConfig};
