//! Reconciliation errors

use lexicard_core::{DeckError, StorageError};
use thiserror::Error;

/// Why a push stopped early
///
/// Notes created or updated before the failure stay in the remote store.
#[derive(Error, Debug, Clone)]
pub enum ReconcileError {
    #[error("Failed to ensure deck '{deck}': {error}")]
    EnsureDeck {
        deck: String,
        #[source]
        error: DeckError,
    },

    #[error("Failed to create note for '{word}' ({source_title}): {error}")]
    Create {
        word: String,
        source_title: String,
        #[source]
        error: DeckError,
    },

    #[error("Failed to update note {note_id} for '{word}' ({source_title}): {error}")]
    Update {
        note_id: u64,
        word: String,
        source_title: String,
        #[source]
        error: DeckError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for reconciler operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
