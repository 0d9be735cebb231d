//! Remote Deck Contract
//!
//! The reconciler pushes local cards into a spaced-repetition note store
//! through [`DeckClient`]. Notes are addressed by deck name, note type and the
//! value of the headword field; the store's wire protocol is up to the client
//! implementation (AnkiConnect in `lexicard-deck`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Identifier of a note in the remote store
pub type NoteId = u64;

/// Failures talking to the remote note store
#[derive(Error, Debug, Clone)]
pub enum DeckError {
    /// Could not reach the store
    #[error("Deck transport error: {0}")]
    Transport(String),

    /// The store answered with an error message
    #[error("Deck API error: {0}")]
    Api(String),

    #[error("Invalid deck response: {0}")]
    InvalidResponse(String),
}

/// Result type for deck client calls
pub type DeckResult<T> = Result<T, DeckError>;

/// Read-only view of a remote note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNote {
    pub note_id: NoteId,
    pub model_name: String,
    /// Field name to current value
    pub fields: BTreeMap<String, String>,
    pub tags: Vec<String>,
    /// Modification timestamp (seconds since epoch)
    pub modified: i64,
}

impl RemoteNote {
    /// Current value of a field, empty when the note lacks it
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

/// A note to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub deck_name: String,
    pub model_name: String,
    pub fields: BTreeMap<String, String>,
    pub tags: BTreeSet<String>,
}

/// Operations the reconciler needs from a remote note store
#[async_trait]
pub trait DeckClient: Send + Sync {
    /// Create the deck if it does not exist (idempotent)
    async fn ensure_deck(&self, deck_name: &str) -> DeckResult<()>;

    /// Ids of notes matching a store-specific search query
    async fn find_notes(&self, query: &str) -> DeckResult<Vec<NoteId>>;

    /// Current fields, tags and modification time of the given notes
    async fn notes_info(&self, note_ids: &[NoteId]) -> DeckResult<Vec<RemoteNote>>;

    /// Create a note; duplicates are checked within the target deck only
    async fn add_note(&self, note: &NewNote) -> DeckResult<NoteId>;

    /// Overwrite only the given fields of a note
    async fn update_note_fields(
        &self,
        note_id: NoteId,
        fields: &BTreeMap<String, String>,
    ) -> DeckResult<()>;

    /// Replace the tag set of a note
    async fn update_note_tags(&self, note_id: NoteId, tags: &BTreeSet<String>) -> DeckResult<()>;

    /// Ask the store to sync with its own upstream
    async fn sync(&self) -> DeckResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_reads_as_empty() {
        let note = RemoteNote {
            note_id: 1,
            model_name: "Vocab".to_string(),
            fields: BTreeMap::from([("Word".to_string(), "swoon".to_string())]),
            tags: vec![],
            modified: 0,
        };
        assert_eq!(note.field("Word"), "swoon");
        assert_eq!(note.field("Hint"), "");
    }
}
