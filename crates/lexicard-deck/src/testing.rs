//! In-memory note store for tests
//!
//! Answers the same exact-match queries the reconciler builds and records
//! every mutating call.

use crate::naming::note_query;
use async_trait::async_trait;
use lexicard_core::{DeckClient, DeckError, DeckResult, NewNote, NoteId, RemoteNote};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

/// A mutating call seen by [`FakeDeck`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckCall {
    EnsureDeck(String),
    AddNote { deck: String, word: String },
    UpdateFields { note_id: NoteId, fields: BTreeMap<String, String> },
    UpdateTags { note_id: NoteId, tags: BTreeSet<String> },
    Sync,
}

#[derive(Debug, Clone)]
struct StoredNote {
    deck: String,
    note: RemoteNote,
}

#[derive(Debug, Default)]
struct FakeState {
    decks: BTreeSet<String>,
    notes: BTreeMap<NoteId, StoredNote>,
    next_id: NoteId,
    clock: i64,
    calls: Vec<DeckCall>,
    fail_search_for: HashSet<String>,
    fail_fetch: bool,
    fail_add: bool,
    fail_update_fields: bool,
    fail_sync: bool,
}

/// Fake [`DeckClient`] keyed on one headword field
#[derive(Debug, Clone)]
pub struct FakeDeck {
    word_field: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakeDeck {
    pub fn new(word_field: &str) -> Self {
        Self {
            word_field: word_field.to_string(),
            state: Arc::new(Mutex::new(FakeState {
                next_id: 1,
                ..FakeState::default()
            })),
        }
    }

    /// Make `find_notes` fail for queries on `word`
    pub fn fail_search_for(self, word: &str) -> Self {
        self.state.lock().fail_search_for.insert(word.to_string());
        self
    }

    pub fn fail_fetch(self) -> Self {
        self.state.lock().fail_fetch = true;
        self
    }

    pub fn fail_add(self) -> Self {
        self.state.lock().fail_add = true;
        self
    }

    pub fn fail_update_fields(self) -> Self {
        self.state.lock().fail_update_fields = true;
        self
    }

    pub fn fail_sync(self) -> Self {
        self.state.lock().fail_sync = true;
        self
    }

    /// Insert a note directly, as if created by hand in the remote store
    pub fn seed_note(
        &self,
        deck: &str,
        model_name: &str,
        fields: BTreeMap<String, String>,
        tags: &[&str],
        modified: i64,
    ) -> NoteId {
        let mut state = self.state.lock();
        let note_id = state.next_id;
        state.next_id += 1;
        state.decks.insert(deck.to_string());
        state.notes.insert(
            note_id,
            StoredNote {
                deck: deck.to_string(),
                note: RemoteNote {
                    note_id,
                    model_name: model_name.to_string(),
                    fields,
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                    modified,
                },
            },
        );
        note_id
    }

    pub fn calls(&self) -> Vec<DeckCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn decks(&self) -> BTreeSet<String> {
        self.state.lock().decks.clone()
    }

    pub fn note(&self, note_id: NoteId) -> Option<RemoteNote> {
        self.state.lock().notes.get(&note_id).map(|n| n.note.clone())
    }

    pub fn notes_in(&self, deck: &str) -> Vec<RemoteNote> {
        self.state
            .lock()
            .notes
            .values()
            .filter(|n| n.deck == deck)
            .map(|n| n.note.clone())
            .collect()
    }

    /// Change a field as a user editing in the remote store would
    pub fn edit_field(&self, note_id: NoteId, field: &str, value: &str) {
        let mut state = self.state.lock();
        state.clock += 1;
        let clock = state.clock;
        if let Some(stored) = state.notes.get_mut(&note_id) {
            stored.note.fields.insert(field.to_string(), value.to_string());
            stored.note.modified = clock;
        }
    }

    pub fn count(&self, predicate: impl Fn(&DeckCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| predicate(c)).count()
    }
}

#[async_trait]
impl DeckClient for FakeDeck {
    async fn ensure_deck(&self, deck_name: &str) -> DeckResult<()> {
        let mut state = self.state.lock();
        state.calls.push(DeckCall::EnsureDeck(deck_name.to_string()));
        state.decks.insert(deck_name.to_string());
        Ok(())
    }

    async fn find_notes(&self, query: &str) -> DeckResult<Vec<NoteId>> {
        let state = self.state.lock();
        if state
            .fail_search_for
            .iter()
            .any(|word| query.ends_with(&format!(":{word}\"")))
        {
            return Err(DeckError::Transport("search failed".to_string()));
        }
        Ok(state
            .notes
            .values()
            .filter(|stored| {
                let word = stored.note.field(&self.word_field);
                note_query(&stored.deck, &stored.note.model_name, &self.word_field, word) == query
            })
            .map(|stored| stored.note.note_id)
            .collect())
    }

    async fn notes_info(&self, note_ids: &[NoteId]) -> DeckResult<Vec<RemoteNote>> {
        let state = self.state.lock();
        if state.fail_fetch {
            return Err(DeckError::Transport("fetch failed".to_string()));
        }
        Ok(note_ids
            .iter()
            .filter_map(|id| state.notes.get(id).map(|n| n.note.clone()))
            .collect())
    }

    async fn add_note(&self, note: &NewNote) -> DeckResult<NoteId> {
        let mut state = self.state.lock();
        if state.fail_add {
            return Err(DeckError::Api("cannot create note".to_string()));
        }
        let word = note.fields.get(&self.word_field).cloned().unwrap_or_default();
        state.calls.push(DeckCall::AddNote {
            deck: note.deck_name.clone(),
            word,
        });

        let note_id = state.next_id;
        state.next_id += 1;
        state.clock += 1;
        let modified = state.clock;
        state.notes.insert(
            note_id,
            StoredNote {
                deck: note.deck_name.clone(),
                note: RemoteNote {
                    note_id,
                    model_name: note.model_name.clone(),
                    fields: note.fields.clone(),
                    tags: note.tags.iter().cloned().collect(),
                    modified,
                },
            },
        );
        Ok(note_id)
    }

    async fn update_note_fields(
        &self,
        note_id: NoteId,
        fields: &BTreeMap<String, String>,
    ) -> DeckResult<()> {
        let mut state = self.state.lock();
        if state.fail_update_fields {
            return Err(DeckError::Api("cannot update note".to_string()));
        }
        state.calls.push(DeckCall::UpdateFields {
            note_id,
            fields: fields.clone(),
        });
        state.clock += 1;
        let clock = state.clock;
        let stored = state
            .notes
            .get_mut(&note_id)
            .ok_or_else(|| DeckError::Api(format!("note {note_id} not found")))?;
        stored.note.fields.extend(fields.clone());
        stored.note.modified = clock;
        Ok(())
    }

    async fn update_note_tags(&self, note_id: NoteId, tags: &BTreeSet<String>) -> DeckResult<()> {
        let mut state = self.state.lock();
        state.calls.push(DeckCall::UpdateTags {
            note_id,
            tags: tags.clone(),
        });
        let stored = state
            .notes
            .get_mut(&note_id)
            .ok_or_else(|| DeckError::Api(format!("note {note_id} not found")))?;
        stored.note.tags = tags.iter().cloned().collect();
        Ok(())
    }

    async fn sync(&self) -> DeckResult<()> {
        let mut state = self.state.lock();
        state.calls.push(DeckCall::Sync);
        if state.fail_sync {
            return Err(DeckError::Transport("sync failed".to_string()));
        }
        Ok(())
    }
}
