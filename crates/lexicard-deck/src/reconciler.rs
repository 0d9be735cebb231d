//! Deck Reconciler
//!
//! Pushes local cards into the remote note store, one deck per source title.
//! A card is matched to an existing note by deck, note type and the exact
//! headword field value. Matched notes receive only the fields that differ;
//! unmatched cards become new notes.
//!
//! Search and fetch failures skip the affected card. Create and update
//! failures abort the push.

use crate::error::{ReconcileError, ReconcileResult};
use crate::naming::{deck_name, note_query, tag};
use lexicard_core::{CardStore, DeckClient, EnrichedCard, NewNote, RemoteNote};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Note field names each card attribute is written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFields {
    pub word: String,
    pub answer: String,
    pub alternate_answer: String,
    pub part_of_speech: String,
    pub definition: String,
    pub example: String,
    pub hint: String,
    pub source: String,
}

impl Default for NoteFields {
    fn default() -> Self {
        Self {
            word: "Word".to_string(),
            answer: "Answer".to_string(),
            alternate_answer: "AlternateAnswer".to_string(),
            part_of_speech: "PartOfSpeech".to_string(),
            definition: "Definition".to_string(),
            example: "Example".to_string(),
            hint: "Hint".to_string(),
            source: "Source".to_string(),
        }
    }
}

/// Reconciler settings
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Parent deck name; empty puts each source deck at the top level
    pub deck_prefix: String,
    pub note_type: String,
    pub fields: NoteFields,
    /// Tags every pushed note carries, besides the source tag
    pub base_tags: Vec<String>,
    /// Ask the store to sync when a push changed something
    pub sync_after_push: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            deck_prefix: "Vocabulary".to_string(),
            note_type: "Lexicard".to_string(),
            fields: NoteFields::default(),
            base_tags: vec!["lexicard".to_string()],
            sync_after_push: true,
        }
    }
}

/// Outcome of [`DeckReconciler::push_for_sources`], counted per card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    pub created: usize,
    /// Existing notes whose fields changed
    pub updated: usize,
    /// Existing notes already matching
    pub unchanged: usize,
    /// Cards skipped after a search or fetch failure
    pub skipped: usize,
    /// Whether a sync was requested and succeeded
    pub synced: bool,
}

impl PushSummary {
    pub fn changed(&self) -> usize {
        self.created + self.updated
    }
}

enum CardOutcome {
    Created,
    Updated,
    Unchanged,
    Skipped,
}

/// Diff-based push of local cards to a [`DeckClient`]
pub struct DeckReconciler {
    client: Arc<dyn DeckClient>,
    cards: Arc<dyn CardStore>,
    config: ReconcilerConfig,
}

impl DeckReconciler {
    pub fn new(
        client: Arc<dyn DeckClient>,
        cards: Arc<dyn CardStore>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            client,
            cards,
            config,
        }
    }

    /// Push every local card of the given sources
    pub async fn push_for_sources(&self, source_titles: &[String]) -> ReconcileResult<PushSummary> {
        let start = Instant::now();
        let mut summary = PushSummary::default();

        for source_title in source_titles {
            self.push_source(source_title, &mut summary).await?;
        }

        if summary.changed() > 0 && self.config.sync_after_push {
            match self.client.sync().await {
                Ok(()) => summary.synced = true,
                Err(e) => warn!(error = %e, "Deck sync failed"),
            }
        }

        info!(
            sources = source_titles.len(),
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            skipped = summary.skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Push complete"
        );
        Ok(summary)
    }

    async fn push_source(&self, source_title: &str, summary: &mut PushSummary) -> ReconcileResult<()> {
        let deck = deck_name(&self.config.deck_prefix, source_title);
        self.client
            .ensure_deck(&deck)
            .await
            .map_err(|error| ReconcileError::EnsureDeck {
                deck: deck.clone(),
                error,
            })?;

        let cards = self.cards.find_by_source(source_title).await?;
        if cards.is_empty() {
            debug!(source = source_title, "No local cards to push");
            return Ok(());
        }
        debug!(deck = %deck, cards = cards.len(), "Pushing source");

        for card in &cards {
            match self.push_card(&deck, card).await? {
                CardOutcome::Created => summary.created += 1,
                CardOutcome::Updated => summary.updated += 1,
                CardOutcome::Unchanged => summary.unchanged += 1,
                CardOutcome::Skipped => summary.skipped += 1,
            }
        }
        Ok(())
    }

    async fn push_card(&self, deck: &str, card: &EnrichedCard) -> ReconcileResult<CardOutcome> {
        let fields = self.desired_fields(card);
        let tags = self.desired_tags(card);

        let Some(existing) = self.find_existing(deck, card).await else {
            return Ok(CardOutcome::Skipped);
        };

        let Some(note) = existing else {
            let note = NewNote {
                deck_name: deck.to_string(),
                model_name: self.config.note_type.clone(),
                fields,
                tags,
            };
            let note_id = self
                .client
                .add_note(&note)
                .await
                .map_err(|error| ReconcileError::Create {
                    word: card.word.clone(),
                    source_title: card.source_title.clone(),
                    error,
                })?;
            debug!(word = %card.word, note_id, "Created note");
            return Ok(CardOutcome::Created);
        };

        let update_error = |error| ReconcileError::Update {
            note_id: note.note_id,
            word: card.word.clone(),
            source_title: card.source_title.clone(),
            error,
        };

        let changed = changed_fields(&fields, &note);
        let outcome = if changed.is_empty() {
            CardOutcome::Unchanged
        } else {
            self.client
                .update_note_fields(note.note_id, &changed)
                .await
                .map_err(update_error)?;
            debug!(word = %card.word, note_id = note.note_id, fields = changed.len(), "Updated note");
            CardOutcome::Updated
        };

        let mut all_tags: BTreeSet<String> = note.tags.iter().cloned().collect();
        all_tags.extend(tags);
        self.client
            .update_note_tags(note.note_id, &all_tags)
            .await
            .map_err(update_error)?;

        Ok(outcome)
    }

    /// `None` when the lookup failed, `Some(None)` when nothing matched
    async fn find_existing(&self, deck: &str, card: &EnrichedCard) -> Option<Option<RemoteNote>> {
        let query = note_query(deck, &self.config.note_type, &self.config.fields.word, &card.word);

        let ids = match self.client.find_notes(&query).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(word = %card.word, deck, error = %e, "Note search failed, skipping card");
                return None;
            }
        };
        if ids.is_empty() {
            return Some(None);
        }

        match self.client.notes_info(&ids).await {
            Ok(notes) => Some(notes.into_iter().max_by_key(|n| n.modified)),
            Err(e) => {
                warn!(word = %card.word, deck, error = %e, "Note fetch failed, skipping card");
                None
            }
        }
    }

    fn desired_fields(&self, card: &EnrichedCard) -> BTreeMap<String, String> {
        let names = &self.config.fields;
        BTreeMap::from([
            (names.word.clone(), card.word.clone()),
            (names.answer.clone(), card.canonical_answer.clone()),
            (
                names.alternate_answer.clone(),
                card.alternate_answer.clone().unwrap_or_default(),
            ),
            (
                names.part_of_speech.clone(),
                card.part_of_speech.as_str().to_string(),
            ),
            (names.definition.clone(), card.definition.clone()),
            (names.example.clone(), card.example_sentence.clone()),
            (names.hint.clone(), card.hint.clone()),
            (names.source.clone(), card.source_title.clone()),
        ])
    }

    fn desired_tags(&self, card: &EnrichedCard) -> BTreeSet<String> {
        self.config
            .base_tags
            .iter()
            .map(String::as_str)
            .map(tag)
            .chain(std::iter::once(tag(&card.source_title)))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Desired fields whose value differs from the note's current value
fn changed_fields(desired: &BTreeMap<String, String>, note: &RemoteNote) -> BTreeMap<String, String> {
    desired
        .iter()
        .filter(|(name, value)| note.field(name) != value.as_str())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_fields_only_reports_differences() {
        let desired = BTreeMap::from([
            ("Word".to_string(), "swoon".to_string()),
            ("Answer".to_string(), "faint".to_string()),
            ("Hint".to_string(), String::new()),
        ]);
        let note = RemoteNote {
            note_id: 7,
            model_name: "Lexicard".to_string(),
            fields: BTreeMap::from([
                ("Word".to_string(), "swoon".to_string()),
                ("Answer".to_string(), "pass out".to_string()),
            ]),
            tags: vec![],
            modified: 0,
        };

        let changed = changed_fields(&desired, &note);
        assert_eq!(
            changed,
            BTreeMap::from([("Answer".to_string(), "faint".to_string())])
        );
    }
}
