//! Domain Model
//!
//! Records shared by every stage of the digest pipeline:
//!
//! - [`DigestEntry`] - one vocabulary word captured from a digest file
//! - [`FileRecord`] - last-seen content fingerprint of a watched file
//! - [`EnrichedCard`] - generated flashcard content for a (word, source) pair
//! - [`CardDraft`] - provider output before it becomes an [`EnrichedCard`]
//!
//! The remote note view lives in [`crate::deck`] because it is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single vocabulary word captured from a digest file.
///
/// The ledger key is the word alone; an entry is immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEntry {
    /// Headword, trimmed
    pub word: String,

    /// Display text of the reference line (the book the word came from), trimmed
    pub book_filename: String,

    /// Path of the digest file the entry was ingested from
    pub source_file: String,

    /// When the entry was parsed
    pub created_at: DateTime<Utc>,
}

impl DigestEntry {
    /// Create an entry, trimming the word and book title
    pub fn new(
        word: impl AsRef<str>,
        book_filename: impl AsRef<str>,
        source_file: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            word: word.as_ref().trim().to_string(),
            book_filename: book_filename.as_ref().trim().to_string(),
            source_file: source_file.into(),
            created_at,
        }
    }
}

/// Last observed state of a watched digest file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path of the file (identity)
    pub path: String,

    /// BLAKE3 hex digest of the file content
    pub fingerprint: String,

    /// When the fingerprint was last written
    pub last_seen: DateTime<Utc>,
}

/// Closed set of parts of speech a card may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adj,
    Adv,
    Prep,
    Pron,
    Conj,
    Det,
    Interj,
    Phrase,
}

impl PartOfSpeech {
    /// All variants, in declaration order
    pub const ALL: [PartOfSpeech; 10] = [
        Self::Noun,
        Self::Verb,
        Self::Adj,
        Self::Adv,
        Self::Prep,
        Self::Pron,
        Self::Conj,
        Self::Det,
        Self::Interj,
        Self::Phrase,
    ];

    /// Short lowercase tag used in storage and prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adj => "adj",
            Self::Adv => "adv",
            Self::Prep => "prep",
            Self::Pron => "pron",
            Self::Conj => "conj",
            Self::Det => "det",
            Self::Interj => "interj",
            Self::Phrase => "phrase",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a part-of-speech label is outside the closed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown part of speech: {0}")]
pub struct UnknownPartOfSpeech(pub String);

impl FromStr for PartOfSpeech {
    type Err = UnknownPartOfSpeech;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_end_matches('.').to_ascii_lowercase();
        let pos = match normalized.as_str() {
            "noun" | "n" => Self::Noun,
            "verb" | "v" => Self::Verb,
            "adj" | "adjective" => Self::Adj,
            "adv" | "adverb" => Self::Adv,
            "prep" | "preposition" => Self::Prep,
            "pron" | "pronoun" => Self::Pron,
            "conj" | "conjunction" => Self::Conj,
            "det" | "determiner" | "article" => Self::Det,
            "interj" | "interjection" => Self::Interj,
            "phrase" | "idiom" | "expression" => Self::Phrase,
            _ => return Err(UnknownPartOfSpeech(s.to_string())),
        };
        Ok(pos)
    }
}

/// Generated card content for a (word, source title) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedCard {
    pub word: String,
    pub source_title: String,
    pub canonical_answer: String,
    pub alternate_answer: Option<String>,
    pub part_of_speech: PartOfSpeech,
    pub definition: String,
    pub example_sentence: String,
    pub hint: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EnrichedCard {
    /// Build a card from a provider draft, pinning it to `source_title`.
    ///
    /// The draft's own source title is ignored so that card identity always
    /// matches the batch that requested it.
    pub fn from_draft(draft: CardDraft, source_title: &str, now: DateTime<Utc>) -> Self {
        Self {
            word: draft.word.trim().to_string(),
            source_title: source_title.to_string(),
            canonical_answer: draft.canonical_answer,
            alternate_answer: draft.alternate_answer.filter(|a| !a.trim().is_empty()),
            part_of_speech: draft.part_of_speech,
            definition: draft.definition,
            example_sentence: draft.example_sentence,
            hint: draft.hint,
            created_at: now,
            updated_at: now,
        }
    }

    /// Identity key of the card
    pub fn key(&self) -> (&str, &str) {
        (&self.word, &self.source_title)
    }
}

/// One generated item as returned by an enrichment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub word: String,
    pub canonical_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_answer: Option<String>,
    pub part_of_speech: PartOfSpeech,
    pub definition: String,
    pub example_sentence: String,
    pub source_title: String,
    pub hint: String,
}
