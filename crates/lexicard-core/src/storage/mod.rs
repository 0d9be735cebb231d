//! Store Contracts
//!
//! Three stores back the pipeline, all reached through one shared handle that
//! the top-level process constructs and injects:
//!
//! - [`FileLedger`] - last-seen fingerprint per watched path
//! - [`EntryStore`] - deduplicated vocabulary entries, keyed by word
//! - [`CardStore`] - enriched cards, keyed by (word, source title)
//!
//! Insert-or-replace ([`FileLedger::upsert_fingerprint`], [`CardStore::upsert`])
//! is part of the base contract, so callers never check for optional methods.
//! Backends live in other crates (`lexicard-sqlite`); [`memory`] provides
//! in-memory implementations for tests and ephemeral runs.

pub mod error;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryCardStore, InMemoryEntryStore, InMemoryFileLedger};

use crate::model::{DigestEntry, EnrichedCard, FileRecord};
use async_trait::async_trait;

/// Tracks the last-seen content fingerprint of each watched path.
#[async_trait]
pub trait FileLedger: Send + Sync {
    /// Insert or replace the fingerprint for `path`.
    ///
    /// Repeated calls for the same path never fail on a uniqueness conflict;
    /// the stored fingerprint and `last_seen` are overwritten.
    async fn upsert_fingerprint(&self, path: &str, fingerprint: &str)
        -> StorageResult<FileRecord>;

    /// Get the record for `path`, if it was ever seen
    async fn lookup(&self, path: &str) -> StorageResult<Option<FileRecord>>;

    /// All tracked records, ordered by path
    async fn list(&self) -> StorageResult<Vec<FileRecord>>;

    /// Drop the record for `path`. Returns whether a record existed.
    async fn forget(&self, path: &str) -> StorageResult<bool>;
}

/// Persists deduplicated vocabulary entries.
///
/// There is no update-in-place: once recorded, an entry's book and source
/// file never change.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert `entry` unless its word is already present.
    ///
    /// Returns `false` for an existing word; that is not an error.
    async fn insert_if_absent(&self, entry: &DigestEntry) -> StorageResult<bool>;

    /// Insert every entry whose word is absent, as one unit.
    ///
    /// Duplicate words (already stored, or repeated within `entries`) are
    /// skipped. Any other failure rolls back the whole batch.
    async fn insert_many_if_absent(&self, entries: &[DigestEntry]) -> StorageResult<usize>;

    /// All entries, in insertion order
    async fn find_all(&self) -> StorageResult<Vec<DigestEntry>>;

    /// Entries recorded under `book_filename`
    async fn find_by_book(&self, book_filename: &str) -> StorageResult<Vec<DigestEntry>>;

    /// The entry for `word`, if any
    async fn find_by_word(&self, word: &str) -> StorageResult<Option<DigestEntry>>;

    /// Whether `word` is recorded
    async fn exists(&self, word: &str) -> StorageResult<bool>;

    /// Remove the entry for `word`. Returns whether an entry existed.
    async fn delete_by_word(&self, word: &str) -> StorageResult<bool>;
}

/// Persists enriched cards keyed by (word, source title).
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Insert `card` unless its (word, source) pair exists
    async fn insert_if_absent(&self, card: &EnrichedCard) -> StorageResult<bool>;

    /// Insert every absent card as one unit; existing pairs are never overwritten
    async fn insert_many_if_absent(&self, cards: &[EnrichedCard]) -> StorageResult<usize>;

    /// Insert or replace. On replace every content field and `updated_at` are
    /// overwritten while the original `created_at` is kept.
    async fn upsert(&self, card: &EnrichedCard) -> StorageResult<()>;

    /// Whether a card exists for (word, source)
    async fn exists(&self, word: &str, source_title: &str) -> StorageResult<bool>;

    /// The card for (word, source), if any
    async fn find(&self, word: &str, source_title: &str) -> StorageResult<Option<EnrichedCard>>;

    /// All cards for a source title, ordered by word
    async fn find_by_source(&self, source_title: &str) -> StorageResult<Vec<EnrichedCard>>;

    /// Distinct source titles that have at least one card, sorted
    async fn list_sources(&self) -> StorageResult<Vec<String>>;
}
