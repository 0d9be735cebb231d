//! In-memory store implementations
//!
//! Useful for tests and for runs where persistence isn't needed. Clones share
//! the same underlying data.

use super::{CardStore, EntryStore, FileLedger, StorageResult};
use crate::model::{DigestEntry, EnrichedCard, FileRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory [`FileLedger`]
#[derive(Clone, Default)]
pub struct InMemoryFileLedger {
    records: Arc<RwLock<BTreeMap<String, FileRecord>>>,
}

impl InMemoryFileLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked paths
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl FileLedger for InMemoryFileLedger {
    async fn upsert_fingerprint(
        &self,
        path: &str,
        fingerprint: &str,
    ) -> StorageResult<FileRecord> {
        let record = FileRecord {
            path: path.to_string(),
            fingerprint: fingerprint.to_string(),
            last_seen: Utc::now(),
        };
        self.records
            .write()
            .await
            .insert(path.to_string(), record.clone());
        Ok(record)
    }

    async fn lookup(&self, path: &str) -> StorageResult<Option<FileRecord>> {
        Ok(self.records.read().await.get(path).cloned())
    }

    async fn list(&self) -> StorageResult<Vec<FileRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn forget(&self, path: &str) -> StorageResult<bool> {
        Ok(self.records.write().await.remove(path).is_some())
    }
}

/// In-memory [`EntryStore`]; keeps insertion order
#[derive(Clone, Default)]
pub struct InMemoryEntryStore {
    entries: Arc<RwLock<Vec<DigestEntry>>>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn insert_if_absent(&self, entry: &DigestEntry) -> StorageResult<bool> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.word == entry.word) {
            return Ok(false);
        }
        entries.push(entry.clone());
        Ok(true)
    }

    async fn insert_many_if_absent(&self, batch: &[DigestEntry]) -> StorageResult<usize> {
        // Single write lock for the whole batch
        let mut entries = self.entries.write().await;
        let mut seen: HashSet<String> = entries.iter().map(|e| e.word.clone()).collect();
        let mut inserted = 0;
        for entry in batch {
            if seen.insert(entry.word.clone()) {
                entries.push(entry.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn find_all(&self) -> StorageResult<Vec<DigestEntry>> {
        Ok(self.entries.read().await.clone())
    }

    async fn find_by_book(&self, book_filename: &str) -> StorageResult<Vec<DigestEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.book_filename == book_filename)
            .cloned()
            .collect())
    }

    async fn find_by_word(&self, word: &str) -> StorageResult<Option<DigestEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|e| e.word == word)
            .cloned())
    }

    async fn exists(&self, word: &str) -> StorageResult<bool> {
        Ok(self.entries.read().await.iter().any(|e| e.word == word))
    }

    async fn delete_by_word(&self, word: &str) -> StorageResult<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.word != word);
        Ok(entries.len() != before)
    }
}

/// In-memory [`CardStore`]
#[derive(Clone, Default)]
pub struct InMemoryCardStore {
    cards: Arc<RwLock<BTreeMap<(String, String), EnrichedCard>>>,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.cards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cards.read().await.is_empty()
    }

    fn key(card: &EnrichedCard) -> (String, String) {
        (card.word.clone(), card.source_title.clone())
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn insert_if_absent(&self, card: &EnrichedCard) -> StorageResult<bool> {
        let mut cards = self.cards.write().await;
        let key = Self::key(card);
        if cards.contains_key(&key) {
            return Ok(false);
        }
        cards.insert(key, card.clone());
        Ok(true)
    }

    async fn insert_many_if_absent(&self, batch: &[EnrichedCard]) -> StorageResult<usize> {
        let mut cards = self.cards.write().await;
        let mut inserted = 0;
        for card in batch {
            let key = Self::key(card);
            if !cards.contains_key(&key) {
                cards.insert(key, card.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn upsert(&self, card: &EnrichedCard) -> StorageResult<()> {
        let mut cards = self.cards.write().await;
        let key = Self::key(card);
        let mut stored = card.clone();
        if let Some(existing) = cards.get(&key) {
            stored.created_at = existing.created_at;
        }
        cards.insert(key, stored);
        Ok(())
    }

    async fn exists(&self, word: &str, source_title: &str) -> StorageResult<bool> {
        Ok(self
            .cards
            .read()
            .await
            .contains_key(&(word.to_string(), source_title.to_string())))
    }

    async fn find(&self, word: &str, source_title: &str) -> StorageResult<Option<EnrichedCard>> {
        Ok(self
            .cards
            .read()
            .await
            .get(&(word.to_string(), source_title.to_string()))
            .cloned())
    }

    async fn find_by_source(&self, source_title: &str) -> StorageResult<Vec<EnrichedCard>> {
        Ok(self
            .cards
            .read()
            .await
            .values()
            .filter(|c| c.source_title == source_title)
            .cloned()
            .collect())
    }

    async fn list_sources(&self) -> StorageResult<Vec<String>> {
        let sources: BTreeSet<String> = self
            .cards
            .read()
            .await
            .values()
            .map(|c| c.source_title.clone())
            .collect();
        Ok(sources.into_iter().collect())
    }
}
