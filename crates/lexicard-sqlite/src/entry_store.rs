//! SQLite-backed [`EntryStore`]

use crate::connection::SqlitePool;
use crate::error::join_error;
use crate::rows::{digest_entry, encode_time};
use async_trait::async_trait;
use lexicard_core::{DigestEntry, EntryStore, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

const INSERT_IF_ABSENT: &str = r#"
    INSERT INTO digest_entries (word, book_filename, source_file, created_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(word) DO NOTHING
"#;

const SELECT_ENTRY: &str =
    "SELECT word, book_filename, source_file, created_at FROM digest_entries";

/// Vocabulary entries stored in `digest_entries`
#[derive(Debug, Clone)]
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

impl SqliteEntryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn insert_one(conn: &Connection, entry: &DigestEntry) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        INSERT_IF_ABSENT,
        params![
            entry.word,
            entry.book_filename,
            entry.source_file,
            encode_time(&entry.created_at)
        ],
    )?;
    Ok(inserted > 0)
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn insert_if_absent(&self, entry: &DigestEntry) -> StorageResult<bool> {
        let pool = self.pool.clone();
        let entry = entry.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| Ok(insert_one(conn, &entry)?))
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn insert_many_if_absent(&self, entries: &[DigestEntry]) -> StorageResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }
        let pool = self.pool.clone();
        let entries = entries.to_vec();

        tokio::task::spawn_blocking(move || {
            pool.with_connection_mut(|conn| {
                let tx = conn.transaction()?;
                let mut inserted = 0;
                for entry in &entries {
                    if insert_one(&tx, entry)? {
                        inserted += 1;
                    }
                }
                tx.commit()?;
                debug!(offered = entries.len(), inserted, "Inserted digest entries");
                Ok(inserted)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn find_all(&self) -> StorageResult<Vec<DigestEntry>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let mut stmt = conn.prepare(&format!("{SELECT_ENTRY} ORDER BY id"))?;
                let entries = stmt
                    .query_map([], digest_entry)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(entries)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn find_by_book(&self, book_filename: &str) -> StorageResult<Vec<DigestEntry>> {
        let pool = self.pool.clone();
        let book = book_filename.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let mut stmt =
                    conn.prepare(&format!("{SELECT_ENTRY} WHERE book_filename = ?1 ORDER BY id"))?;
                let entries = stmt
                    .query_map([&book], digest_entry)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(entries)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn find_by_word(&self, word: &str) -> StorageResult<Option<DigestEntry>> {
        let pool = self.pool.clone();
        let word = word.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let entry = conn
                    .query_row(&format!("{SELECT_ENTRY} WHERE word = ?1"), [&word], digest_entry)
                    .optional()?;
                Ok(entry)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn exists(&self, word: &str) -> StorageResult<bool> {
        let pool = self.pool.clone();
        let word = word.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM digest_entries WHERE word = ?1)",
                    [&word],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn delete_by_word(&self, word: &str) -> StorageResult<bool> {
        let pool = self.pool.clone();
        let word = word.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let removed = conn.execute("DELETE FROM digest_entries WHERE word = ?1", [&word])?;
                Ok(removed > 0)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn store() -> SqliteEntryStore {
        SqliteEntryStore::new(SqlitePool::memory().unwrap())
    }

    fn entry(word: &str, book: &str) -> DigestEntry {
        DigestEntry::new(word, book, "digest.txt", Utc::now())
    }

    #[tokio::test]
    async fn test_insert_if_absent_reports_duplicates() {
        let store = store();
        assert!(store.insert_if_absent(&entry("swoon", "A")).await.unwrap());
        assert!(!store.insert_if_absent(&entry("swoon", "B")).await.unwrap());

        let stored = store.find_by_word("swoon").await.unwrap().unwrap();
        assert_eq!(stored.book_filename, "A");
    }

    #[tokio::test]
    async fn test_batch_skips_stored_and_repeated_words() {
        let store = store();
        store.insert_if_absent(&entry("swoon", "A")).await.unwrap();

        let inserted = store
            .insert_many_if_absent(&[
                entry("languid", "A"),
                entry("swoon", "B"),
                entry("torpor", "B"),
                entry("languid", "C"),
            ])
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        let words: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.word)
            .collect();
        assert_eq!(words, vec!["swoon", "languid", "torpor"]);
    }

    #[tokio::test]
    async fn test_find_by_book_and_delete() {
        let store = store();
        store
            .insert_many_if_absent(&[entry("a", "X"), entry("b", "Y"), entry("c", "X")])
            .await
            .unwrap();

        let in_x: Vec<String> = store
            .find_by_book("X")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.word)
            .collect();
        assert_eq!(in_x, vec!["a", "c"]);

        assert!(store.delete_by_word("a").await.unwrap());
        assert!(!store.exists("a").await.unwrap());
        assert!(!store.delete_by_word("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        assert_eq!(store().insert_many_if_absent(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_batch_persists_nothing() {
        let pool = SqlitePool::memory().unwrap();
        pool.with_connection(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON digest_entries
                 WHEN NEW.word = 'bad'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )?;
            Ok(())
        })
        .unwrap();
        let store = SqliteEntryStore::new(pool);

        let result = store
            .insert_many_if_absent(&[entry("ok", "A"), entry("bad", "A")])
            .await;

        assert!(result.is_err());
        assert!(store.find_all().await.unwrap().is_empty());
        assert!(!store.exists("ok").await.unwrap());
    }
}
