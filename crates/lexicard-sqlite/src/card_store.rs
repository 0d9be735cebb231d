//! SQLite-backed [`CardStore`]

use crate::connection::SqlitePool;
use crate::error::join_error;
use crate::rows::{encode_time, enriched_card, CARD_COLUMNS};
use async_trait::async_trait;
use lexicard_core::{CardStore, EnrichedCard, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

/// Enriched cards stored in `enriched_cards`
#[derive(Debug, Clone)]
pub struct SqliteCardStore {
    pool: SqlitePool,
}

impl SqliteCardStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert `card`; `on_conflict` is the tail of the statement
fn write_card(conn: &Connection, card: &EnrichedCard, on_conflict: &str) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT INTO enriched_cards ({CARD_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) {on_conflict}"
        ),
        params![
            card.word,
            card.source_title,
            card.canonical_answer,
            card.alternate_answer,
            card.part_of_speech.as_str(),
            card.definition,
            card.example_sentence,
            card.hint,
            encode_time(&card.created_at),
            encode_time(&card.updated_at),
        ],
    )
}

const DO_NOTHING: &str = "ON CONFLICT(word, source_title) DO NOTHING";

// created_at is never rewritten
const DO_UPDATE: &str = r#"
    ON CONFLICT(word, source_title) DO UPDATE SET
        canonical_answer = excluded.canonical_answer,
        alternate_answer = excluded.alternate_answer,
        part_of_speech = excluded.part_of_speech,
        definition = excluded.definition,
        example_sentence = excluded.example_sentence,
        hint = excluded.hint,
        updated_at = excluded.updated_at
"#;

#[async_trait]
impl CardStore for SqliteCardStore {
    async fn insert_if_absent(&self, card: &EnrichedCard) -> StorageResult<bool> {
        let pool = self.pool.clone();
        let card = card.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| Ok(write_card(conn, &card, DO_NOTHING)? > 0))
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn insert_many_if_absent(&self, cards: &[EnrichedCard]) -> StorageResult<usize> {
        if cards.is_empty() {
            return Ok(0);
        }
        let pool = self.pool.clone();
        let cards = cards.to_vec();

        tokio::task::spawn_blocking(move || {
            pool.with_connection_mut(|conn| {
                let tx = conn.transaction()?;
                let mut inserted = 0;
                for card in &cards {
                    inserted += write_card(&tx, card, DO_NOTHING)?;
                }
                tx.commit()?;
                debug!(offered = cards.len(), inserted, "Inserted enriched cards");
                Ok(inserted)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn upsert(&self, card: &EnrichedCard) -> StorageResult<()> {
        let pool = self.pool.clone();
        let card = card.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                write_card(conn, &card, DO_UPDATE)?;
                Ok(())
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn exists(&self, word: &str, source_title: &str) -> StorageResult<bool> {
        let pool = self.pool.clone();
        let word = word.to_string();
        let source = source_title.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM enriched_cards WHERE word = ?1 AND source_title = ?2)",
                    params![word, source],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn find(&self, word: &str, source_title: &str) -> StorageResult<Option<EnrichedCard>> {
        let pool = self.pool.clone();
        let word = word.to_string();
        let source = source_title.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let card = conn
                    .query_row(
                        &format!(
                            "SELECT {CARD_COLUMNS} FROM enriched_cards \
                             WHERE word = ?1 AND source_title = ?2"
                        ),
                        params![word, source],
                        enriched_card,
                    )
                    .optional()?;
                Ok(card)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn find_by_source(&self, source_title: &str) -> StorageResult<Vec<EnrichedCard>> {
        let pool = self.pool.clone();
        let source = source_title.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {CARD_COLUMNS} FROM enriched_cards WHERE source_title = ?1 ORDER BY word"
                ))?;
                let cards = stmt
                    .query_map([&source], enriched_card)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(cards)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn list_sources(&self) -> StorageResult<Vec<String>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT DISTINCT source_title FROM enriched_cards ORDER BY source_title",
                )?;
                let sources = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(sources)
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
    use chrono::{Duration, Utc};
    use lexicard_core::PartOfSpeech;

    fn store() -> SqliteCardStore {
        SqliteCardStore::new(SqlitePool::memory().unwrap())
    }

    fn card(word: &str, source: &str, answer: &str) -> EnrichedCard {
        let now = Utc::now();
        EnrichedCard {
            word: word.to_string(),
            source_title: source.to_string(),
            canonical_answer: answer.to_string(),
            alternate_answer: None,
            part_of_speech: PartOfSpeech::Verb,
            definition: format!("definition of {word}"),
            example_sentence: format!("An example with {word}."),
            hint: "h".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_if_absent_never_overwrites() {
        let store = store();
        assert!(store.insert_if_absent(&card("swoon", "A", "faint")).await.unwrap());
        assert!(!store.insert_if_absent(&card("swoon", "A", "other")).await.unwrap());

        let stored = store.find("swoon", "A").await.unwrap().unwrap();
        assert_eq!(stored.canonical_answer, "faint");
    }

    #[tokio::test]
    async fn test_same_word_in_two_sources_is_two_cards() {
        let store = store();
        let inserted = store
            .insert_many_if_absent(&[card("swoon", "A", "faint"), card("swoon", "B", "faint")])
            .await
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(store.list_sources().await.unwrap(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_upsert_keeps_created_at() {
        let store = store();
        let original = card("swoon", "A", "faint");
        store.insert_if_absent(&original).await.unwrap();

        let mut replacement = card("swoon", "A", "pass out");
        replacement.alternate_answer = Some("faint".to_string());
        replacement.created_at = original.created_at + Duration::days(3);
        replacement.updated_at = original.created_at + Duration::days(3);
        store.upsert(&replacement).await.unwrap();

        let stored = store.find("swoon", "A").await.unwrap().unwrap();
        assert_eq!(stored.canonical_answer, "pass out");
        assert_eq!(stored.alternate_answer.as_deref(), Some("faint"));
        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(stored.updated_at, replacement.updated_at);
    }

    #[tokio::test]
    async fn test_find_by_source_orders_by_word() {
        let store = store();
        store
            .insert_many_if_absent(&[card("b", "A", "x"), card("a", "A", "y"), card("c", "B", "z")])
            .await
            .unwrap();

        let words: Vec<String> = store
            .find_by_source("A")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.word)
            .collect();
        assert_eq!(words, vec!["a", "b"]);
        assert!(store.exists("c", "B").await.unwrap());
        assert!(!store.exists("c", "A").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_batch_persists_nothing() {
        let pool = SqlitePool::memory().unwrap();
        pool.with_connection(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON enriched_cards
                 WHEN NEW.word = 'bad'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )?;
            Ok(())
        })
        .unwrap();
        let store = SqliteCardStore::new(pool);

        let result = store
            .insert_many_if_absent(&[card("ok", "A", "fine"), card("bad", "A", "worse")])
            .await;

        assert!(result.is_err());
        assert!(store.find_by_source("A").await.unwrap().is_empty());
        assert!(!store.exists("ok", "A").await.unwrap());
    }
}
