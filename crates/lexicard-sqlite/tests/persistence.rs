//! Stores reopened over the same database file keep their data

use chrono::Utc;
use lexicard_core::{
    CardStore, DigestEntry, EnrichedCard, EntryStore, FileLedger, PartOfSpeech, StorageError,
};
use lexicard_sqlite::{SqliteConfig, SqlitePool, SqliteStores};
use tempfile::TempDir;

fn card(word: &str, source: &str) -> EnrichedCard {
    let now = Utc::now();
    EnrichedCard {
        word: word.to_string(),
        source_title: source.to_string(),
        canonical_answer: "faint".to_string(),
        alternate_answer: Some("swoon away".to_string()),
        part_of_speech: PartOfSpeech::Verb,
        definition: "to lose consciousness briefly".to_string(),
        example_sentence: "She would swoon at the sight of blood.".to_string(),
        hint: "f____".to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_all_stores_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("lexicard.db");
    let entry = DigestEntry::new("swoon", "Book.epub", "digest.txt", Utc::now());
    let original = card("swoon", "Book.epub");

    {
        let stores = SqliteStores::open(SqliteConfig::new(&db_path)).unwrap();
        stores.ledger.upsert_fingerprint("digest.txt", "abc").await.unwrap();
        stores.entries.insert_if_absent(&entry).await.unwrap();
        stores.cards.insert_if_absent(&original).await.unwrap();
    }

    let stores = SqliteStores::open(SqliteConfig::new(&db_path)).unwrap();
    assert_eq!(
        stores.ledger.lookup("digest.txt").await.unwrap().unwrap().fingerprint,
        "abc"
    );
    assert_eq!(stores.entries.find_by_word("swoon").await.unwrap(), Some(entry));
    assert_eq!(
        stores.cards.find("swoon", "Book.epub").await.unwrap(),
        Some(original)
    );
}

#[tokio::test]
async fn test_undecodable_part_of_speech_is_corruption() {
    let pool = SqlitePool::memory().unwrap();
    let stores = SqliteStores::new(pool.clone());
    stores.cards.insert_if_absent(&card("swoon", "A")).await.unwrap();

    pool.with_connection(|conn| {
        conn.execute("UPDATE enriched_cards SET part_of_speech = 'gerundive'", [])?;
        Ok(())
    })
    .unwrap();

    let err = stores.cards.find("swoon", "A").await.unwrap_err();
    assert!(matches!(err, StorageError::CorruptedData(_)), "got {err:?}");
}

#[tokio::test]
async fn test_stores_share_one_connection() {
    let stores = SqliteStores::new(SqlitePool::memory().unwrap());
    let cloned = stores.clone();

    cloned
        .entries
        .insert_many_if_absent(&[
            DigestEntry::new("a", "X", "d", Utc::now()),
            DigestEntry::new("b", "X", "d", Utc::now()),
        ])
        .await
        .unwrap();

    assert_eq!(stores.entries.find_all().await.unwrap().len(), 2);
}
