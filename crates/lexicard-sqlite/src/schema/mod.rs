//! Schema management and migrations

use crate::error::{SqliteError, SqliteResult};
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations
pub fn apply_migrations(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version = current_version(conn)?;
    debug!(current_version, target_version = SCHEMA_VERSION, "Checking migrations");

    if current_version < 1 {
        info!(from = current_version, to = SCHEMA_VERSION, "Applying schema migrations");
        apply_migration_v1(conn)?;
    }

    Ok(())
}

fn current_version(conn: &Connection) -> SqliteResult<i32> {
    let version: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .optional()?
        .flatten();

    Ok(version.unwrap_or(0))
}

fn record_migration(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("INSERT INTO schema_migrations (version) VALUES (?)", [version])?;
    Ok(())
}

/// Migration v1: ledger, entries and cards
fn apply_migration_v1(conn: &Connection) -> SqliteResult<()> {
    debug!("Applying migration v1");

    conn.execute_batch(SCHEMA_V1)
        .map_err(|e| SqliteError::Schema(format!("Failed to apply v1 schema: {}", e)))?;

    record_migration(conn, 1)?;
    info!("Migration v1 applied");
    Ok(())
}

const SCHEMA_V1: &str = r#"
-- Last-seen content fingerprint per watched file
CREATE TABLE IF NOT EXISTS file_records (
    path TEXT PRIMARY KEY NOT NULL,
    fingerprint TEXT NOT NULL,
    last_seen TEXT NOT NULL
);

-- Vocabulary entries; the word alone is the key, id keeps insertion order
CREATE TABLE IF NOT EXISTS digest_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL UNIQUE,
    book_filename TEXT NOT NULL,
    source_file TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_digest_entries_book ON digest_entries(book_filename);

-- Generated cards keyed by (word, source title)
CREATE TABLE IF NOT EXISTS enriched_cards (
    word TEXT NOT NULL,
    source_title TEXT NOT NULL,
    canonical_answer TEXT NOT NULL,
    alternate_answer TEXT,
    part_of_speech TEXT NOT NULL,
    definition TEXT NOT NULL,
    example_sentence TEXT NOT NULL,
    hint TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (word, source_title)
);

CREATE INDEX IF NOT EXISTS idx_enriched_cards_source ON enriched_cards(source_title);
"#;
