//! SQLite-backed [`FileLedger`]

use crate::connection::SqlitePool;
use crate::error::join_error;
use crate::rows::{encode_time, file_record};
use async_trait::async_trait;
use chrono::Utc;
use lexicard_core::{FileLedger, FileRecord, StorageResult};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

/// File fingerprints stored in `file_records`
#[derive(Debug, Clone)]
pub struct SqliteFileLedger {
    pool: SqlitePool,
}

impl SqliteFileLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileLedger for SqliteFileLedger {
    async fn upsert_fingerprint(
        &self,
        path: &str,
        fingerprint: &str,
    ) -> StorageResult<FileRecord> {
        let pool = self.pool.clone();
        let record = FileRecord {
            path: path.to_string(),
            fingerprint: fingerprint.to_string(),
            last_seen: Utc::now(),
        };

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                conn.execute(
                    r#"
                    INSERT INTO file_records (path, fingerprint, last_seen)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(path) DO UPDATE SET
                        fingerprint = excluded.fingerprint,
                        last_seen = excluded.last_seen
                    "#,
                    params![record.path, record.fingerprint, encode_time(&record.last_seen)],
                )?;
                debug!(path = %record.path, "Recorded file fingerprint");
                Ok(record)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn lookup(&self, path: &str) -> StorageResult<Option<FileRecord>> {
        let pool = self.pool.clone();
        let path = path.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let record = conn
                    .query_row(
                        "SELECT path, fingerprint, last_seen FROM file_records WHERE path = ?1",
                        [&path],
                        file_record,
                    )
                    .optional()?;
                Ok(record)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn list(&self) -> StorageResult<Vec<FileRecord>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT path, fingerprint, last_seen FROM file_records ORDER BY path",
                )?;
                let records = stmt
                    .query_map([], file_record)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }

    async fn forget(&self, path: &str) -> StorageResult<bool> {
        let pool = self.pool.clone();
        let path = path.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let removed = conn.execute("DELETE FROM file_records WHERE path = ?1", [&path])?;
                Ok(removed > 0)
            })
        })
        .await
        .map_err(join_error)?
        .map_err(Into::into)
    }
}
