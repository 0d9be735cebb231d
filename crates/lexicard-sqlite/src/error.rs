//! Error types for SQLite storage

use lexicard_core::StorageError;
use thiserror::Error;

/// SQLite storage error type
#[derive(Error, Debug)]
pub enum SqliteError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema/migration error
    #[error("Schema error: {0}")]
    Schema(String),

    /// A stored value could not be decoded
    #[error("Corrupted row: {0}")]
    Corrupted(String),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations
pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Connection(msg) => Self::Backend(msg),
            SqliteError::Schema(msg) => Self::Backend(format!("Schema: {}", msg)),
            SqliteError::Corrupted(msg) => Self::CorruptedData(msg),
            SqliteError::Rusqlite(rusqlite::Error::FromSqlConversionFailure(col, _, e)) => {
                Self::CorruptedData(format!("column {}: {}", col, e))
            }
            SqliteError::Rusqlite(e) => Self::Backend(e.to_string()),
        }
    }
}

/// Map a tokio join failure of a blocking store task
pub(crate) fn join_error(err: tokio::task::JoinError) -> StorageError {
    StorageError::Backend(err.to_string())
}
