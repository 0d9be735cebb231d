//! Storage Error Types

use thiserror::Error;

/// Error type for ledger and card store operations
///
/// Duplicate keys are not errors: the insert-if-absent operations report them
/// through their return values instead.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupted data detected: {0}")]
    CorruptedData(String),

    #[error("Transaction rolled back: {0}")]
    Transaction(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Create a generic backend error
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Check if the error indicates stored data could not be decoded
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::CorruptedData(_) | Self::Serialization(_))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Backend(err.to_string())
    }
}
