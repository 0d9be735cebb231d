//! Error types for digest watching.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while scanning or watching a digest directory.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The glob pattern does not compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// The watched path is missing or not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// IO error while listing a directory.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File system watching error.
    #[error("File watching error: {0}")]
    Watch(String),
}

/// Result type for watch operations.
pub type WatchResult<T> = Result<T, WatchError>;

impl From<notify::Error> for WatchError {
    fn from(err: notify::Error) -> Self {
        WatchError::Watch(err.to_string())
    }
}
