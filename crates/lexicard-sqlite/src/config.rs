//! SQLite connection settings

use std::path::{Path, PathBuf};

/// Settings applied when a [`SqlitePool`](crate::SqlitePool) is opened
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,
    /// Enable write-ahead logging
    pub wal_mode: bool,
    pub busy_timeout_ms: u32,
    /// Negative values are KiB, positive values are pages
    pub cache_size: i32,
}

impl SqliteConfig {
    /// Database at `path` with default pragmas; `:memory:` gives [`Self::memory`]
    pub fn new(path: impl AsRef<Path>) -> Self {
        let config = Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        };
        if config.is_memory() {
            return Self::memory();
        }
        config
    }

    /// Ephemeral in-memory database
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            wal_mode: false,
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(":memory:")
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("lexicard.db"),
            wal_mode: true,
            busy_timeout_ms: 5_000,
            cache_size: -8_000,
        }
    }
}
