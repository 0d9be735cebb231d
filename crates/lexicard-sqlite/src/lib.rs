//! SQLite storage backend for Lexicard
//!
//! Implements the `lexicard-core` store contracts on one SQLite file:
//!
//! - [`SqliteFileLedger`] - `file_records`
//! - [`SqliteEntryStore`] - `digest_entries`
//! - [`SqliteCardStore`] - `enriched_cards`
//!
//! All three share a single [`SqlitePool`]. Queries run on the blocking
//! thread pool; batch inserts run inside one transaction each.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lexicard_sqlite::{SqliteConfig, SqlitePool, SqliteStores};
//!
//! let pool = SqlitePool::new(SqliteConfig::new("./lexicard.db"))?;
//! let stores = SqliteStores::new(pool);
//! let inserted = stores.entries.insert_many_if_absent(&entries).await?;
//! ```

pub mod card_store;
pub mod config;
pub mod connection;
pub mod entry_store;
pub mod error;
pub mod file_ledger;
mod rows;
pub mod schema;

pub use card_store::SqliteCardStore;
pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use entry_store::SqliteEntryStore;
pub use error::{SqliteError, SqliteResult};
pub use file_ledger::SqliteFileLedger;

use std::sync::Arc;

/// The three stores over one shared connection
#[derive(Debug, Clone)]
pub struct SqliteStores {
    pub ledger: Arc<SqliteFileLedger>,
    pub entries: Arc<SqliteEntryStore>,
    pub cards: Arc<SqliteCardStore>,
}

impl SqliteStores {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            ledger: Arc::new(SqliteFileLedger::new(pool.clone())),
            entries: Arc::new(SqliteEntryStore::new(pool.clone())),
            cards: Arc::new(SqliteCardStore::new(pool)),
        }
    }

    /// Open (or create) the database at `config.path`
    pub fn open(config: SqliteConfig) -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::new(config)?))
    }
}
