//! Shared SQLite handle
//!
//! Every store holds a clone of one [`SqlitePool`]: a single connection behind
//! a mutex. The pipeline has one worker, so writes are serialized anyway.
//!
//! Opening a file-backed database creates its parent directory, sets the
//! pragmas from [`SqliteConfig`] and brings the schema up to date.

use crate::config::SqliteConfig;
use crate::error::{SqliteError, SqliteResult};
use crate::schema;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct SqlitePool {
    conn: Arc<Mutex<Connection>>,
    config: SqliteConfig,
}

impl SqlitePool {
    /// Open (or create) the database described by `config`
    pub fn new(config: SqliteConfig) -> SqliteResult<Self> {
        let conn = open_connection(&config)?;
        apply_pragmas(&conn, &config)?;
        schema::apply_migrations(&conn)?;
        info!(path = %config.path.display(), wal = config.wal_mode, "SQLite database ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Fresh in-memory database, mostly for tests
    pub fn memory() -> SqliteResult<Self> {
        Self::new(SqliteConfig::memory())
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Run `f` with the connection locked
    pub fn with_connection<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T>,
    {
        f(&self.conn.lock())
    }

    /// Run `f` with the connection locked mutably, for transactions
    pub fn with_connection_mut<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T>,
    {
        f(&mut self.conn.lock())
    }
}

fn open_connection(config: &SqliteConfig) -> SqliteResult<Connection> {
    if config.is_memory() {
        return Ok(Connection::open_in_memory()?);
    }
    if let Some(dir) = config.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        create_parent(dir)?;
    }
    Ok(Connection::open(&config.path)?)
}

fn create_parent(dir: &Path) -> SqliteResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        SqliteError::Connection(format!("cannot create '{}': {}", dir.display(), e))
    })
}

fn apply_pragmas(conn: &Connection, config: &SqliteConfig) -> SqliteResult<()> {
    // WAL is meaningless for an in-memory database
    if config.wal_mode && !config.is_memory() {
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        debug!(mode, "Journal mode set");
        conn.pragma_update(None, "synchronous", "NORMAL")?;
    }
    conn.pragma_update(None, "busy_timeout", config.busy_timeout_ms)?;
    conn.pragma_update(None, "cache_size", config.cache_size)?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    Ok(())
}

impl std::fmt::Debug for SqlitePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlitePool")
            .field("path", &self.config.path)
            .finish()
    }
}
