//! SQLite persistence for wallet state.
//!
//! A single `kv` table holds the vault blob and the account count, so the
//! wallet survives restarts. Writes are upserts; the last write wins.

use rusqlite::{params, Connection};
use seedvault_core::VaultStore;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteStoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Connection lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for SqliteStoreError {
    fn from(_: PoisonError<T>) -> Self {
        SqliteStoreError::Poisoned
    }
}

/// [`VaultStore`] over a SQLite file
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations
    pub fn open(path: &Path) -> Result<Self, SqliteStoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrate(&conn)?;
        log::debug!("Opened wallet database at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Database that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn keys(&self) -> Result<Vec<String>, SqliteStoreError> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare_cached("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )
}

impl VaultStore for SqliteStore {
    type Error = SqliteStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), Self::Error> {
        let conn = self.conn.lock()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
