//! SQLite persistence gateway for the CRM engine.
//!
//! The database lives at `~/.crmdesk/crmdesk.db` (overridable via
//! `CRMDESK_DB_PATH`). Opening creates the file if absent and applies the
//! schema; all concurrency and isolation guarantees are delegated to SQLite.
//!
//! `CrmDb` is intentionally NOT `Clone` or `Sync`. A desktop shell holds it
//! behind a `std::sync::Mutex` and issues one service call at a time.

use std::path::PathBuf;

use rusqlite::Connection;

use crate::migrations;
use crate::settings;

pub mod customers;
pub mod interactions;
pub mod opportunities;
pub mod tasks;
pub mod types;

pub use types::*;

/// SQLite connection wrapper shared by every domain service.
pub struct CrmDb {
    conn: Connection,
}

impl CrmDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at the configured path and apply the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = settings::db_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path. Useful for testing.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;
        Self::configure(conn)
    }

    /// Open a throwaway in-memory database with the full schema applied.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self, DbError> {
        // WAL for better concurrent read performance; FK enforcement is off
        // by default in SQLite and the cascade deletes depend on it.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        migrations::apply_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    ///
    /// Read-modify-write-log sequences (stage transitions, completions,
    /// deletions) run through here so the audit trail records committed
    /// prior state even with a second writer on the same file.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Self) -> Result<T, DbError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }
}
