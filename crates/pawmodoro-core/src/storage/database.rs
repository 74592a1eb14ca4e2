//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - Completed runs (the focus session log)
//! - Days the app was opened
//! - Key-value store for application state (the collection lives here)

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use super::kv::KvStore;
use crate::error::{DatabaseError, Result};

/// One completed run: `minutes` of focus across `cycles` work phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLog {
    pub timestamp: DateTime<Utc>,
    pub minutes: u32,
    pub cycles: u32,
}

/// SQLite database for session logs and key-value state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/pawmodoro.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("pawmodoro.db"))
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                minutes     INTEGER NOT NULL,
                cycles      INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS app_opens (
                day TEXT PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON sessions(timestamp);",
        )?;
        Ok(())
    }

    /// Append a completed run to the session log.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn log_session(&self, timestamp: DateTime<Utc>, minutes: u32, cycles: u32) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO sessions (timestamp, minutes, cycles) VALUES (?1, ?2, ?3)",
            params![timestamp.to_rfc3339(), minutes, cycles],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All logged runs, oldest first. Rows with unparseable timestamps are
    /// skipped.
    pub fn sessions(&self) -> Result<Vec<SessionLog>> {
        let mut stmt = self
            .conn
            .prepare("SELECT timestamp, minutes, cycles FROM sessions ORDER BY timestamp, id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (ts, minutes, cycles) = row?;
            if let Ok(parsed) = DateTime::parse_from_rfc3339(&ts) {
                out.push(SessionLog {
                    timestamp: parsed.with_timezone(&Utc),
                    minutes,
                    cycles,
                });
            }
        }
        Ok(out)
    }

    /// Record that the app was opened on `day`. Repeat calls are no-ops.
    pub fn log_app_open(&self, day: NaiveDate) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO app_opens (day) VALUES (?1)",
            params![day.format("%Y-%m-%d").to_string()],
        )?;
        Ok(())
    }

    pub fn app_open_days(&self) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare("SELECT day FROM app_opens ORDER BY day")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            if let Ok(day) = NaiveDate::parse_from_str(&row?, "%Y-%m-%d") {
                out.push(day);
            }
        }
        Ok(out)
    }

    /// Clear the session and app-open logs. The kv store is untouched.
    pub fn reset_stats(&self) -> Result<()> {
        self.conn
            .execute_batch("DELETE FROM sessions; DELETE FROM app_opens;")?;
        Ok(())
    }
}

impl KvStore for Database {
    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
