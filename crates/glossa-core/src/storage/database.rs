//! SQLite database wrapper.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{CoreError, Result};

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path and apply the schema.
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Checkpoint(format!("cannot create data dir: {e}")))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| CoreError::Checkpoint(format!("cannot open database: {e}")))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             CREATE TABLE IF NOT EXISTS checkpoints (
                 thread_id  TEXT PRIMARY KEY,
                 payload    TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             );",
        )
        .map_err(|e| CoreError::Checkpoint(format!("cannot apply schema: {e}")))?;

        Ok(Self { conn })
    }

    /// In-memory database, used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::Checkpoint(format!("cannot open database: {e}")))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS checkpoints (
                 thread_id  TEXT PRIMARY KEY,
                 payload    TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             );",
        )
        .map_err(|e| CoreError::Checkpoint(format!("cannot apply schema: {e}")))?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
