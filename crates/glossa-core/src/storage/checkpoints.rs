//! SQLite-backed checkpoint store.
//!
//! One row per thread id, replaced inside a transaction on every save. A
//! write is visible to readers only once committed, so a cancelled session
//! always resumes from the last complete checkpoint.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::params;

use crate::error::{CoreError, Result};
use crate::session::checkpoint::{Checkpoint, CheckpointStore};

use super::database::Database;

pub struct SqliteCheckpointStore {
    db: Mutex<Database>,
}

impl SqliteCheckpointStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            db: Mutex::new(Database::new(path)?),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            db: Mutex::new(Database::in_memory()?),
        })
    }
}

impl CheckpointStore for SqliteCheckpointStore {
    fn save(&self, thread_id: &str, checkpoint: &Checkpoint) -> Result<()> {
        let payload = serde_json::to_string(checkpoint)
            .map_err(|e| CoreError::Checkpoint(format!("cannot serialize checkpoint: {e}")))?;
        let now = chrono::Utc::now().to_rfc3339();

        let db = self.db.lock();
        db.conn()
            .execute(
                "INSERT INTO checkpoints (thread_id, payload, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(thread_id) DO UPDATE SET
                     payload = excluded.payload,
                     updated_at = excluded.updated_at",
                params![thread_id, payload, now],
            )
            .map_err(|e| CoreError::Checkpoint(format!("cannot save checkpoint: {e}")))?;
        Ok(())
    }

    fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        let db = self.db.lock();
        let mut stmt = db
            .conn()
            .prepare("SELECT payload FROM checkpoints WHERE thread_id = ?1")
            .map_err(|e| CoreError::Checkpoint(format!("cannot query checkpoint: {e}")))?;

        let mut rows = stmt
            .query(params![thread_id])
            .map_err(|e| CoreError::Checkpoint(format!("cannot query checkpoint: {e}")))?;

        match rows
            .next()
            .map_err(|e| CoreError::Checkpoint(format!("cannot read checkpoint row: {e}")))?
        {
            Some(row) => {
                let payload: String = row
                    .get(0)
                    .map_err(|e| CoreError::Checkpoint(format!("cannot read payload: {e}")))?;
                let checkpoint = serde_json::from_str(&payload).map_err(|e| {
                    CoreError::Checkpoint(format!("cannot deserialize checkpoint: {e}"))
                })?;
                Ok(Some(checkpoint))
            }
            None => Ok(None),
        }
    }

    fn delete(&self, thread_id: &str) -> Result<()> {
        let db = self.db.lock();
        db.conn()
            .execute(
                "DELETE FROM checkpoints WHERE thread_id = ?1",
                params![thread_id],
            )
            .map_err(|e| CoreError::Checkpoint(format!("cannot delete checkpoint: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::state::GraphState;

    #[test]
    fn sqlite_round_trip_and_overwrite() {
        let store = SqliteCheckpointStore::in_memory().unwrap();

        assert!(store.load("t1").unwrap().is_none());

        let first = Checkpoint {
            state: GraphState::from_user_input("one"),
            pending: None,
        };
        store.save("t1", &first).unwrap();
        let loaded = store.load("t1").unwrap().unwrap();
        assert_eq!(loaded.state.messages[0].text(), "one");

        let second = Checkpoint {
            state: GraphState::from_user_input("two"),
            pending: None,
        };
        store.save("t1", &second).unwrap();
        let loaded = store.load("t1").unwrap().unwrap();
        assert_eq!(loaded.state.messages[0].text(), "two");

        store.delete("t1").unwrap();
        assert!(store.load("t1").unwrap().is_none());
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossa.db");

        {
            let store = SqliteCheckpointStore::open(&path).unwrap();
            store
                .save("t1", &Checkpoint {
                    state: GraphState::from_user_input("persisted"),
                    pending: None,
                })
                .unwrap();
        }

        let store = SqliteCheckpointStore::open(&path).unwrap();
        let loaded = store.load("t1").unwrap().unwrap();
        assert_eq!(loaded.state.messages[0].text(), "persisted");
    }
}
