//! Checkpoints: persisted snapshots of graph state keyed by thread id.
//!
//! A checkpoint is written after every state transition and read on resume.
//! Writes are atomic relative to readers: a reader sees either the previous
//! complete checkpoint or the new one, never a partial write.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::ai::types::Message;
use crate::error::Result;
use crate::graph::state::GraphState;
use crate::interrupt::Interrupt;

/// Suspension metadata persisted alongside the state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingInterrupt {
    /// Node to re-enter on resume.
    pub node: String,
    /// Tool-result messages already produced in the suspended batch. Kept so
    /// resuming never re-executes a completed tool.
    pub completed: Vec<Message>,
    pub interrupt: Interrupt,
}

/// Snapshot of conversation state plus pending-interrupt metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    pub state: GraphState,
    pub pending: Option<PendingInterrupt>,
}

/// Storage for checkpoints, keyed by session/thread id. Concurrent sessions
/// must use distinct keys.
pub trait CheckpointStore: Send + Sync {
    fn save(&self, thread_id: &str, checkpoint: &Checkpoint) -> Result<()>;
    fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>>;
    fn delete(&self, thread_id: &str) -> Result<()>;
}

/// In-memory store: the default for tests and single-process runs.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    checkpoints: RwLock<HashMap<String, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&self, thread_id: &str, checkpoint: &Checkpoint) -> Result<()> {
        // Whole-value replacement under the write lock keeps readers atomic.
        self.checkpoints
            .write()
            .insert(thread_id.to_string(), checkpoint.clone());
        Ok(())
    }

    fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoints.read().get(thread_id).cloned())
    }

    fn delete(&self, thread_id: &str) -> Result<()> {
        self.checkpoints.write().remove(thread_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_round_trip() {
        let store = MemoryCheckpointStore::new();
        let checkpoint = Checkpoint {
            state: GraphState::from_user_input("hello"),
            pending: None,
        };

        store.save("t1", &checkpoint).unwrap();
        let loaded = store.load("t1").unwrap().unwrap();
        assert_eq!(loaded.state, checkpoint.state);
        assert!(store.load("t2").unwrap().is_none());
    }

    #[test]
    fn save_overwrites_previous_checkpoint() {
        let store = MemoryCheckpointStore::new();
        store
            .save("t1", &Checkpoint {
                state: GraphState::from_user_input("one"),
                pending: None,
            })
            .unwrap();
        store
            .save("t1", &Checkpoint {
                state: GraphState::from_user_input("two"),
                pending: None,
            })
            .unwrap();

        let loaded = store.load("t1").unwrap().unwrap();
        assert_eq!(loaded.state.messages[0].text(), "two");
    }

    #[test]
    fn distinct_threads_are_isolated() {
        let store = MemoryCheckpointStore::new();
        store
            .save("a", &Checkpoint {
                state: GraphState::from_user_input("for a"),
                pending: None,
            })
            .unwrap();
        store
            .save("b", &Checkpoint {
                state: GraphState::from_user_input("for b"),
                pending: None,
            })
            .unwrap();

        assert_eq!(store.load("a").unwrap().unwrap().state.messages[0].text(), "for a");
        assert_eq!(store.load("b").unwrap().unwrap().state.messages[0].text(), "for b");
        store.delete("a").unwrap();
        assert!(store.load("a").unwrap().is_none());
        assert!(store.load("b").unwrap().is_some());
    }
}
