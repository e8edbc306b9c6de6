//! Execution sessions: resumable runs of the agent workflow.

pub mod checkpoint;
pub mod events;
pub mod session;

pub use checkpoint::{Checkpoint, CheckpointStore, MemoryCheckpointStore, PendingInterrupt};
pub use events::SessionEvent;
pub use session::{
    ExecutionSession, SessionInput, CONNECTION_ERROR_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};
