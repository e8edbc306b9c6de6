//! Persistence layer: SQLite-backed checkpoint storage.

mod checkpoints;
mod database;

pub use checkpoints::SqliteCheckpointStore;
pub use database::Database;
