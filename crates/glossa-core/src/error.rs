//! Core error taxonomy.
//!
//! Tool failures never appear here - they stay inside `ToolResult` so the
//! reasoning agent can react to them. Everything that can cross the session
//! boundary is a `CoreError` variant.

use thiserror::Error;

/// Errors produced by the orchestration core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No network reachable, or a model call exceeded its hard timeout.
    /// Always recoverable; the session surfaces a fixed user-facing message.
    #[error("no network connectivity")]
    Connectivity,

    /// Provider-side failure: bad response, outage, auth rejection. Retried
    /// across the configured fallback models before surfacing.
    #[error("model provider error: {0}")]
    Provider(String),

    /// No active model configuration, or a configuration entry is missing a
    /// required field. Fails fast, never reaches the wire.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A resume input that does not match the outstanding interrupt's
    /// allowed response set.
    #[error("invalid resume: {0}")]
    InvalidResume(String),

    /// A new turn was submitted while the previous turn's task is still
    /// running. Turns within a session are strictly sequential.
    #[error("a turn is already in progress")]
    TurnInProgress,

    /// Graph construction or execution errors (unknown node, missing entry,
    /// dangling edge).
    #[error("graph error: {0}")]
    Graph(String),

    /// Checkpoint store failures (serialization, storage backend).
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Whether this error maps to the fixed connectivity message at the
    /// session boundary.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, CoreError::Connectivity)
    }
}
