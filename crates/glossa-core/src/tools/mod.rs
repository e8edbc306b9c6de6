//! Tool registry: callables the model may request.
//!
//! Every tool accepts named JSON arguments and returns a success flag plus a
//! message. Expected failures (missing file, bad path, permission) become
//! `ToolResult::failure` - a tool never propagates an error past its own
//! boundary. Each invocation additionally emits a `ToolCallRecord` on the
//! session's event channel before executing; the record is display-only and
//! never stored in conversation state.

pub mod dir;
pub mod fs_edit;
pub mod fs_read;
pub mod fs_write;
pub mod guard;
pub mod handoff;
pub mod history;
pub mod terminal;
pub mod test_runner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;

use crate::ai::types::AiTool;
use crate::interrupt::ApprovalPolicy;
use history::CommandHistory;

pub use guard::Guarded;

/// Result of one tool execution: success flag and message.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub success: bool,
    pub message: String,
    /// Set only by hand-off tools: redirects the graph and carries the
    /// request summary across agents.
    pub handoff: Option<Handoff>,
}

impl ToolResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            handoff: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            handoff: None,
        }
    }
}

/// Control transfer to another agent within the same run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub target: String,
    pub summary: String,
}

/// Side-channel record describing a tool invocation for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub in_progress: String,
    pub on_success: String,
    pub on_failure: String,
    /// Payload to display in a collapsible (command text, file content, ...).
    pub payload: String,
}

impl ToolCallRecord {
    pub fn new(
        name: &str,
        in_progress: impl Into<String>,
        on_success: impl Into<String>,
        on_failure: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            in_progress: in_progress.into(),
            on_success: on_success.into(),
            on_failure: on_failure.into(),
            payload: payload.into(),
        }
    }
}

/// Session-scoped context for tool execution.
///
/// The working directory is shared mutable state within one session (the
/// `change_directory` tool moves it); the command history is the bounded
/// per-session log behind the `terminal` tools. Cloning shares both.
#[derive(Clone)]
pub struct ToolContext {
    cwd: Arc<RwLock<PathBuf>>,
    pub history: Arc<Mutex<CommandHistory>>,
}

impl ToolContext {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            cwd: Arc::new(RwLock::new(working_dir)),
            history: Arc::new(Mutex::new(CommandHistory::default())),
        }
    }

    pub fn working_dir(&self) -> PathBuf {
        self.cwd.read().clone()
    }

    pub fn set_working_dir(&self, dir: PathBuf) {
        *self.cwd.write() = dir;
    }

    /// Resolve a path relative to the session working directory; absolute
    /// paths pass through.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.cwd.read().join(p)
        }
    }
}

/// Trait for tool implementations.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (id).
    fn name(&self) -> &str;

    /// Tool description for the model.
    fn description(&self) -> &str;

    /// JSON schema for parameters.
    fn parameters_schema(&self) -> Value;

    /// Approval policy, if this tool requires human approval. `None` means
    /// the tool executes directly.
    fn approval(&self) -> Option<ApprovalPolicy> {
        None
    }

    /// Display record for a pending invocation with these arguments.
    fn describe(&self, params: &Value) -> ToolCallRecord;

    /// Execute the tool. Never errors: expected failures are `failure`
    /// results.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult;
}

/// A named, ordered tool set bound to one agent.
pub type ToolSet = Vec<Arc<dyn Tool>>;

/// Tool definitions in the shape providers expect.
pub fn ai_tools(tools: &ToolSet) -> Vec<AiTool> {
    tools
        .iter()
        .map(|t| AiTool {
            name: t.name().to_string(),
            description: t.description().to_string(),
            input_schema: t.parameters_schema(),
        })
        .collect()
}

/// Find a tool by name within a set.
pub fn find_tool<'a>(tools: &'a ToolSet, name: &str) -> Option<&'a Arc<dyn Tool>> {
    tools.iter().find(|t| t.name() == name)
}

/// Parse tool parameters, converting serde errors into a failure result.
pub fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, ToolResult> {
    serde_json::from_value(params)
        .map_err(|e| ToolResult::failure(format!("Invalid parameters: {}", e)))
}

/// Single-line payload preview, bounded for display.
pub(crate) fn preview(text: &str) -> String {
    const MAX: usize = 200;
    let line = text.lines().next().unwrap_or_default();
    if line.len() > MAX {
        let mut cut = MAX;
        while cut > 0 && !line.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…", &line[..cut])
    } else {
        line.to_string()
    }
}
