//! The translation/execution agent: HLC artifact in, working code out.
//!
//! Carries the full file/shell/test tool set. Every tool with a side effect
//! the user would want to veto - shell execution, row deletion, test runs -
//! is wrapped for human approval with the accept/ignore response set.

use std::sync::Arc;

use crate::artifact::read_hlc;
use crate::error::Result;
use crate::graph::node::Node;
use crate::graph::state::GraphState;
use crate::interrupt::ApprovalPolicy;
use crate::tools::dir::{ChangeDirectoryTool, GetCurrentDirectoryTool, ListDirectoryTool};
use crate::tools::fs_edit::{DeleteFileContentTool, InsertFileContentTool, UpdateFileContentTool};
use crate::tools::fs_read::ReadFileTool;
use crate::tools::fs_write::WriteFileTool;
use crate::tools::terminal::{CommandHistoryTool, TerminalTool};
use crate::tools::test_runner::{RunJavascriptTestTool, RunPythonTestTool};
use crate::tools::{Guarded, ToolContext, ToolSet};

use super::definition::AgentDefinition;
use super::isolated::IsolatedAgentNode;
use super::prompts::translator_prompt;

pub const NAME: &str = "Translator";

fn tool_set() -> ToolSet {
    vec![
        Guarded::new(Arc::new(TerminalTool), ApprovalPolicy::accept_or_ignore()),
        Guarded::new(
            Arc::new(DeleteFileContentTool),
            ApprovalPolicy::accept_or_ignore(),
        ),
        Guarded::new(
            Arc::new(RunPythonTestTool),
            ApprovalPolicy::accept_or_ignore(),
        ),
        Guarded::new(
            Arc::new(RunJavascriptTestTool),
            ApprovalPolicy::accept_or_ignore(),
        ),
        Arc::new(ChangeDirectoryTool),
        Arc::new(CommandHistoryTool),
        Arc::new(GetCurrentDirectoryTool),
        Arc::new(InsertFileContentTool),
        Arc::new(ListDirectoryTool),
        Arc::new(ReadFileTool),
        Arc::new(UpdateFileContentTool),
        Arc::new(WriteFileTool),
    ]
}

pub fn definition() -> AgentDefinition {
    AgentDefinition {
        name: NAME,
        system_prompt: translator_prompt(),
        tools: tool_set(),
        tool_loop: true,
    }
}

/// The translator as an opaque top-level node. Its sole initial input is the
/// artifact the generator wrote.
pub fn isolated_node() -> Result<Arc<dyn Node>> {
    let graph = definition().subgraph().compile()?;
    Ok(IsolatedAgentNode::new(
        NAME,
        graph,
        Arc::new(|_state: &GraphState, tools: &ToolContext| read_hlc(&tools.working_dir())),
    ))
}
