//! The code-generation agent: natural-language summary in, HLC artifact out.

use std::sync::Arc;

use crate::error::Result;
use crate::graph::node::Node;
use crate::graph::state::GraphState;
use crate::tools::fs_write::WriteHlcTool;
use crate::tools::ToolContext;

use super::definition::AgentDefinition;
use super::isolated::IsolatedAgentNode;
use super::prompts::GENERATOR_PROMPT;

pub const NAME: &str = "Generator";

pub fn definition() -> AgentDefinition {
    AgentDefinition {
        name: NAME,
        system_prompt: GENERATOR_PROMPT.to_string(),
        tools: vec![Arc::new(WriteHlcTool)],
        tool_loop: false,
    }
}

/// The generator as an opaque top-level node. Its input is the hand-off
/// summary; its observable output is the written artifact only.
pub fn isolated_node() -> Result<Arc<dyn Node>> {
    let graph = definition().subgraph().compile()?;
    Ok(IsolatedAgentNode::new(
        NAME,
        graph,
        Arc::new(|state: &GraphState, _tools: &ToolContext| {
            if state.summary.is_empty() {
                None
            } else {
                Some(state.summary.clone())
            }
        }),
    ))
}
