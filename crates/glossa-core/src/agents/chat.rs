//! The conversational front-end agent.

use std::sync::Arc;

use crate::tools::handoff::TransferToGeneratorTool;

use super::definition::AgentDefinition;
use super::prompts::CHAT_PROMPT;

pub const NAME: &str = "Chat";

pub fn definition() -> AgentDefinition {
    AgentDefinition {
        name: NAME,
        system_prompt: CHAT_PROMPT.to_string(),
        tools: vec![Arc::new(TransferToGeneratorTool)],
        // The hand-off redirects the top-level graph itself; chat never
        // loops back through its own tools node.
        tool_loop: false,
    }
}
