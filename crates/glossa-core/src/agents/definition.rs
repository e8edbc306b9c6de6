//! Agent definitions and per-agent subgraph construction.
//!
//! An agent definition is immutable data: name, system prompt, tool set, and
//! how it sits in the workflow. Definitions are created once at startup by
//! the wiring function - there is no implicit registration.

use std::sync::Arc;

use crate::graph::builder::{GraphBuilder, END};
use crate::graph::state::GraphState;
use crate::tools::ToolSet;

use super::nodes::{ReasoningNode, ToolExecNode};

/// Name of the tool-execution node inside every agent subgraph.
pub const TOOLS_NODE: &str = "tools";

pub struct AgentDefinition {
    /// Node name in the graph namespace (e.g. "Chat").
    pub name: &'static str,
    pub system_prompt: String,
    pub tools: ToolSet,
    /// Whether tool results loop back into reasoning. Single-shot agents
    /// end after their tool batch instead.
    pub tool_loop: bool,
}

impl AgentDefinition {
    /// Build this agent's subgraph: reasoning node at the entry, a tools
    /// node, the tool-call-present/absent branch, and (optionally) the
    /// results-back-to-reasoning edge.
    pub fn subgraph(&self) -> GraphBuilder {
        let reasoning = Arc::new(ReasoningNode {
            agent: self.name,
            system_prompt: self.system_prompt.clone(),
            tools: self.tools.clone(),
        });
        let tool_exec = Arc::new(ToolExecNode {
            tools: self.tools.clone(),
        });

        let entry = self.name;
        let mut builder = GraphBuilder::new()
            .add_node(entry, reasoning)
            .add_node(TOOLS_NODE, tool_exec)
            .set_entry_point(entry)
            .add_conditional_edge(entry, Arc::new(tools_condition));

        if self.tool_loop {
            builder = builder.add_edge(TOOLS_NODE, entry);
        }

        builder
    }
}

/// The reasoning/tool branch: route to the tools node iff the last assistant
/// message requested at least one tool call, otherwise the subgraph is done.
pub fn tools_condition(state: &GraphState) -> String {
    match state.last_message() {
        Some(message) if message.has_tool_calls() => TOOLS_NODE.to_string(),
        _ => END.to_string(),
    }
}
