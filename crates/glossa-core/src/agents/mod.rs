//! The agents and their workflow.
//!
//! - `definition` - immutable agent data + per-agent subgraph construction
//! - `nodes` - the reasoning and tool-execution nodes
//! - `isolated` - sub-agents invoked as opaque nodes with private state
//! - `chat` / `generator` / `translator` - the three registered agents
//! - `wiring` - the explicit top-level composition

pub mod chat;
pub mod definition;
pub mod generator;
pub mod isolated;
pub mod nodes;
pub mod prompts;
pub mod translator;
pub mod wiring;

pub use definition::{tools_condition, AgentDefinition, TOOLS_NODE};
pub use isolated::IsolatedAgentNode;
pub use nodes::{ReasoningNode, ToolExecNode};
pub use wiring::build_workflow;
