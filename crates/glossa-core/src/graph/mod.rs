//! Agent graph engine: state, nodes, composition, and execution.

pub mod builder;
pub mod node;
pub mod runner;
pub mod state;

pub use builder::{EdgeCondition, Graph, GraphBuilder, END};
pub use node::{Node, NodeContext, NodeOutcome};
pub use runner::{GraphRunner, RunInput, RunOutcome, RunServices};
pub use state::{GraphState, StateUpdate};
