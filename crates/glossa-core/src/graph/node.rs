//! Graph nodes and their execution context.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::ai::gateway::ModelGateway;
use crate::ai::types::Message;
use crate::error::Result;
use crate::graph::state::{GraphState, StateUpdate};
use crate::interrupt::{HumanDecision, Interrupt};
use crate::net::ConnectivityProbe;
use crate::session::checkpoint::CheckpointStore;
use crate::session::events::SessionEvent;
use crate::tools::ToolContext;

/// Everything a node needs at run time. Built fresh by the runner for each
/// node execution; the resume decision and partial results are consumed by
/// the node they were checkpointed for.
pub struct NodeContext {
    pub gateway: Arc<ModelGateway>,
    pub probe: Arc<dyn ConnectivityProbe>,
    pub events: mpsc::UnboundedSender<SessionEvent>,
    pub tools: ToolContext,
    pub checkpoints: Arc<dyn CheckpointStore>,
    /// Checkpoint key for this execution scope. Isolated units derive a
    /// child key so their private state never collides with the caller's.
    pub thread_id: String,
    /// Human decision supplied through the resume path, consumed once.
    pub resume: Option<HumanDecision>,
    /// Tool-result messages completed before the suspension being resumed.
    pub completed: Vec<Message>,
}

impl NodeContext {
    /// Best-effort event emission; a closed consumer never fails the run.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub fn take_resume(&mut self) -> Option<HumanDecision> {
        self.resume.take()
    }

    /// Child context for an isolated unit: same services, scoped checkpoint
    /// key, and ownership of the pending resume input.
    pub fn child_scope(&mut self, node_name: &str) -> NodeContext {
        NodeContext {
            gateway: Arc::clone(&self.gateway),
            probe: Arc::clone(&self.probe),
            events: self.events.clone(),
            tools: self.tools.clone(),
            checkpoints: Arc::clone(&self.checkpoints),
            thread_id: format!("{}/{}", self.thread_id, node_name),
            resume: self.resume.take(),
            completed: std::mem::take(&mut self.completed),
        }
    }
}

/// Outcome of one node run.
#[derive(Debug)]
pub enum NodeOutcome {
    /// The node finished; apply the delta and follow an edge.
    Completed(StateUpdate),
    /// A guarded tool needs human approval. `completed` holds the batch
    /// results produced before the suspension so resume never re-runs them.
    Suspended {
        completed: Vec<Message>,
        interrupt: Interrupt,
    },
}

/// One executable unit in the graph.
#[async_trait]
pub trait Node: Send + Sync {
    async fn run(&self, state: &GraphState, ctx: &mut NodeContext) -> Result<NodeOutcome>;
}
