//! Isolated units: sub-agents invoked as single opaque nodes.
//!
//! An isolated unit projects the minimal input out of the caller's state,
//! drives its private subgraph to completion on a scoped checkpoint key, and
//! returns nothing observable to the caller except its side effects (file
//! writes, generated artifacts). Its internal tool-call history never
//! pollutes the top-level conversation. Inner suspensions propagate to the
//! caller; the matching resume is routed back down on re-entry.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ai::types::Message;
use crate::error::Result;
use crate::graph::builder::Graph;
use crate::graph::node::{Node, NodeContext, NodeOutcome};
use crate::graph::runner::{GraphRunner, RunInput, RunOutcome, RunServices};
use crate::graph::state::{GraphState, StateUpdate};
use crate::tools::ToolContext;

/// Projection from the caller's state (and session context) to the isolated
/// unit's initial input text.
pub type InputProjection = Arc<dyn Fn(&GraphState, &ToolContext) -> Option<String> + Send + Sync>;

pub struct IsolatedAgentNode {
    name: &'static str,
    graph: Arc<Graph>,
    input: InputProjection,
}

impl IsolatedAgentNode {
    pub fn new(name: &'static str, graph: Graph, input: InputProjection) -> Arc<dyn Node> {
        Arc::new(Self {
            name,
            graph: Arc::new(graph),
            input,
        })
    }
}

#[async_trait]
impl Node for IsolatedAgentNode {
    async fn run(&self, state: &GraphState, ctx: &mut NodeContext) -> Result<NodeOutcome> {
        let mut child = ctx.child_scope(self.name);

        let input = match child.resume.take() {
            Some(decision) => RunInput::Resume(decision),
            None => {
                let Some(text) = (self.input)(state, &child.tools) else {
                    tracing::warn!(
                        agent = self.name,
                        "isolated unit skipped: no input available"
                    );
                    return Ok(NodeOutcome::Completed(StateUpdate::default()));
                };
                // Fresh invocation starts from a clean private state.
                child.checkpoints.delete(&child.thread_id)?;
                RunInput::Message(Message::user(text))
            }
        };

        let services = RunServices {
            gateway: Arc::clone(&child.gateway),
            probe: Arc::clone(&child.probe),
            events: child.events.clone(),
            tools: child.tools.clone(),
            checkpoints: Arc::clone(&child.checkpoints),
        };

        let runner = GraphRunner::new(Arc::clone(&self.graph));
        match runner.run(input, &services, &child.thread_id).await? {
            RunOutcome::Finished => {
                child.checkpoints.delete(&child.thread_id)?;
                Ok(NodeOutcome::Completed(StateUpdate::default()))
            }
            RunOutcome::Suspended(interrupt) => Ok(NodeOutcome::Suspended {
                completed: Vec::new(),
                interrupt,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::ModelTransport;
    use crate::ai::gateway::ModelGateway;
    use crate::ai::providers::ModelConfig;
    use crate::ai::types::{AiTool, Content};
    use crate::error::CoreError;
    use crate::graph::builder::GraphBuilder;
    use crate::net::StaticProbe;
    use crate::session::checkpoint::{CheckpointStore, MemoryCheckpointStore};
    use crate::session::events::SessionEvent;
    use std::path::PathBuf;
    use tokio::sync::mpsc;

    struct NullTransport;

    #[async_trait]
    impl ModelTransport for NullTransport {
        async fn complete(
            &self,
            _config: &ModelConfig,
            _messages: &[Message],
            _tools: &[AiTool],
        ) -> Result<Message> {
            Err(CoreError::Provider("unused".to_string()))
        }
    }

    /// Records the input message it was started with.
    struct EchoInputNode;

    #[async_trait]
    impl Node for EchoInputNode {
        async fn run(&self, state: &GraphState, _ctx: &mut NodeContext) -> Result<NodeOutcome> {
            let input = state.messages.first().map(|m| m.text()).unwrap_or_default();
            Ok(NodeOutcome::Completed(StateUpdate::message(
                Message::assistant(vec![Content::Text {
                    text: format!("saw: {input}"),
                }]),
            )))
        }
    }

    fn node_ctx(
        events: mpsc::UnboundedSender<SessionEvent>,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> NodeContext {
        NodeContext {
            gateway: Arc::new(ModelGateway::new(Arc::new(NullTransport))),
            probe: Arc::new(StaticProbe(true)),
            events,
            tools: ToolContext::new(PathBuf::from("/tmp")),
            checkpoints,
            thread_id: "session-1".to_string(),
            resume: None,
            completed: Vec::new(),
        }
    }

    #[tokio::test]
    async fn isolated_unit_returns_nothing_to_the_caller() {
        let inner = GraphBuilder::new()
            .add_node("inner", Arc::new(EchoInputNode))
            .set_entry_point("inner")
            .compile()
            .unwrap();

        let node = IsolatedAgentNode::new(
            "Worker",
            inner,
            Arc::new(|state: &GraphState, _tools: &ToolContext| Some(state.summary.clone())),
        );

        let checkpoints: Arc<dyn CheckpointStore> = Arc::new(MemoryCheckpointStore::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ctx = node_ctx(tx, Arc::clone(&checkpoints));

        let state = GraphState {
            messages: vec![Message::user("visible conversation")],
            summary: "private input".to_string(),
        };

        let outcome = node.run(&state, &mut ctx).await.unwrap();
        let NodeOutcome::Completed(update) = outcome else {
            panic!("expected completion");
        };
        // Isolation: no messages leak back into the caller's state.
        assert!(update.messages.is_empty());
        assert!(update.summary.is_none());
        // The private checkpoint is cleaned up after completion.
        assert!(checkpoints.load("session-1/Worker").unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_input_skips_the_unit() {
        let inner = GraphBuilder::new()
            .add_node("inner", Arc::new(EchoInputNode))
            .set_entry_point("inner")
            .compile()
            .unwrap();

        let node = IsolatedAgentNode::new(
            "Worker",
            inner,
            Arc::new(|_state: &GraphState, _tools: &ToolContext| None),
        );

        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ctx = node_ctx(tx, Arc::new(MemoryCheckpointStore::new()));

        let outcome = node.run(&GraphState::default(), &mut ctx).await.unwrap();
        assert!(matches!(outcome, NodeOutcome::Completed(_)));
    }
}
