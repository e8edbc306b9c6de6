//! Graph execution: drives a compiled graph from its entry (or a resume
//! target) until it finishes or suspends.
//!
//! The state is checkpointed after every transition, so a cancelled task
//! resumes from the last complete checkpoint. A suspension persists the
//! pending node and the batch results produced so far; the resume path
//! re-enters exactly that node with the human decision.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::ai::gateway::ModelGateway;
use crate::ai::types::Message;
use crate::error::{CoreError, Result};
use crate::graph::builder::{Graph, END};
use crate::graph::node::{NodeContext, NodeOutcome};
use crate::graph::state::StateUpdate;
use crate::interrupt::{HumanDecision, Interrupt};
use crate::net::ConnectivityProbe;
use crate::session::checkpoint::{CheckpointStore, PendingInterrupt};
use crate::session::events::SessionEvent;
use crate::tools::ToolContext;

/// Guard against cyclic graphs that never reach END.
const MAX_TRANSITIONS: usize = 500;

/// Input to one run: fresh conversation input, or a decision resuming a
/// suspended run.
#[derive(Debug)]
pub enum RunInput {
    Message(Message),
    Resume(HumanDecision),
}

#[derive(Debug)]
pub enum RunOutcome {
    Finished,
    Suspended(Interrupt),
}

/// Shared services threaded into every node execution.
#[derive(Clone)]
pub struct RunServices {
    pub gateway: Arc<ModelGateway>,
    pub probe: Arc<dyn ConnectivityProbe>,
    pub events: mpsc::UnboundedSender<SessionEvent>,
    pub tools: ToolContext,
    pub checkpoints: Arc<dyn CheckpointStore>,
}

pub struct GraphRunner {
    graph: Arc<Graph>,
}

impl GraphRunner {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    pub async fn run(
        &self,
        input: RunInput,
        services: &RunServices,
        thread_id: &str,
    ) -> Result<RunOutcome> {
        let mut checkpoint = services.checkpoints.load(thread_id)?.unwrap_or_default();

        let (mut current, mut resume, mut completed) = match input {
            RunInput::Message(message) => {
                if checkpoint.pending.is_some() {
                    return Err(CoreError::InvalidResume(
                        "an interrupt is outstanding; resume it instead of starting a new turn"
                            .to_string(),
                    ));
                }
                checkpoint.state.apply(StateUpdate::message(message));
                services.checkpoints.save(thread_id, &checkpoint)?;
                (self.graph.entry().to_string(), None, Vec::new())
            }
            RunInput::Resume(decision) => {
                let pending = checkpoint.pending.take().ok_or_else(|| {
                    CoreError::InvalidResume("no outstanding interrupt to resume".to_string())
                })?;
                (pending.node, Some(decision), pending.completed)
            }
        };

        for _ in 0..MAX_TRANSITIONS {
            let node = self.graph.node(&current)?;

            let mut ctx = NodeContext {
                gateway: Arc::clone(&services.gateway),
                probe: Arc::clone(&services.probe),
                events: services.events.clone(),
                tools: services.tools.clone(),
                checkpoints: Arc::clone(&services.checkpoints),
                thread_id: thread_id.to_string(),
                resume: resume.take(),
                completed: std::mem::take(&mut completed),
            };

            tracing::debug!(node = %current, thread = %thread_id, "running graph node");

            match node.run(&checkpoint.state, &mut ctx).await? {
                NodeOutcome::Completed(update) => {
                    let goto = update.goto.clone();
                    checkpoint.state.apply(update);
                    checkpoint.pending = None;
                    services.checkpoints.save(thread_id, &checkpoint)?;

                    let next = match goto {
                        Some(target) => {
                            if target != END && !self.graph.has_node(&target) {
                                return Err(CoreError::Graph(format!(
                                    "hand-off to unknown node '{target}'"
                                )));
                            }
                            target
                        }
                        None => self.graph.next_after(&current, &checkpoint.state)?,
                    };

                    if next == END {
                        return Ok(RunOutcome::Finished);
                    }
                    current = next;
                }
                NodeOutcome::Suspended {
                    completed: batch,
                    interrupt,
                } => {
                    checkpoint.pending = Some(PendingInterrupt {
                        node: current.clone(),
                        completed: batch,
                        interrupt: interrupt.clone(),
                    });
                    services.checkpoints.save(thread_id, &checkpoint)?;
                    return Ok(RunOutcome::Suspended(interrupt));
                }
            }
        }

        Err(CoreError::Graph(format!(
            "exceeded {MAX_TRANSITIONS} transitions without reaching a finish point"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::ModelTransport;
    use crate::ai::providers::ModelConfig;
    use crate::ai::types::{AiTool, AiToolCall};
    use crate::graph::builder::GraphBuilder;
    use crate::graph::node::Node;
    use crate::graph::state::GraphState;
    use crate::interrupt::ApprovalPolicy;
    use crate::net::StaticProbe;
    use crate::session::checkpoint::MemoryCheckpointStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    fn services() -> RunServices {
        let (events, _rx) = mpsc::unbounded_channel();
        RunServices {
            gateway: Arc::new(ModelGateway::new(Arc::new(NullTransport))),
            probe: Arc::new(StaticProbe(true)),
            events,
            tools: ToolContext::new(PathBuf::from("/tmp")),
            checkpoints: Arc::new(MemoryCheckpointStore::new()),
        }
    }

    /// Appends one assistant message per visit.
    struct SpeakNode {
        text: &'static str,
    }

    #[async_trait]
    impl Node for SpeakNode {
        async fn run(&self, _state: &GraphState, _ctx: &mut NodeContext) -> Result<NodeOutcome> {
            Ok(NodeOutcome::Completed(StateUpdate::message(
                Message::assistant(vec![crate::ai::types::Content::Text {
                    text: self.text.to_string(),
                }]),
            )))
        }
    }

    /// Suspends on first entry, completes once a decision arrives.
    struct GateNode {
        executions: AtomicUsize,
    }

    #[async_trait]
    impl Node for GateNode {
        async fn run(&self, _state: &GraphState, ctx: &mut NodeContext) -> Result<NodeOutcome> {
            match ctx.take_resume() {
                Some(_) => {
                    self.executions.fetch_add(1, Ordering::SeqCst);
                    Ok(NodeOutcome::Completed(StateUpdate::default()))
                }
                None => Ok(NodeOutcome::Suspended {
                    completed: Vec::new(),
                    interrupt: Interrupt::new(
                        AiToolCall {
                            id: "c1".to_string(),
                            name: "terminal".to_string(),
                            arguments: json!({}),
                        },
                        "Executing command",
                        ApprovalPolicy::accept_or_ignore(),
                    ),
                }),
            }
        }
    }

    #[tokio::test]
    async fn linear_graph_runs_to_finish_and_checkpoints() {
        let graph = Arc::new(
            GraphBuilder::new()
                .add_node("a", Arc::new(SpeakNode { text: "from a" }))
                .add_node("b", Arc::new(SpeakNode { text: "from b" }))
                .set_entry_point("a")
                .add_edge("a", "b")
                .set_finish_point("b")
                .compile()
                .unwrap(),
        );

        let services = services();
        let runner = GraphRunner::new(graph);
        let outcome = runner
            .run(RunInput::Message(Message::user("go")), &services, "t1")
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Finished));
        let checkpoint = services.checkpoints.load("t1").unwrap().unwrap();
        assert_eq!(checkpoint.state.messages.len(), 3);
        assert!(checkpoint.pending.is_none());
    }

    #[tokio::test]
    async fn suspension_persists_pending_and_resume_reenters_the_node() {
        let gate = Arc::new(GateNode {
            executions: AtomicUsize::new(0),
        });
        let graph = Arc::new(
            GraphBuilder::new()
                .add_node("gate", gate.clone() as Arc<dyn Node>)
                .set_entry_point("gate")
                .set_finish_point("gate")
                .compile()
                .unwrap(),
        );

        let services = services();
        let runner = GraphRunner::new(graph);

        let outcome = runner
            .run(RunInput::Message(Message::user("go")), &services, "t1")
            .await
            .unwrap();
        let RunOutcome::Suspended(interrupt) = outcome else {
            panic!("expected suspension");
        };
        assert_eq!(interrupt.call.name, "terminal");
        assert_eq!(gate.executions.load(Ordering::SeqCst), 0);

        let pending = services
            .checkpoints
            .load("t1")
            .unwrap()
            .unwrap()
            .pending
            .unwrap();
        assert_eq!(pending.node, "gate");

        let outcome = runner
            .run(RunInput::Resume(HumanDecision::Accept), &services, "t1")
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Finished));
        assert_eq!(gate.executions.load(Ordering::SeqCst), 1);
        assert!(services
            .checkpoints
            .load("t1")
            .unwrap()
            .unwrap()
            .pending
            .is_none());
    }

    #[tokio::test]
    async fn new_turn_is_rejected_while_suspended() {
        let graph = Arc::new(
            GraphBuilder::new()
                .add_node(
                    "gate",
                    Arc::new(GateNode {
                        executions: AtomicUsize::new(0),
                    }) as Arc<dyn Node>,
                )
                .set_entry_point("gate")
                .compile()
                .unwrap(),
        );

        let services = services();
        let runner = GraphRunner::new(graph);
        runner
            .run(RunInput::Message(Message::user("go")), &services, "t1")
            .await
            .unwrap();

        let err = runner
            .run(RunInput::Message(Message::user("another")), &services, "t1")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidResume(_)));
    }

    #[tokio::test]
    async fn resume_without_suspension_is_invalid() {
        let graph = Arc::new(
            GraphBuilder::new()
                .add_node("a", Arc::new(SpeakNode { text: "hi" }))
                .set_entry_point("a")
                .compile()
                .unwrap(),
        );

        let services = services();
        let err = GraphRunner::new(graph)
            .run(RunInput::Resume(HumanDecision::Accept), &services, "t1")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidResume(_)));
    }
}
