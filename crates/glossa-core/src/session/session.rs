//! Execution session: one resumable run of the agent workflow.
//!
//! A session owns the checkpointed state for its thread id, runs each turn
//! as a spawned task feeding an event channel, surfaces suspensions as the
//! final event of a turn, and accepts the matching resume input. Turns are
//! strictly sequential; at most one interrupt is outstanding at a time.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::ai::gateway::ModelGateway;
use crate::ai::types::Message;
use crate::error::{CoreError, Result};
use crate::graph::builder::Graph;
use crate::graph::runner::{GraphRunner, RunInput, RunOutcome, RunServices};
use crate::interrupt::{HumanDecision, Interrupt};
use crate::net::ConnectivityProbe;
use crate::session::checkpoint::CheckpointStore;
use crate::session::events::SessionEvent;
use crate::tools::ToolContext;

/// Fixed user-visible message for connectivity failures.
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Connection error, make sure you are connected to the internet!";

/// Fixed user-visible message for everything else. Full detail goes to the
/// log only.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error encountered, please try again!";

/// Input to a turn: fresh user text, or a decision for the outstanding
/// interrupt.
#[derive(Debug, Clone)]
pub enum SessionInput {
    User(String),
    Resume(HumanDecision),
}

pub struct ExecutionSession {
    runner: GraphRunner,
    gateway: Arc<ModelGateway>,
    probe: Arc<dyn ConnectivityProbe>,
    checkpoints: Arc<dyn CheckpointStore>,
    tools: ToolContext,
    thread_id: String,
    awaiting: Mutex<Option<Interrupt>>,
    running: AtomicBool,
}

impl ExecutionSession {
    pub fn new(
        graph: Graph,
        gateway: Arc<ModelGateway>,
        probe: Arc<dyn ConnectivityProbe>,
        checkpoints: Arc<dyn CheckpointStore>,
        working_dir: PathBuf,
        thread_id: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            runner: GraphRunner::new(Arc::new(graph)),
            gateway,
            probe,
            checkpoints,
            tools: ToolContext::new(working_dir),
            thread_id: thread_id.into(),
            awaiting: Mutex::new(None),
            running: AtomicBool::new(false),
        })
    }

    /// The outstanding interrupt, if the session is awaiting human input.
    pub fn pending_interrupt(&self) -> Option<Interrupt> {
        self.awaiting.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start a new turn or resume a suspended one.
    ///
    /// Validation is synchronous: a fresh turn is rejected while an
    /// interrupt is outstanding, a resume is rejected when nothing is
    /// suspended or the decision is not in the interrupt's allowed set.
    /// On success the turn runs as a background task; the returned channel
    /// yields events in graph order, ending with an `Interrupt` if the turn
    /// suspended or an `Error` if it failed.
    pub fn start_or_resume(
        self: &Arc<Self>,
        input: SessionInput,
    ) -> Result<mpsc::UnboundedReceiver<SessionEvent>> {
        if self.is_running() {
            return Err(CoreError::TurnInProgress);
        }

        {
            let awaiting = self.awaiting.lock();
            match (&input, awaiting.as_ref()) {
                (SessionInput::User(_), Some(_)) => {
                    return Err(CoreError::InvalidResume(
                        "an interrupt is outstanding; respond to it before starting a new turn"
                            .to_string(),
                    ));
                }
                (SessionInput::Resume(_), None) => {
                    return Err(CoreError::InvalidResume(
                        "no outstanding interrupt to resume".to_string(),
                    ));
                }
                (SessionInput::Resume(decision), Some(interrupt)) => {
                    if !interrupt.policy.allows(decision) {
                        return Err(CoreError::InvalidResume(format!(
                            "response '{}' is not allowed here; allowed responses: {}",
                            decision.name(),
                            interrupt.policy.allowed_names().join(", ")
                        )));
                    }
                }
                (SessionInput::User(_), None) => {}
            }
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CoreError::TurnInProgress);
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = Arc::clone(self);

        tokio::spawn(async move {
            session.run_turn(input, &events_tx).await;
            // Clear the flag before the channel closes, so a consumer that
            // has drained the events can immediately start the next turn.
            session.running.store(false, Ordering::Release);
            drop(events_tx);
        });

        Ok(events_rx)
    }

    async fn run_turn(&self, input: SessionInput, events: &mpsc::UnboundedSender<SessionEvent>) {
        let services = RunServices {
            gateway: Arc::clone(&self.gateway),
            probe: Arc::clone(&self.probe),
            events: events.clone(),
            tools: self.tools.clone(),
            checkpoints: Arc::clone(&self.checkpoints),
        };

        let run_input = match input {
            SessionInput::User(text) => RunInput::Message(Message::user(text)),
            SessionInput::Resume(decision) => RunInput::Resume(decision),
        };

        match self.runner.run(run_input, &services, &self.thread_id).await {
            Ok(RunOutcome::Finished) => {
                *self.awaiting.lock() = None;
            }
            Ok(RunOutcome::Suspended(interrupt)) => {
                *self.awaiting.lock() = Some(interrupt.clone());
                let _ = events.send(SessionEvent::Interrupt(interrupt));
            }
            Err(err) => {
                // State up to the failure point is already checkpointed; no
                // rollback. Re-derive the outstanding interrupt from the
                // checkpoint so the session surface stays consistent.
                let pending = self
                    .checkpoints
                    .load(&self.thread_id)
                    .ok()
                    .flatten()
                    .and_then(|c| c.pending);
                *self.awaiting.lock() = pending.map(|p| p.interrupt);

                if err.is_connectivity() {
                    let _ = events.send(SessionEvent::Error {
                        message: CONNECTION_ERROR_MESSAGE.to_string(),
                    });
                } else {
                    tracing::error!(error = %err, thread = %self.thread_id, "turn failed");
                    let _ = events.send(SessionEvent::Error {
                        message: UNKNOWN_ERROR_MESSAGE.to_string(),
                    });
                }
            }
        }
    }
}
