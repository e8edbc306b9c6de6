//! The two nodes every agent subgraph is made of: a reasoning node and a
//! tool-execution node.

use async_trait::async_trait;

use crate::ai::types::Message;
use crate::error::{CoreError, Result};
use crate::graph::node::{Node, NodeContext, NodeOutcome};
use crate::graph::state::{GraphState, StateUpdate};
use crate::interrupt::{HumanDecision, Interrupt};
use crate::session::events::SessionEvent;
use crate::tools::{ai_tools, find_tool, ToolResult, ToolSet};

/// Reasoning node: prepends the agent's system message, invokes the model
/// gateway with the agent's tools bound, and returns exactly one new
/// assistant message. No side effects beyond the returned delta.
pub struct ReasoningNode {
    pub agent: &'static str,
    pub system_prompt: String,
    pub tools: ToolSet,
}

#[async_trait]
impl Node for ReasoningNode {
    async fn run(&self, state: &GraphState, ctx: &mut NodeContext) -> Result<NodeOutcome> {
        if !ctx.probe.is_online().await {
            return Err(CoreError::Connectivity);
        }

        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend(state.messages.iter().cloned());

        let response = ctx.gateway.invoke(&messages, &ai_tools(&self.tools)).await?;

        tracing::debug!(agent = self.agent, "model responded");

        let text = response.text();
        if !text.is_empty() {
            ctx.emit(SessionEvent::Assistant { delta: text });
        }

        Ok(NodeOutcome::Completed(StateUpdate::message(response)))
    }
}

/// Tool-execution node: runs every tool call requested by the last assistant
/// message, in order. A guarded tool suspends the batch with an interrupt;
/// results completed before the suspension ride along in the checkpoint so a
/// resume never re-executes them.
pub struct ToolExecNode {
    pub tools: ToolSet,
}

#[async_trait]
impl Node for ToolExecNode {
    async fn run(&self, state: &GraphState, ctx: &mut NodeContext) -> Result<NodeOutcome> {
        let calls = state
            .last_message()
            .map(|m| m.tool_calls())
            .unwrap_or_default();

        // Results already produced before a suspension, if resuming.
        let mut results: Vec<Message> = std::mem::take(&mut ctx.completed);
        let mut decision = ctx.take_resume();
        let mut summary = None;
        let mut goto = None;

        for call in calls.iter().skip(results.len()) {
            let Some(tool) = find_tool(&self.tools, &call.name) else {
                results.push(Message::tool_result(
                    &call.id,
                    format!("Unknown tool: {}", call.name),
                    true,
                ));
                continue;
            };

            let mut arguments = call.arguments.clone();

            if let Some(policy) = tool.approval() {
                match decision.take() {
                    None => {
                        let record = tool.describe(&arguments);
                        return Ok(NodeOutcome::Suspended {
                            completed: results,
                            interrupt: Interrupt::new(call.clone(), record.in_progress, policy),
                        });
                    }
                    Some(HumanDecision::Accept) => {}
                    Some(HumanDecision::Edit(overridden)) => {
                        arguments = overridden;
                    }
                    Some(HumanDecision::Respond(text)) => {
                        results.push(Message::tool_result(&call.id, text, false));
                        continue;
                    }
                    Some(HumanDecision::Ignore) => {
                        results.push(Message::tool_result(
                            &call.id,
                            format!("Tool '{}' was not run: the user chose to skip it.", call.name),
                            true,
                        ));
                        continue;
                    }
                }
            }

            ctx.emit(SessionEvent::Tool(tool.describe(&arguments)));

            let result: ToolResult = tool.execute(arguments, &ctx.tools).await;

            if let Some(handoff) = &result.handoff {
                summary = Some(handoff.summary.clone());
                goto = Some(handoff.target.clone());
            }

            results.push(Message::tool_result(
                &call.id,
                result.message,
                !result.success,
            ));
        }

        Ok(NodeOutcome::Completed(StateUpdate {
            messages: results,
            summary,
            goto,
        }))
    }
}
