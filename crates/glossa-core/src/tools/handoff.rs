//! Hand-off tool: transfers control from the chat agent to the generator.
//!
//! The original design expressed this as a graph command raised from inside
//! tool execution; here the redirect is an explicit field on the tool result
//! that the tool-execution node folds into its state update.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_params, Handoff, Tool, ToolCallRecord, ToolContext, ToolResult};

pub const GENERATOR_NODE: &str = "Generator";

pub struct TransferToGeneratorTool;

#[derive(Deserialize)]
struct Params {
    summary: String,
}

#[async_trait]
impl Tool for TransferToGeneratorTool {
    fn name(&self) -> &str {
        "transfer_to_generator"
    }

    fn description(&self) -> &str {
        "Transfer to the generator agent once the user's request is clear. \
         Provide a clearly written summary of what the user wants built."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "Clearly written summary of the user's request"
                }
            },
            "required": ["summary"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        ToolCallRecord::new(
            self.name(),
            "Transferring to the Generator agent",
            "Transferred to the Generator agent",
            "Couldn't transfer to the Generator agent",
            params
                .get("summary")
                .and_then(|s| s.as_str())
                .unwrap_or_default(),
        )
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<Params>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        tracing::debug!(summary = %params.summary, "transferring to generator");

        ToolResult {
            success: true,
            message: "Successfully transferred to Generator agent.".to_string(),
            handoff: Some(Handoff {
                target: GENERATOR_NODE.to_string(),
                summary: params.summary,
            }),
        }
    }
}
