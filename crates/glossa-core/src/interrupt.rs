//! Interrupts - paused-execution markers for human-in-the-loop approval.
//!
//! A guarded tool raises an `Interrupt` instead of executing. The interrupt
//! carries the pending call and the set of allowed human responses; it is
//! destroyed when a matching resume decision is supplied.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::types::AiToolCall;

/// Which human responses a guarded tool accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApprovalPolicy {
    pub allow_accept: bool,
    pub allow_edit: bool,
    pub allow_respond: bool,
    pub allow_ignore: bool,
}

impl ApprovalPolicy {
    /// The default guarded set: run as-is or skip.
    pub fn accept_or_ignore() -> Self {
        Self {
            allow_accept: true,
            allow_edit: false,
            allow_respond: false,
            allow_ignore: true,
        }
    }

    pub fn allows(&self, decision: &HumanDecision) -> bool {
        match decision {
            HumanDecision::Accept => self.allow_accept,
            HumanDecision::Edit(_) => self.allow_edit,
            HumanDecision::Respond(_) => self.allow_respond,
            HumanDecision::Ignore => self.allow_ignore,
        }
    }

    /// Human-readable list of permitted responses.
    pub fn allowed_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.allow_accept {
            names.push("accept");
        }
        if self.allow_edit {
            names.push("edit");
        }
        if self.allow_respond {
            names.push("respond");
        }
        if self.allow_ignore {
            names.push("ignore");
        }
        names
    }
}

/// A human decision resuming a suspended run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HumanDecision {
    /// Run the tool with its original arguments.
    Accept,
    /// Run the tool with overridden arguments.
    Edit(Value),
    /// Do not run the tool; the supplied text becomes the tool result.
    Respond(String),
    /// Skip execution and synthesize a rejection result.
    Ignore,
}

impl HumanDecision {
    pub fn name(&self) -> &'static str {
        match self {
            HumanDecision::Accept => "accept",
            HumanDecision::Edit(_) => "edit",
            HumanDecision::Respond(_) => "respond",
            HumanDecision::Ignore => "ignore",
        }
    }
}

/// A suspension marker: the pending tool call plus what the human may do
/// about it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interrupt {
    pub id: String,
    /// The tool call awaiting approval.
    pub call: AiToolCall,
    /// What the tool is about to do, for display.
    pub description: String,
    pub policy: ApprovalPolicy,
}

impl Interrupt {
    pub fn new(call: AiToolCall, description: impl Into<String>, policy: ApprovalPolicy) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            call,
            description: description.into(),
            policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accept_or_ignore_rejects_edit_and_respond() {
        let policy = ApprovalPolicy::accept_or_ignore();
        assert!(policy.allows(&HumanDecision::Accept));
        assert!(policy.allows(&HumanDecision::Ignore));
        assert!(!policy.allows(&HumanDecision::Edit(json!({}))));
        assert!(!policy.allows(&HumanDecision::Respond("no".to_string())));
        assert_eq!(policy.allowed_names(), vec!["accept", "ignore"]);
    }

    #[test]
    fn interrupt_round_trips_through_serde() {
        let interrupt = Interrupt::new(
            AiToolCall {
                id: "c1".to_string(),
                name: "terminal".to_string(),
                arguments: json!({"command": "rm -rf build"}),
            },
            "Executing command",
            ApprovalPolicy::accept_or_ignore(),
        );

        let encoded = serde_json::to_string(&interrupt).unwrap();
        let decoded: Interrupt = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, interrupt);
    }
}
