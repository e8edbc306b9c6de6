//! Human-in-the-loop wrapper.
//!
//! `Guarded` keeps the wrapped tool's surface unchanged but declares an
//! approval policy. The tool-execution node checks `approval()` before
//! running any tool: a guarded call suspends the graph with an interrupt
//! instead of executing, and only proceeds once a matching decision arrives.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::interrupt::ApprovalPolicy;

use super::{Tool, ToolCallRecord, ToolContext, ToolResult};

pub struct Guarded {
    inner: Arc<dyn Tool>,
    policy: ApprovalPolicy,
}

impl Guarded {
    pub fn new(inner: Arc<dyn Tool>, policy: ApprovalPolicy) -> Arc<dyn Tool> {
        Arc::new(Self { inner, policy })
    }
}

#[async_trait]
impl Tool for Guarded {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters_schema(&self) -> Value {
        self.inner.parameters_schema()
    }

    fn approval(&self) -> Option<ApprovalPolicy> {
        Some(self.policy)
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        self.inner.describe(params)
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        self.inner.execute(params, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes"
        }
        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }
        fn describe(&self, _params: &Value) -> ToolCallRecord {
            ToolCallRecord::new("echo", "Echoing", "Echoed", "Couldn't echo", "")
        }
        async fn execute(&self, params: Value, _ctx: &ToolContext) -> ToolResult {
            ToolResult::ok(params.to_string())
        }
    }

    #[tokio::test]
    async fn guard_preserves_surface_and_adds_policy() {
        let guarded = Guarded::new(Arc::new(Echo), ApprovalPolicy::accept_or_ignore());

        assert_eq!(guarded.name(), "echo");
        assert!(guarded.approval().is_some());

        let ctx = ToolContext::new(std::env::temp_dir());
        let result = guarded.execute(json!({"x": 1}), &ctx).await;
        assert!(result.success);
    }
}
