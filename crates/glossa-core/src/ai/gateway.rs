//! Model Gateway - the single entry point for model invocations.
//!
//! Holds the active ordered configuration list. An invocation binds the
//! caller's tool set, applies a hard per-call timeout, and falls back across
//! the configured models in registration order. Swapping the active
//! configuration takes effect on the next invocation; in-flight calls keep
//! the snapshot they captured.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::ai::client::ModelTransport;
use crate::ai::providers::ModelConfig;
use crate::ai::types::{AiTool, Message};
use crate::error::{CoreError, Result};

/// Hard per-call timeout. Elapse is a connectivity failure, not a model
/// error.
pub const INVOKE_TIMEOUT: Duration = Duration::from_secs(600);

pub struct ModelGateway {
    transport: Arc<dyn ModelTransport>,
    active: RwLock<Arc<Vec<ModelConfig>>>,
    timeout: Duration,
}

impl ModelGateway {
    pub fn new(transport: Arc<dyn ModelTransport>) -> Self {
        Self {
            transport,
            active: RwLock::new(Arc::new(Vec::new())),
            timeout: INVOKE_TIMEOUT,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_timeout(transport: Arc<dyn ModelTransport>, timeout: Duration) -> Self {
        Self {
            transport,
            active: RwLock::new(Arc::new(Vec::new())),
            timeout,
        }
    }

    /// Replace the active configuration set. Entries are validated up front;
    /// an invalid entry rejects the whole swap and leaves the previous set
    /// active.
    pub fn set_active(&self, configs: Vec<ModelConfig>) -> Result<()> {
        for config in &configs {
            config.validate()?;
        }
        *self.active.write() = Arc::new(configs);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.active.read().is_empty()
    }

    /// Invoke the active model with the caller's tools bound.
    ///
    /// Tries each configured model in order; the first success wins. The
    /// final attempt's error is surfaced when all fail.
    pub async fn invoke(&self, messages: &[Message], tools: &[AiTool]) -> Result<Message> {
        let configs = Arc::clone(&self.active.read());

        if configs.is_empty() {
            return Err(CoreError::Configuration(
                "no model configured; set up API credentials first".to_string(),
            ));
        }

        let mut last_err = CoreError::Provider("no attempt made".to_string());

        for config in configs.iter() {
            match tokio::time::timeout(
                self.timeout,
                self.transport.complete(config, messages, tools),
            )
            .await
            {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(err)) => {
                    tracing::warn!(
                        provider = %config.provider,
                        model = %config.model,
                        error = %err,
                        "model attempt failed, trying next configured model"
                    );
                    last_err = err;
                }
                Err(_elapsed) => {
                    tracing::warn!(
                        provider = %config.provider,
                        model = %config.model,
                        timeout_secs = self.timeout.as_secs(),
                        "model call timed out"
                    );
                    last_err = CoreError::Connectivity;
                }
            }
        }

        Err(last_err)
    }
}
