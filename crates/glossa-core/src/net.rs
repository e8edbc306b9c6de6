//! Internet connectivity probe.
//!
//! Consulted before every top-level model invocation so the agent fails fast
//! with a connectivity error instead of burning the gateway timeout.

use std::time::Duration;

use async_trait::async_trait;

const PROBE_URL: &str = "https://clients3.google.com/generate_204";
const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Probe backed by a cheap HTTP request.
pub struct HttpProbe {
    http: reqwest::Client,
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpProbe {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn is_online(&self) -> bool {
        match self
            .http
            .get(PROBE_URL)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => {
                tracing::debug!(status = %response.status(), "connectivity probe");
                response.status().is_success()
            }
            Err(err) => {
                tracing::debug!(error = %err, "connectivity probe failed");
                false
            }
        }
    }
}

/// Fixed-answer probe for tests and offline development.
pub struct StaticProbe(pub bool);

#[async_trait]
impl ConnectivityProbe for StaticProbe {
    async fn is_online(&self) -> bool {
        self.0
    }
}
