//! Provider identifiers and built-in endpoint table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Unique identifier for each supported provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    #[default]
    Anthropic,
    OpenAI,
    GoogleGenAi,
}

impl ProviderId {
    /// All providers, in the order credential entries are offered during
    /// setup. This is not the fallback order - that comes from the user's
    /// configured entry order.
    pub fn all() -> &'static [ProviderId] {
        &[
            ProviderId::Anthropic,
            ProviderId::OpenAI,
            ProviderId::GoogleGenAi,
        ]
    }

    /// Key used in the credentials file.
    pub fn storage_key(&self) -> &'static str {
        match self {
            ProviderId::Anthropic => "anthropic",
            ProviderId::OpenAI => "openai",
            ProviderId::GoogleGenAi => "google_genai",
        }
    }

    /// Default chat endpoint for the provider.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::Anthropic => "https://api.anthropic.com/v1/messages",
            ProviderId::OpenAI => "https://api.openai.com/v1/chat/completions",
            // Gemini through the OpenAI-compatible endpoint.
            ProviderId::GoogleGenAi => {
                "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
            }
        }
    }

    /// Wire format spoken at the endpoint.
    pub fn api_format(&self) -> ApiFormat {
        match self {
            ProviderId::Anthropic => ApiFormat::Anthropic,
            ProviderId::OpenAI | ProviderId::GoogleGenAi => ApiFormat::OpenAI,
        }
    }

    /// How the API key is sent.
    pub fn auth_header(&self) -> AuthHeader {
        match self {
            ProviderId::Anthropic => AuthHeader::XApiKey,
            ProviderId::OpenAI | ProviderId::GoogleGenAi => AuthHeader::Bearer,
        }
    }

    /// Models suggested during setup, first is the default.
    pub fn suggested_models(&self) -> &'static [&'static str] {
        match self {
            ProviderId::Anthropic => &["claude-sonnet-4-5", "claude-haiku-4-5"],
            ProviderId::OpenAI => &["gpt-4o", "gpt-4o-mini"],
            ProviderId::GoogleGenAi => &["gemini-2.5-flash", "gemini-2.5-pro"],
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Anthropic => write!(f, "Anthropic"),
            ProviderId::OpenAI => write!(f, "OpenAI"),
            ProviderId::GoogleGenAi => write!(f, "Google GenAI"),
        }
    }
}

/// Wire format for a provider endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFormat {
    /// Anthropic Messages API (content blocks, `tool_use`/`tool_result`).
    Anthropic,
    /// OpenAI chat/completions (also used by Gemini's compatibility layer).
    OpenAI,
}

/// How to send the API key in requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthHeader {
    /// `x-api-key: <key>` (Anthropic style).
    #[default]
    XApiKey,
    /// `Authorization: Bearer <key>` (OpenAI style).
    Bearer,
}

/// One configured model: the unit of the gateway's fallback list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub provider: ProviderId,
    pub model: String,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ModelConfig {
    pub fn new(provider: ProviderId, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// Endpoint to call, honoring the per-entry override.
    pub fn api_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Fail fast on incomplete entries before anything reaches the wire.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(CoreError::Configuration(format!(
                "{} entry is missing a model id",
                self.provider
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(CoreError::Configuration(format!(
                "{} entry is missing an API key",
                self.provider
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_urls_match_format() {
        assert_eq!(ProviderId::Anthropic.api_format(), ApiFormat::Anthropic);
        assert_eq!(ProviderId::OpenAI.api_format(), ApiFormat::OpenAI);
        assert_eq!(ProviderId::GoogleGenAi.api_format(), ApiFormat::OpenAI);
        assert!(ProviderId::GoogleGenAi.default_base_url().contains("openai"));
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let missing_key = ModelConfig::new(ProviderId::Anthropic, "claude-sonnet-4-5", "");
        assert!(missing_key.validate().is_err());

        let missing_model = ModelConfig::new(ProviderId::OpenAI, "  ", "sk-test");
        assert!(missing_model.validate().is_err());

        let ok = ModelConfig::new(ProviderId::OpenAI, "gpt-4o", "sk-test");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn base_url_override_wins() {
        let mut cfg = ModelConfig::new(ProviderId::Anthropic, "m", "k");
        assert_eq!(cfg.api_url(), "https://api.anthropic.com/v1/messages");
        cfg.base_url = Some("http://localhost:8080/v1/messages".to_string());
        assert_eq!(cfg.api_url(), "http://localhost:8080/v1/messages");
    }
}
