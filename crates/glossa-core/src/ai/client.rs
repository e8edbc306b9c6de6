//! HTTP transport for model providers.
//!
//! Speaks two wire formats, selected per entry: the Anthropic Messages API
//! and OpenAI chat/completions (which also covers Gemini's compatibility
//! endpoint). Non-streaming: one request, one assistant message back.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::ai::providers::{ApiFormat, AuthHeader, ModelConfig};
use crate::ai::types::{AiTool, Content, Message, Role};
use crate::error::{CoreError, Result};

const MAX_OUTPUT_TOKENS: usize = 8_192;

/// Seam between the gateway and the wire. The gateway owns timeout and
/// fallback; a transport only knows how to complete one call against one
/// configured model.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn complete(
        &self,
        config: &ModelConfig,
        messages: &[Message],
        tools: &[AiTool],
    ) -> Result<Message>;
}

/// Production transport over reqwest.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    fn build_request(&self, config: &ModelConfig) -> reqwest::RequestBuilder {
        let mut request = self.http.post(config.api_url());

        request = match config.provider.auth_header() {
            AuthHeader::XApiKey => request
                .header("x-api-key", &config.api_key)
                .header("anthropic-version", "2023-06-01"),
            AuthHeader::Bearer => request.bearer_auth(&config.api_key),
        };

        request.header("content-type", "application/json")
    }

    async fn send(&self, config: &ModelConfig, body: Value) -> Result<Value> {
        let response = self
            .build_request(config)
            .json(&body)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CoreError::Provider(format!(
                "{} returned HTTP {}: {}",
                config.provider, status, detail
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CoreError::Provider(format!("{}: malformed response: {}", config.provider, e)))
    }
}

fn classify_request_error(err: reqwest::Error) -> CoreError {
    if err.is_timeout() || err.is_connect() {
        CoreError::Connectivity
    } else {
        CoreError::Provider(err.to_string())
    }
}

#[async_trait]
impl ModelTransport for HttpTransport {
    async fn complete(
        &self,
        config: &ModelConfig,
        messages: &[Message],
        tools: &[AiTool],
    ) -> Result<Message> {
        match config.provider.api_format() {
            ApiFormat::Anthropic => {
                let body = build_anthropic_body(config, messages, tools);
                let json = self.send(config, body).await?;
                parse_anthropic_response(&json)
            }
            ApiFormat::OpenAI => {
                let body = build_openai_body(config, messages, tools);
                let json = self.send(config, body).await?;
                parse_openai_response(&json)
            }
        }
    }
}

// ── Anthropic format ───────────────────────────────────────────────────

fn build_anthropic_body(config: &ModelConfig, messages: &[Message], tools: &[AiTool]) -> Value {
    let mut system = String::new();
    let mut api_messages: Vec<Value> = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => {
                if !system.is_empty() {
                    system.push_str("\n\n");
                }
                system.push_str(&msg.text());
            }
            Role::User => {
                api_messages.push(json!({"role": "user", "content": msg.text()}));
            }
            Role::Assistant => {
                api_messages.push(json!({
                    "role": "assistant",
                    "content": assistant_blocks(msg),
                }));
            }
            // Tool results ride as user-role tool_result blocks.
            Role::Tool => {
                api_messages.push(json!({
                    "role": "user",
                    "content": tool_result_blocks(msg),
                }));
            }
        }
    }

    let mut body = json!({
        "model": config.model,
        "max_tokens": MAX_OUTPUT_TOKENS,
        "messages": api_messages,
    });

    if !system.is_empty() {
        body["system"] = Value::String(system);
    }
    if !tools.is_empty() {
        body["tools"] = json!(tools
            .iter()
            .map(|t| json!({
                "name": t.name,
                "description": t.description,
                "input_schema": t.input_schema,
            }))
            .collect::<Vec<_>>());
    }

    body
}

fn assistant_blocks(msg: &Message) -> Vec<Value> {
    msg.content
        .iter()
        .filter_map(|c| match c {
            Content::Text { text } => Some(json!({"type": "text", "text": text})),
            Content::ToolUse { id, name, input } => Some(json!({
                "type": "tool_use",
                "id": id,
                "name": name,
                "input": input,
            })),
            Content::ToolResult { .. } => None,
        })
        .collect()
}

fn tool_result_blocks(msg: &Message) -> Vec<Value> {
    msg.content
        .iter()
        .filter_map(|c| match c {
            Content::ToolResult {
                tool_use_id,
                output,
                is_error,
            } => Some(json!({
                "type": "tool_result",
                "tool_use_id": tool_use_id,
                "content": output,
                "is_error": is_error.unwrap_or(false),
            })),
            _ => None,
        })
        .collect()
}

fn parse_anthropic_response(json: &Value) -> Result<Message> {
    let blocks = json
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| CoreError::Provider("response has no content array".to_string()))?;

    let mut content = Vec::new();
    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                    content.push(Content::Text {
                        text: text.to_string(),
                    });
                }
            }
            Some("tool_use") => {
                content.push(Content::ToolUse {
                    id: block
                        .get("id")
                        .and_then(|i| i.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    name: block
                        .get("name")
                        .and_then(|n| n.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    input: block.get("input").cloned().unwrap_or(Value::Null),
                });
            }
            // Thinking and other block types are not part of the contract.
            _ => {}
        }
    }

    if content.is_empty() {
        return Err(CoreError::Provider(
            "response contained no usable content blocks".to_string(),
        ));
    }

    Ok(Message::assistant(content))
}

// ── OpenAI format ──────────────────────────────────────────────────────

fn build_openai_body(config: &ModelConfig, messages: &[Message], tools: &[AiTool]) -> Value {
    let mut api_messages: Vec<Value> = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => {
                api_messages.push(json!({"role": "system", "content": msg.text()}));
            }
            Role::User => {
                api_messages.push(json!({"role": "user", "content": msg.text()}));
            }
            Role::Assistant => {
                let mut entry = json!({"role": "assistant", "content": msg.text()});
                let calls: Vec<Value> = msg
                    .tool_calls()
                    .into_iter()
                    .map(|c| {
                        json!({
                            "id": c.id,
                            "type": "function",
                            "function": {
                                "name": c.name,
                                "arguments": c.arguments.to_string(),
                            }
                        })
                    })
                    .collect();
                if !calls.is_empty() {
                    entry["tool_calls"] = Value::Array(calls);
                }
                api_messages.push(entry);
            }
            Role::Tool => {
                for block in &msg.content {
                    if let Content::ToolResult {
                        tool_use_id,
                        output,
                        ..
                    } = block
                    {
                        api_messages.push(json!({
                            "role": "tool",
                            "tool_call_id": tool_use_id,
                            "content": output,
                        }));
                    }
                }
            }
        }
    }

    let mut body = json!({
        "model": config.model,
        "max_tokens": MAX_OUTPUT_TOKENS,
        "messages": api_messages,
    });

    if !tools.is_empty() {
        body["tools"] = json!(tools
            .iter()
            .map(|t| json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.input_schema,
                }
            }))
            .collect::<Vec<_>>());
    }

    body
}

fn parse_openai_response(json: &Value) -> Result<Message> {
    let message = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| CoreError::Provider("response has no choices".to_string()))?;

    let mut content = Vec::new();

    if let Some(text) = message.get("content").and_then(|c| c.as_str()) {
        if !text.is_empty() {
            content.push(Content::Text {
                text: text.to_string(),
            });
        }
    }

    if let Some(calls) = message.get("tool_calls").and_then(|c| c.as_array()) {
        for call in calls {
            let function = call.get("function").cloned().unwrap_or(Value::Null);
            let arguments = function
                .get("arguments")
                .and_then(|a| a.as_str())
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or(Value::Null);

            content.push(Content::ToolUse {
                id: call
                    .get("id")
                    .and_then(|i| i.as_str())
                    .unwrap_or_default()
                    .to_string(),
                name: function
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or_default()
                    .to_string(),
                input: arguments,
            });
        }
    }

    if content.is_empty() {
        return Err(CoreError::Provider(
            "response message was empty".to_string(),
        ));
    }

    Ok(Message::assistant(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::providers::ProviderId;

    fn config() -> ModelConfig {
        ModelConfig::new(ProviderId::Anthropic, "claude-sonnet-4-5", "sk-test")
    }

    #[test]
    fn anthropic_body_separates_system_and_tool_results() {
        let messages = vec![
            Message::system("be helpful"),
            Message::user("hi"),
            Message::assistant(vec![Content::ToolUse {
                id: "c1".to_string(),
                name: "terminal".to_string(),
                input: json!({"command": "ls"}),
            }]),
            Message::tool_result("c1", "ok", false),
        ];

        let body = build_anthropic_body(&config(), &messages, &[]);

        assert_eq!(body["system"], "be helpful");
        let api_messages = body["messages"].as_array().unwrap();
        assert_eq!(api_messages.len(), 3);
        assert_eq!(api_messages[2]["role"], "user");
        assert_eq!(api_messages[2]["content"][0]["type"], "tool_result");
        assert_eq!(api_messages[2]["content"][0]["tool_use_id"], "c1");
    }

    #[test]
    fn anthropic_response_parses_tool_use() {
        let json = json!({
            "content": [
                {"type": "text", "text": "let me check"},
                {"type": "tool_use", "id": "c9", "name": "read_file", "input": {"path": "a.txt"}}
            ]
        });

        let msg = parse_anthropic_response(&json).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text(), "let me check");
        let calls = msg.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "read_file");
        assert_eq!(calls[0].arguments["path"], "a.txt");
    }

    #[test]
    fn openai_response_decodes_string_arguments() {
        let json = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_a",
                        "type": "function",
                        "function": {"name": "write_file", "arguments": "{\"path\": \"x\"}"}
                    }]
                }
            }]
        });

        let msg = parse_openai_response(&json).unwrap();
        let calls = msg.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments["path"], "x");
    }

    #[test]
    fn empty_response_is_a_provider_error() {
        let err = parse_anthropic_response(&json!({"content": []})).unwrap_err();
        assert!(matches!(err, CoreError::Provider(_)));
    }
}
