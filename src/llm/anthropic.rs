//! Anthropic Messages API client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AnthropicConfig;
use crate::models::{ContentBlock, ConversationMessage};
use crate::utils::HttpClient;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError};

/// Anthropic API version header.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic error response format.
#[derive(Debug, Deserialize)]
struct AnthropicError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Anthropic error wrapper.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: AnthropicError,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<WireBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Unsupported,
}

/// Client for `POST /v1/messages` (non-streaming).
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Arc<HttpClient>,
    api_key: String,
    model: String,
    endpoint: String,
}

impl AnthropicClient {
    /// Create a client from configuration. Fails if no API key is configured.
    pub fn new(client: Arc<HttpClient>, config: &AnthropicConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
        })
    }

    /// Model used for completions
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Builds the request body for the Messages API.
    fn build_request_body(&self, request: &CompletionRequest<'_>) -> Value {
        let messages: Vec<Value> = request.messages.iter().map(message_to_json).collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "messages": messages,
        });

        if !request.tools.is_empty() {
            body["tools"] = json!(request.tools);
        }

        body
    }
}

/// Wire form of one history entry.
fn message_to_json(message: &ConversationMessage) -> Value {
    match message {
        ConversationMessage::User(text) => json!({
            "role": "user",
            "content": text,
        }),
        ConversationMessage::Assistant(blocks) => json!({
            "role": "assistant",
            "content": blocks,
        }),
        ConversationMessage::ToolResults(results) => {
            let content: Vec<Value> = results
                .iter()
                .map(|result| {
                    json!({
                        "type": "tool_result",
                        "tool_use_id": result.tool_use_id,
                        "content": result.content,
                    })
                })
                .collect();
            json!({
                "role": "user",
                "content": content,
            })
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, LlmError> {
        let body = self.build_request_body(request);
        tracing::debug!(
            "Calling {} with {} messages",
            self.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Try to parse as Anthropic error
            let message = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(error_response) => format!(
                    "{}: {}",
                    error_response.error.error_type, error_response.error.message
                ),
                Err(_) => text,
            };
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::Parse(format!("Failed to parse Messages response: {}", e)))?;

        let content = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                WireBlock::Text { text } => Some(ContentBlock::Text { text }),
                WireBlock::ToolUse { id, name, input } => {
                    Some(ContentBlock::ToolUse { id, name, input })
                }
                WireBlock::Unsupported => {
                    tracing::debug!("Dropping unsupported content block");
                    None
                }
            })
            .collect();

        tracing::debug!("Model stopped with {:?}", parsed.stop_reason);
        Ok(CompletionResponse {
            content,
            stop_reason: parsed.stop_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToolResult;
    use mockito::Matcher;

    fn config(base_url: &str) -> AnthropicConfig {
        AnthropicConfig {
            api_key: Some("test-key".to_string()),
            model: "claude-test".to_string(),
            max_tokens: 100,
            base_url: base_url.to_string(),
        }
    }

    fn client(base_url: &str) -> AnthropicClient {
        AnthropicClient::new(Arc::new(HttpClient::new().unwrap()), &config(base_url)).unwrap()
    }

    #[test]
    fn test_missing_api_key() {
        let mut cfg = config("http://localhost");
        cfg.api_key = None;
        let result = AnthropicClient::new(Arc::new(HttpClient::new().unwrap()), &cfg);
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_message_wire_format() {
        let history = vec![
            ConversationMessage::User("find papers".into()),
            ConversationMessage::Assistant(vec![ContentBlock::tool_use(
                "toolu_1",
                "search_papers",
                json!({"topic": "llm"}),
            )]),
            ConversationMessage::ToolResults(vec![ToolResult {
                tool_use_id: "toolu_1".into(),
                content: "2401.1v1".into(),
            }]),
        ];
        let request = CompletionRequest {
            messages: &history,
            tools: &[],
            max_tokens: 100,
        };

        let body = client("http://localhost").build_request_body(&request);

        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["max_tokens"], 100);
        assert!(body.get("tools").is_none());
        assert_eq!(body["messages"][0], json!({"role": "user", "content": "find papers"}));
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][1]["content"][0]["type"], "tool_use");
        assert_eq!(
            body["messages"][2],
            json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": "toolu_1",
                    "content": "2401.1v1"
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_complete_parses_blocks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .match_body(Matcher::PartialJson(json!({"model": "claude-test"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "msg_1",
                    "type": "message",
                    "role": "assistant",
                    "content": [
                        {"type": "thinking", "thinking": "hmm", "signature": "x"},
                        {"type": "text", "text": "Searching."},
                        {"type": "tool_use", "id": "toolu_9", "name": "search_papers",
                         "input": {"topic": "llm"}}
                    ],
                    "stop_reason": "tool_use"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let history = vec![ConversationMessage::User("hi".into())];
        let request = CompletionRequest {
            messages: &history,
            tools: &[],
            max_tokens: 100,
        };
        let response = client(&server.url()).complete(&request).await.unwrap();
        mock.assert_async().await;

        assert_eq!(
            response.content,
            vec![
                ContentBlock::text("Searching."),
                ContentBlock::tool_use("toolu_9", "search_papers", json!({"topic": "llm"})),
            ]
        );
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body(
                json!({
                    "type": "error",
                    "error": {"type": "authentication_error", "message": "invalid x-api-key"}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let history = vec![ConversationMessage::User("hi".into())];
        let request = CompletionRequest {
            messages: &history,
            tools: &[],
            max_tokens: 100,
        };
        let result = client(&server.url()).complete(&request).await;

        match result {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "authentication_error: invalid x-api-key");
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }
}
