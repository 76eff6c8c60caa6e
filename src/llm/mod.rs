//! LLM transport.
//!
//! [`LlmClient`] is the only thing the conversation driver knows about the
//! model. [`AnthropicClient`] implements it over the Anthropic Messages API;
//! [`ScriptedClient`] replays canned responses in tests.

mod anthropic;
pub mod scripted;

pub use anthropic::AnthropicClient;
pub use scripted::ScriptedClient;

use async_trait::async_trait;

use crate::models::{ContentBlock, ConversationMessage};
use crate::tools::ToolDefinition;

/// One model call: the whole history, the tools on offer, and a token budget
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub messages: &'a [ConversationMessage],
    pub tools: &'a [ToolDefinition],
    pub max_tokens: u32,
}

/// The model's reply
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Content blocks in the order the model produced them
    pub content: Vec<ContentBlock>,

    /// Why generation stopped (e.g. "end_turn", "tool_use"), if reported
    pub stop_reason: Option<String>,
}

impl CompletionResponse {
    /// Create a response from content blocks
    pub fn new(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            stop_reason: None,
        }
    }

    /// A response consisting of one text block
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            stop_reason: Some("end_turn".to_string()),
        }
    }

    /// Whether this is a final answer: exactly one block, and it is text
    pub fn is_final_text(&self) -> bool {
        matches!(self.content.as_slice(), [ContentBlock::Text { .. }])
    }
}

/// A chat-completion backend with tool support
#[async_trait]
pub trait LlmClient: Send + Sync + std::fmt::Debug {
    /// Send the conversation and return the model's next turn
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, LlmError>;
}

/// Errors from the LLM transport
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key was configured
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with an error status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}
