//! Conversation history types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single block of model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text { text: String },

    /// A request to invoke a tool
    ToolUse {
        /// Request identifier, echoed back in the matching [`ToolResult`]
        id: String,
        /// Tool name
        name: String,
        /// Structured arguments
        input: Value,
    },
}

impl ContentBlock {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// Create a tool-use block
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Text content, if this is a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::ToolUse { .. } => None,
        }
    }

    /// Whether this block asks for a tool invocation
    pub fn is_tool_use(&self) -> bool {
        matches!(self, ContentBlock::ToolUse { .. })
    }
}

/// Output of one tool invocation, correlated by request id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub content: String,
}

/// One entry in the conversation history.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationMessage {
    /// Text typed by the user
    User(String),

    /// A model turn: text and/or tool requests, in the order the model emitted them
    Assistant(Vec<ContentBlock>),

    /// Results for the tool requests of the preceding assistant turn
    ToolResults(Vec<ToolResult>),
}

impl ConversationMessage {
    /// Tool-use ids requested by this message (empty unless it is an assistant turn)
    pub fn tool_use_ids(&self) -> Vec<&str> {
        match self {
            ConversationMessage::Assistant(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, .. } => Some(id.as_str()),
                    ContentBlock::Text { .. } => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}
