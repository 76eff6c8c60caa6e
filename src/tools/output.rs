//! Conversion of tool results to the plain text sent back to the model.

use crate::models::PaperRecord;

/// Text returned when a tool produced nothing
pub const EMPTY_RESULT_TEXT: &str = "The operation completed but didn't return any results.";

/// Every shape a tool can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Identifiers of papers found by a search
    PaperIds(Vec<String>),

    /// A stored paper record
    Record(PaperRecord),

    /// A human-readable message
    Message(String),
}

impl ToolOutput {
    /// Render the output as the tool result payload.
    pub fn to_text(&self) -> String {
        match self {
            ToolOutput::PaperIds(ids) if ids.is_empty() => EMPTY_RESULT_TEXT.to_string(),
            ToolOutput::PaperIds(ids) => ids.join(", "),
            ToolOutput::Record(record) => serde_json::to_string_pretty(record)
                .unwrap_or_else(|e| format!("Failed to serialize paper record: {}", e)),
            ToolOutput::Message(message) if message.is_empty() => EMPTY_RESULT_TEXT.to_string(),
            ToolOutput::Message(message) => message.clone(),
        }
    }
}
