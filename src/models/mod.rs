//! Core data models for papers and conversations.

mod message;
mod paper;

pub use message::{ContentBlock, ConversationMessage, ToolResult};
pub use paper::{Paper, PaperRecord, TopicPapers};
