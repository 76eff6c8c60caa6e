//! # arXiv Chat
//!
//! An interactive assistant that answers questions about academic papers.
//! An LLM decides when to search arXiv or look up previously saved paper
//! metadata; results are persisted per search topic on the local filesystem.
//!
//! ## Architecture
//!
//! - [`models`]: Paper records and conversation messages
//! - [`store`]: Per-topic JSON persistence of paper metadata
//! - [`sources`]: Paper search providers (arXiv)
//! - [`tools`]: Tool declarations and dispatch for the LLM
//! - [`llm`]: LLM transport (Anthropic Messages API)
//! - [`chat`]: The conversation driver (tool loop)
//! - [`shell`]: Interactive read-eval-print loop
//! - [`config`]: Configuration management
//! - [`utils`]: HTTP client and other utilities

pub mod chat;
pub mod config;
pub mod llm;
pub mod models;
pub mod shell;
pub mod sources;
pub mod store;
pub mod tools;
pub mod utils;

// Re-export commonly used types
pub use chat::{ChatError, Chatbot};
pub use models::{ConversationMessage, Paper, PaperRecord};
pub use sources::{PaperSource, SourceError};
pub use store::PaperStore;
pub use tools::ToolRegistry;
