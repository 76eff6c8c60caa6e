//! The conversation driver.
//!
//! [`Chatbot::process_query`] runs the tool loop for one user query:
//!
//! 1. append the query and call the model with the full history
//! 2. a reply that is exactly one text block ends the query
//! 3. otherwise the reply is appended as one assistant turn, every tool it
//!    requests is run in order, the results are appended as one message,
//!    and the model is called again
//!
//! A reply without any content blocks fails the query.
//!
//! History is kept across queries for the lifetime of the `Chatbot`.

use std::io::Write;
use std::sync::Arc;

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use crate::models::{ContentBlock, ConversationMessage, ToolResult};
use crate::tools::{ToolError, ToolRegistry};

/// Errors that abort a query
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The model call failed
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// A requested tool failed or does not exist
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The model replied with no usable content blocks
    #[error("The model returned an empty response")]
    EmptyResponse,

    /// Output could not be written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Conversation state plus the collaborators needed to answer queries
#[derive(Debug)]
pub struct Chatbot {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    max_tokens: u32,
    history: Vec<ConversationMessage>,
    model_calls: usize,
}

impl Chatbot {
    /// Create a chatbot with an empty history
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, max_tokens: u32) -> Self {
        Self {
            llm,
            tools,
            max_tokens,
            history: Vec::new(),
            model_calls: 0,
        }
    }

    /// Messages exchanged so far
    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }

    /// Number of model calls made so far
    pub fn model_calls(&self) -> usize {
        self.model_calls
    }

    /// Answer one query, writing model text and tool activity to `out`.
    ///
    /// If the query fails, the messages it added are removed again so the
    /// history never holds a tool request without its result.
    pub async fn process_query<W: Write>(
        &mut self,
        query: &str,
        out: &mut W,
    ) -> Result<(), ChatError> {
        let checkpoint = self.history.len();
        let result = self.run_tool_loop(query, out).await;
        if result.is_err() {
            self.history.truncate(checkpoint);
        }
        result
    }

    async fn run_tool_loop<W: Write>(&mut self, query: &str, out: &mut W) -> Result<(), ChatError> {
        self.history.push(ConversationMessage::User(query.to_string()));
        let mut response = self.call_model().await?;

        loop {
            // An empty assistant turn would be rejected on every later request
            if response.content.is_empty() {
                return Err(ChatError::EmptyResponse);
            }

            if response.is_final_text() {
                if let Some(text) = response.content[0].as_text() {
                    writeln!(out, "{}", text)?;
                }
                self.history
                    .push(ConversationMessage::Assistant(response.content));
                return Ok(());
            }

            let mut invocations = Vec::new();
            for block in &response.content {
                match block {
                    ContentBlock::Text { text } => writeln!(out, "{}", text)?,
                    ContentBlock::ToolUse { id, name, input } => {
                        invocations.push((id.clone(), name.clone(), input.clone()))
                    }
                }
            }

            // The assistant turn goes into history before any of its tools run
            self.history
                .push(ConversationMessage::Assistant(response.content));

            if invocations.is_empty() {
                tracing::debug!("Model turn had no tool requests; ending query");
                return Ok(());
            }

            let mut results = Vec::with_capacity(invocations.len());
            for (id, name, input) in invocations {
                writeln!(out, "Calling tool {} with args {}", name, input)?;
                tracing::info!("Calling tool {} ({})", name, id);

                let content = self.tools.dispatch(&name, &input).await?;
                results.push(ToolResult {
                    tool_use_id: id,
                    content,
                });
            }
            self.history.push(ConversationMessage::ToolResults(results));

            response = self.call_model().await?;
        }
    }

    async fn call_model(&mut self) -> Result<CompletionResponse, LlmError> {
        self.model_calls += 1;
        let request = CompletionRequest {
            messages: &self.history,
            tools: self.tools.definitions(),
            max_tokens: self.max_tokens,
        };
        let response = self.llm.complete(&request).await?;
        tracing::debug!(
            "Model returned {} blocks (stop reason: {:?})",
            response.content.len(),
            response.stop_reason
        );
        Ok(response)
    }
}
