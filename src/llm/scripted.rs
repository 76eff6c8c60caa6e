//! Scripted LLM client for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::models::ConversationMessage;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError};

/// Replays queued responses in order and records every request's history.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    requests: Mutex<Vec<Vec<ConversationMessage>>>,
}

impl ScriptedClient {
    /// Create a client that answers with `responses`, one per call.
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue another response.
    pub fn push_response(&self, response: CompletionResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Histories sent so far, one per call.
    pub fn requests(&self) -> Vec<Vec<ConversationMessage>> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.messages.to_vec());

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Api {
                status: 500,
                message: "no scripted response left".to_string(),
            }))
    }
}
