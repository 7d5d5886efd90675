use std::sync::Arc;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::domain::ChatMessage;

/// Relays a single user message to the chat model. No history is kept
/// between calls.
pub struct ChatService {
    llm_client: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl ChatService {
    pub fn new(llm_client: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm_client,
            system_prompt: system_prompt.into(),
        }
    }

    pub async fn reply(&self, user_message: &str) -> Result<String, LlmClientError> {
        let messages = [
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(user_message),
        ];

        self.llm_client.complete(&messages).await
    }
}
