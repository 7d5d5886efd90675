use async_trait::async_trait;

use crate::domain::ChatMessage;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("OpenRouter API key not configured")]
    MissingApiKey,
    #[error("OpenRouter API error: {status} - {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("{0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
