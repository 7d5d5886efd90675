use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::application::ports::{LlmClient, LlmClientError};
use crate::domain::ChatMessage;

pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Chat-completion client for OpenRouter or any OpenAI-compatible endpoint.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenRouterClient {
    pub fn new(
        api_key: Option<String>,
        api_url: Option<String>,
        model: String,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_url: api_url.unwrap_or_else(|| DEFAULT_OPENROUTER_URL.to_string()),
            model,
            temperature,
            max_tokens,
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmClientError> {
        let api_key = self.api_key.as_deref().ok_or(LlmClientError::MissingApiKey)?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, url = %self.api_url, "Sending chat completion request");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            tracing::warn!(status = status.as_u16(), "Chat completion API returned an error");
            return Err(LlmClientError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(format!("parse response: {}", e)))?;

        let reply = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmClientError::InvalidResponse("no choices returned".to_string()))?;

        tracing::info!(chars = reply.len(), "Chat completion received");

        Ok(reply)
    }
}
