use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::application::ports::LlmClientError;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub success: bool,
}

#[tracing::instrument(skip(state, request))]
pub async fn chat_handler(
    State(state): State<AppState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let user_message = match request {
        Ok(Json(ChatRequest {
            message: Some(message),
        })) if !message.is_empty() => message,
        Ok(_) => {
            tracing::warn!("Chat request with empty message");
            return Err(ApiError::BadRequest("No message provided".to_string()));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Chat request body rejected");
            return Err(ApiError::BadRequest("No message provided".to_string()));
        }
    };

    tracing::debug!(prompt = %sanitize_prompt(&user_message), "Relaying chat message");

    match state.chat_service.reply(&user_message).await {
        Ok(response) => {
            tracing::info!("Chat relay successful");
            Ok(Json(ChatResponse {
                response,
                success: true,
            }))
        }
        Err(e) => {
            match &e {
                LlmClientError::MissingApiKey => {
                    tracing::error!("Chat relay called without a configured API key")
                }
                other => tracing::error!(error = %other, "Chat relay failed"),
            }
            Err(ApiError::Internal(e.to_string()))
        }
    }
}
