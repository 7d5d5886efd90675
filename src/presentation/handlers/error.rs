use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::TranscriptSegment;

/// Error responses of the JSON endpoints. Every body carries `success: false`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NoSpeech { segments: Vec<TranscriptSegment> },
    Internal(String),
}

pub const NO_SPEECH_MESSAGE: &str = "No speech detected in the audio. Please try speaking more clearly or check your audio file.";

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    success: bool,
}

#[derive(Serialize)]
struct NoSpeechBody {
    error: &'static str,
    transcript: &'static str,
    segments: Vec<TranscriptSegment>,
    success: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error,
                    success: false,
                }),
            )
                .into_response(),
            ApiError::NoSpeech { segments } => (
                StatusCode::BAD_REQUEST,
                Json(NoSpeechBody {
                    error: NO_SPEECH_MESSAGE,
                    transcript: "",
                    segments,
                    success: false,
                }),
            )
                .into_response(),
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error,
                    success: false,
                }),
            )
                .into_response(),
        }
    }
}
