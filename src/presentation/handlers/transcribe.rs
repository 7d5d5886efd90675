use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use serde::Serialize;

use crate::application::services::TranscriptionOutcome;
use crate::domain::{AudioUpload, TranscriptSegment};
use crate::presentation::state::AppState;

use super::error::ApiError;

const AUDIO_FIELD: &str = "audio";

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
    pub segments: Vec<TranscriptSegment>,
    pub success: bool,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let multipart = multipart.map_err(|e| {
        tracing::warn!(error = %e, "Transcribe request is not multipart");
        ApiError::BadRequest(format!("Failed to read multipart: {}", e))
    })?;

    let upload = read_audio_field(multipart).await?;

    tracing::debug!(
        filename = %upload.filename(),
        bytes = upload.size_bytes(),
        "Processing audio upload"
    );

    match state.transcription_service.transcribe(&upload).await {
        Ok(TranscriptionOutcome::Transcribed {
            transcript,
            segments,
        }) => Ok(Json(TranscribeResponse {
            transcript,
            segments,
            success: true,
        })),
        Ok(TranscriptionOutcome::NoSpeech { segments }) => {
            tracing::warn!("No speech detected in uploaded audio");
            Err(ApiError::NoSpeech { segments })
        }
        Err(e) => {
            tracing::error!(error = %e, "Transcription failed");
            Err(ApiError::Internal(format!("Transcription error: {}", e)))
        }
    }
}

/// Finds the `audio` file part. Parts with other names, and parts without a
/// filename (plain form values), are skipped.
async fn read_audio_field(mut multipart: Multipart) -> Result<AudioUpload, ApiError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                tracing::warn!("Transcribe request with no audio file");
                return Err(ApiError::BadRequest("No audio file provided".to_string()));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return Err(ApiError::BadRequest(format!(
                    "Failed to read multipart: {}",
                    e
                )));
            }
        };

        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        if filename.is_empty() {
            tracing::warn!("Transcribe request with empty filename");
            return Err(ApiError::BadRequest("No file selected".to_string()));
        }

        let data = field.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read audio bytes");
            ApiError::BadRequest(format!("Failed to read file: {}", e))
        })?;

        return Ok(AudioUpload::new(filename, data));
    }
}
