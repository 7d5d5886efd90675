use async_trait::async_trait;

use crate::domain::Transcription;

/// A loaded speech-to-text model. Implementations that cannot run inference
/// concurrently must serialize calls internally.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(
        &self,
        samples: &[f32],
        batch_size: usize,
    ) -> Result<Transcription, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
}
