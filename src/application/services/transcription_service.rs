use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::application::ports::{
    AudioDecoder, AudioDecoderError, TranscriptionEngine, TranscriptionError,
};
use crate::domain::{AudioUpload, TranscriptSegment};

const STAGED_FILE_PREFIX: &str = "upload-";

pub struct TranscriptionService {
    decoder: Arc<dyn AudioDecoder>,
    engine: Arc<dyn TranscriptionEngine>,
    batch_size: usize,
    staging_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionOutcome {
    Transcribed {
        transcript: String,
        segments: Vec<TranscriptSegment>,
    },
    NoSpeech {
        segments: Vec<TranscriptSegment>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionServiceError {
    #[error("failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),
    #[error(transparent)]
    Decoding(#[from] AudioDecoderError),
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
    #[error("decode worker failed: {0}")]
    Worker(String),
}

impl TranscriptionService {
    pub fn new(
        decoder: Arc<dyn AudioDecoder>,
        engine: Arc<dyn TranscriptionEngine>,
        batch_size: usize,
    ) -> Self {
        Self {
            decoder,
            engine,
            batch_size,
            staging_dir: None,
        }
    }

    /// Stage uploads under `dir` instead of the OS temp directory.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Stages the upload, decodes it and runs the model. The staged file is
    /// removed when this returns, whichever path was taken.
    pub async fn transcribe(
        &self,
        upload: &AudioUpload,
    ) -> Result<TranscriptionOutcome, TranscriptionServiceError> {
        let staged = self.stage(upload)?;

        tracing::debug!(
            path = %staged.path().display(),
            bytes = upload.size_bytes(),
            "Upload staged for decoding"
        );

        let samples = self.decode(staged.path()).await?;

        tracing::debug!(
            samples = samples.len(),
            duration_secs = samples.len() as f32 / 16_000.0,
            "Audio loaded, starting transcription"
        );

        let transcription = self.engine.transcribe(&samples, self.batch_size).await?;

        let outcome = match transcription.resolve_transcript() {
            Some(transcript) => {
                tracing::info!(
                    chars = transcript.len(),
                    segments = transcription.segments.len(),
                    "Transcription completed"
                );
                TranscriptionOutcome::Transcribed {
                    transcript,
                    segments: transcription.segments,
                }
            }
            None => {
                tracing::info!(
                    segments = transcription.segments.len(),
                    "No speech detected in the audio"
                );
                TranscriptionOutcome::NoSpeech {
                    segments: transcription.segments,
                }
            }
        };

        drop(staged);
        Ok(outcome)
    }

    fn stage(&self, upload: &AudioUpload) -> Result<NamedTempFile, std::io::Error> {
        let suffix = format!(".{}", upload.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGED_FILE_PREFIX).suffix(&suffix);

        let mut file = match &self.staging_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(upload.data())?;
        file.flush()?;

        Ok(file)
    }

    async fn decode(&self, path: &Path) -> Result<Vec<f32>, TranscriptionServiceError> {
        let decoder = Arc::clone(&self.decoder);
        let path = path.to_path_buf();

        let samples = tokio::task::spawn_blocking(move || decoder.decode(&path))
            .await
            .map_err(|e| TranscriptionServiceError::Worker(e.to_string()))??;

        Ok(samples)
    }
}
