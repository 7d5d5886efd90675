use std::path::Path;

/// Turns an audio file on disk into 16 kHz mono PCM samples.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<Vec<f32>, AudioDecoderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioDecoderError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
