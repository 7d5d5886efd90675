mod chat_service;
mod transcription_service;

pub use chat_service::ChatService;
pub use transcription_service::{
    TranscriptionOutcome, TranscriptionService, TranscriptionServiceError,
};
