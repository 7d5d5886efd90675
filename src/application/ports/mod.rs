mod audio_decoder;
mod llm_client;
mod transcription_engine;

pub use audio_decoder::{AudioDecoder, AudioDecoderError};
pub use llm_client::{LlmClient, LlmClientError};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
