mod chat;
mod error;
mod health;
mod index;
mod transcribe;

pub use chat::{ChatRequest, ChatResponse, chat_handler};
pub use error::{ApiError, NO_SPEECH_MESSAGE};
pub use health::health_handler;
pub use index::{index_handler, script_handler};
pub use transcribe::{TranscribeResponse, transcribe_handler};
