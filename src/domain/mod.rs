mod audio_upload;
mod message;
mod message_role;
mod speech_model_spec;
mod transcription;

pub use audio_upload::AudioUpload;
pub use message::ChatMessage;
pub use message_role::MessageRole;
pub use speech_model_spec::{ComputeDevice, ComputePrecision, SpeechModelSpec};
pub use transcription::{TranscriptSegment, Transcription};
