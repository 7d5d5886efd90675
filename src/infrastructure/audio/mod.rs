pub mod audio_decoder;
mod candle_whisper_engine;
mod transcription_engine_factory;

pub use audio_decoder::{FfmpegAudioDecoder, SymphoniaAudioDecoder, check_ffmpeg_binary};
pub use candle_whisper_engine::CandleWhisperEngine;
pub use transcription_engine_factory::{ModelLoadError, TranscriptionEngineFactory};
