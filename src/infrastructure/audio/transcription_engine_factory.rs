use std::sync::Arc;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::SpeechModelSpec;

use super::candle_whisper_engine::CandleWhisperEngine;

/// Both the configured model and the fallback model failed to load.
#[derive(Debug, thiserror::Error)]
#[error("could not load speech model: {primary}; fallback failed: {fallback}")]
pub struct ModelLoadError {
    pub primary: TranscriptionError,
    pub fallback: TranscriptionError,
}

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    /// Loads a local candle Whisper engine, falling back to
    /// [`SpeechModelSpec::fallback`] when the configured model fails.
    pub fn create(spec: &SpeechModelSpec) -> Result<Arc<dyn TranscriptionEngine>, ModelLoadError> {
        Self::load_with_fallback(spec, |s| {
            let engine = CandleWhisperEngine::load(s)?;
            Ok(Arc::new(engine) as Arc<dyn TranscriptionEngine>)
        })
    }

    /// One attempt with `spec`, then exactly one with the fallback spec.
    pub fn load_with_fallback<F>(
        spec: &SpeechModelSpec,
        loader: F,
    ) -> Result<Arc<dyn TranscriptionEngine>, ModelLoadError>
    where
        F: Fn(&SpeechModelSpec) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError>,
    {
        tracing::info!(model = %spec, "Loading speech model");

        let primary = match loader(spec) {
            Ok(engine) => {
                tracing::info!(model = %spec, "Speech model loaded successfully");
                return Ok(engine);
            }
            Err(e) => e,
        };

        let fallback_spec = SpeechModelSpec::fallback();
        tracing::warn!(
            error = %primary,
            fallback = %fallback_spec,
            "Error loading speech model, trying fallback settings"
        );

        match loader(&fallback_spec) {
            Ok(engine) => {
                tracing::info!(model = %fallback_spec, "Speech model loaded with fallback settings");
                Ok(engine)
            }
            Err(fallback) => {
                tracing::error!(error = %fallback, "Could not load speech model with fallback settings");
                Err(ModelLoadError { primary, fallback })
            }
        }
    }
}
