use std::sync::{Arc, Mutex};

use voxrelay::application::ports::{TranscriptionEngine, TranscriptionError};
use voxrelay::domain::SpeechModelSpec;
use voxrelay::infrastructure::audio::TranscriptionEngineFactory;

use crate::helpers::EchoEngine;

fn large_gpu_spec() -> SpeechModelSpec {
    SpeechModelSpec::new("large-v3", "cuda", "float16")
}

type LoadResult = Result<Arc<dyn TranscriptionEngine>, TranscriptionError>;

fn load_ok() -> LoadResult {
    Ok(Arc::new(EchoEngine))
}

fn load_err(reason: &str) -> LoadResult {
    Err(TranscriptionError::ModelLoadFailed(reason.to_string()))
}

#[test]
fn given_loadable_model_when_creating_then_uses_configured_spec_only() {
    let attempts = Mutex::new(Vec::new());

    let result = TranscriptionEngineFactory::load_with_fallback(&large_gpu_spec(), |spec| {
        attempts.lock().unwrap().push(spec.clone());
        load_ok()
    });

    assert!(result.is_ok());
    assert_eq!(*attempts.lock().unwrap(), vec![large_gpu_spec()]);
}

#[test]
fn given_primary_failure_when_creating_then_retries_once_with_tiny_cpu_float32() {
    let attempts = Mutex::new(Vec::new());

    let result = TranscriptionEngineFactory::load_with_fallback(&large_gpu_spec(), |spec| {
        attempts.lock().unwrap().push(spec.clone());
        if spec.device == "cuda" {
            load_err("no CUDA device")
        } else {
            load_ok()
        }
    });

    assert!(result.is_ok());
    let attempts = attempts.lock().unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[1], SpeechModelSpec::fallback());
    assert_eq!(attempts[1].model_size, "tiny");
    assert_eq!(attempts[1].device, "cpu");
    assert_eq!(attempts[1].compute_type, "float32");
}

#[test]
fn given_both_loads_failing_when_creating_then_reports_both_errors() {
    let attempts = Mutex::new(0usize);

    let result = TranscriptionEngineFactory::load_with_fallback(&large_gpu_spec(), |spec| {
        *attempts.lock().unwrap() += 1;
        load_err(&format!("cannot load {}", spec.model_size))
    });

    let error = match result {
        Err(e) => e,
        Ok(_) => panic!("expected both loads to fail"),
    };
    assert_eq!(*attempts.lock().unwrap(), 2);
    let message = error.to_string();
    assert!(message.contains("cannot load large-v3"));
    assert!(message.contains("cannot load tiny"));
}

#[tokio::test]
async fn given_fallback_engine_when_loaded_then_it_serves_transcriptions() {
    let engine = TranscriptionEngineFactory::load_with_fallback(&large_gpu_spec(), |spec| {
        if spec == &SpeechModelSpec::fallback() {
            load_ok()
        } else {
            load_err("out of memory")
        }
    })
    .unwrap();

    let samples: Vec<f32> = b"ok".iter().map(|b| f32::from(*b)).collect();
    let transcription = engine.transcribe(&samples, 1).await.unwrap();

    assert_eq!(transcription.text, "ok");
}
