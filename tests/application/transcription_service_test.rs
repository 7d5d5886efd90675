use std::sync::Arc;

use bytes::Bytes;

use voxrelay::application::services::{
    TranscriptionOutcome, TranscriptionService, TranscriptionServiceError,
};
use voxrelay::domain::{AudioUpload, TranscriptSegment, Transcription};

use crate::helpers::{EchoEngine, RecordingDecoder, ScriptedEngine, TEST_BATCH_SIZE, dir_is_empty};

fn upload(filename: &str, data: &'static [u8]) -> AudioUpload {
    AudioUpload::new(filename, Bytes::from_static(data))
}

#[tokio::test]
async fn given_upload_when_transcribing_then_decoder_sees_staged_copy_with_suffix() {
    let staging = tempfile::tempdir().unwrap();
    let decoder = Arc::new(RecordingDecoder::default());
    let service = TranscriptionService::new(decoder.clone(), Arc::new(EchoEngine), TEST_BATCH_SIZE)
        .with_staging_dir(staging.path());

    let outcome = service
        .transcribe(&upload("interview.mp3", b"spoken words"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TranscriptionOutcome::Transcribed {
            transcript: "spoken words".to_string(),
            segments: Vec::new(),
        }
    );
    let staged = decoder.staged();
    assert_eq!(staged.len(), 1);
    assert!(staged[0].existed);
    assert_eq!(staged[0].contents, b"spoken words");
    assert_eq!(staged[0].path.parent(), Some(staging.path()));
    assert_eq!(staged[0].path.extension().unwrap(), "mp3");
    assert!(dir_is_empty(staging.path()));
}

#[tokio::test]
async fn given_configured_batch_size_when_transcribing_then_passes_it_to_engine() {
    let engine = Arc::new(ScriptedEngine::returning(Transcription::new("hi", Vec::new())));
    let service = TranscriptionService::new(
        Arc::new(RecordingDecoder::default()),
        engine.clone(),
        TEST_BATCH_SIZE,
    );

    service.transcribe(&upload("a.wav", b"x")).await.unwrap();

    assert_eq!(*engine.batch_sizes.lock().unwrap(), vec![TEST_BATCH_SIZE]);
}

#[tokio::test]
async fn given_blank_text_and_blank_segments_when_transcribing_then_reports_no_speech() {
    let segments = vec![
        TranscriptSegment::new("", Some(0.0), Some(30.0)),
        TranscriptSegment::new("   ", Some(30.0), Some(41.5)),
    ];
    let engine = Arc::new(ScriptedEngine::returning(Transcription::new(
        "\n",
        segments.clone(),
    )));
    let service =
        TranscriptionService::new(Arc::new(RecordingDecoder::default()), engine, TEST_BATCH_SIZE);

    let outcome = service.transcribe(&upload("a.wav", b"x")).await.unwrap();

    assert_eq!(outcome, TranscriptionOutcome::NoSpeech { segments });
}

#[tokio::test]
async fn given_decoder_error_when_transcribing_then_skips_engine_and_cleans_up() {
    let staging = tempfile::tempdir().unwrap();
    let engine = Arc::new(ScriptedEngine::returning(Transcription::new("hi", Vec::new())));
    let service = TranscriptionService::new(
        Arc::new(RecordingDecoder::failing("unsupported codec")),
        engine.clone(),
        TEST_BATCH_SIZE,
    )
    .with_staging_dir(staging.path());

    let result = service.transcribe(&upload("a.webm", b"x")).await;

    assert!(matches!(result, Err(TranscriptionServiceError::Decoding(_))));
    assert!(engine.batch_sizes.lock().unwrap().is_empty());
    assert!(dir_is_empty(staging.path()));
}

#[tokio::test]
async fn given_engine_error_when_transcribing_then_returns_transcription_error() {
    let staging = tempfile::tempdir().unwrap();
    let service = TranscriptionService::new(
        Arc::new(RecordingDecoder::default()),
        Arc::new(ScriptedEngine::failing("model crashed")),
        TEST_BATCH_SIZE,
    )
    .with_staging_dir(staging.path());

    let result = service.transcribe(&upload("a.wav", b"x")).await;

    match result {
        Err(TranscriptionServiceError::Transcription(e)) => {
            assert!(e.to_string().contains("model crashed"));
        }
        other => panic!("expected Transcription error, got {:?}", other),
    }
    assert!(dir_is_empty(staging.path()));
}

#[tokio::test]
async fn given_missing_staging_dir_when_transcribing_then_returns_staging_error() {
    let staging = tempfile::tempdir().unwrap();
    let missing = staging.path().join("does-not-exist");
    let decoder = Arc::new(RecordingDecoder::default());
    let service = TranscriptionService::new(decoder.clone(), Arc::new(EchoEngine), TEST_BATCH_SIZE)
        .with_staging_dir(missing);

    let result = service.transcribe(&upload("a.wav", b"x")).await;

    assert!(matches!(result, Err(TranscriptionServiceError::Staging(_))));
    assert!(decoder.staged().is_empty());
}
