use std::sync::Arc;

use tokio::net::TcpListener;

use voxrelay::application::ports::AudioDecoder;
use voxrelay::application::services::{ChatService, TranscriptionService};
use voxrelay::infrastructure::audio::{
    FfmpegAudioDecoder, SymphoniaAudioDecoder, TranscriptionEngineFactory, check_ffmpeg_binary,
};
use voxrelay::infrastructure::llm::OpenRouterClient;
use voxrelay::infrastructure::observability::init_tracing;
use voxrelay::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    init_tracing(&settings.logging.tracing_config());

    let model_spec = settings.speech.model_spec();
    let engine =
        tokio::task::spawn_blocking(move || TranscriptionEngineFactory::create(&model_spec))
            .await??;

    let transcription_service = Arc::new(TranscriptionService::new(
        select_audio_decoder(),
        engine,
        settings.speech.batch_size,
    ));

    if settings.chat.api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set, /chat will return errors");
    }

    let llm_client = Arc::new(OpenRouterClient::new(
        settings.chat.api_key.clone(),
        Some(settings.chat.api_url.clone()),
        settings.chat.model.clone(),
        settings.chat.temperature,
        settings.chat.max_tokens,
    ));
    let chat_service = Arc::new(ChatService::new(
        llm_client,
        settings.chat.system_prompt.clone(),
    ));

    let state = AppState {
        transcription_service,
        chat_service,
    };

    let router = create_router(state);

    let addr = settings.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn select_audio_decoder() -> Arc<dyn AudioDecoder> {
    match check_ffmpeg_binary() {
        Ok(()) => {
            tracing::info!("Decoding uploads with ffmpeg");
            Arc::new(FfmpegAudioDecoder)
        }
        Err(e) => {
            tracing::warn!(error = %e, "ffmpeg not available, falling back to symphonia decoder");
            Arc::new(SymphoniaAudioDecoder)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
