use std::sync::Arc;

use crate::application::services::{ChatService, TranscriptionService};

/// Shared per-process handles. Built once at startup, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub transcription_service: Arc<TranscriptionService>,
    pub chat_service: Arc<ChatService>,
}
