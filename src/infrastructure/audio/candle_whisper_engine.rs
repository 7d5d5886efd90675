use std::path::PathBuf;

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;
use tokio::sync::Mutex;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::{
    ComputeDevice, ComputePrecision, SpeechModelSpec, TranscriptSegment, Transcription,
};

const MEL_FILTERS_REPO: &str = "FL33TW00D-HF/whisper-base";
const MAX_DECODE_TOKENS: usize = 224;
const WINDOW_SECS: f64 = m::CHUNK_LENGTH as f64;

/// Whisper running in-process on candle. The model holds decoder caches, so
/// inference is serialized behind a mutex.
pub struct CandleWhisperEngine {
    model: Mutex<m::model::Whisper>,
    tokenizer: Tokenizer,
    tokens: PromptTokens,
    config: Config,
    device: Device,
    dtype: DType,
    mel_filters: Vec<f32>,
}

/// Special token ids used to prompt plain transcription without timestamps.
#[derive(Debug, Clone, Copy)]
struct PromptTokens {
    start_of_transcript: u32,
    transcribe: u32,
    no_timestamps: u32,
    end_of_text: u32,
}

impl PromptTokens {
    fn resolve(tokenizer: &Tokenizer) -> Result<Self, TranscriptionError> {
        let lookup = |token: &str| {
            tokenizer.token_to_id(token).ok_or_else(|| {
                TranscriptionError::ModelLoadFailed(format!("token not found: {}", token))
            })
        };

        Ok(Self {
            start_of_transcript: lookup(m::SOT_TOKEN)?,
            transcribe: lookup(m::TRANSCRIBE_TOKEN)?,
            no_timestamps: lookup(m::NO_TIMESTAMPS_TOKEN)?,
            end_of_text: lookup(m::EOT_TOKEN)?,
        })
    }

    fn prompt(&self) -> [u32; 3] {
        [self.start_of_transcript, self.transcribe, self.no_timestamps]
    }
}

impl CandleWhisperEngine {
    pub fn load(spec: &SpeechModelSpec) -> Result<Self, TranscriptionError> {
        let device = to_device(
            spec.parsed_device()
                .map_err(TranscriptionError::ModelLoadFailed)?,
        )?;
        let dtype = to_dtype(
            spec.parsed_precision()
                .map_err(TranscriptionError::ModelLoadFailed)?,
        );
        let repo_id = spec.repo_id();

        tracing::info!(
            device = ?device,
            dtype = ?dtype,
            model = %repo_id,
            "Loading Whisper model"
        );

        let api = Api::new().map_err(|e| TranscriptionError::ModelLoadFailed(e.to_string()))?;
        let model_repo = api.repo(Repo::new(repo_id.clone(), RepoType::Model));
        let mel_repo = api.repo(Repo::new(MEL_FILTERS_REPO.to_string(), RepoType::Model));

        let config: Config = serde_json::from_str(&read_hub_text(&model_repo, "config.json")?)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("config.json: {}", e)))?;

        let tokenizer = Tokenizer::from_file(fetch(&model_repo, "tokenizer.json")?)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("tokenizer.json: {}", e)))?;
        let tokens = PromptTokens::resolve(&tokenizer)?;

        let mel_bytes = std::fs::read(fetch(&mel_repo, "melfilters.bytes")?)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("melfilters.bytes: {}", e)))?;
        let mel_filters = parse_mel_filters(&mel_bytes, config.num_mel_bins)?;

        let weights = fetch(&model_repo, "model.safetensors")?;
        // SAFETY: the weights file is mapped read-only and not modified while loaded
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], dtype, &device) }
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("weights: {}", e)))?;

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("model: {}", e)))?;

        tracing::info!(model = %repo_id, "Whisper model ready");

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            tokens,
            config,
            device,
            dtype,
            mel_filters,
        })
    }

    /// Log-mel features of one window, zero-padded to 30 s. Shape `(1, n_mel, frames)`.
    fn mel_window(&self, window: &[f32]) -> Result<Tensor, TranscriptionError> {
        let mut padded = window.to_vec();
        padded.resize(m::N_SAMPLES.max(window.len()), 0.0);

        let mel = m::audio::pcm_to_mel(&self.config, &padded, &self.mel_filters);
        let n_mel = self.config.num_mel_bins;
        let frames = mel.len() / n_mel;

        Tensor::from_vec(mel, (1, n_mel, frames), &self.device)
            .and_then(|t| t.to_dtype(self.dtype))
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("mel tensor: {}", e)))
    }

    fn greedy_decode(
        &self,
        model: &mut m::model::Whisper,
        audio_features: &Tensor,
    ) -> Result<String, TranscriptionError> {
        let prompt = self.tokens.prompt();
        let mut tokens = prompt.to_vec();

        while tokens.len() - prompt.len() < MAX_DECODE_TOKENS {
            let first_step = tokens.len() == prompt.len();
            let next = next_token(model, &self.device, &tokens, audio_features, first_step)?;
            if next == self.tokens.end_of_text {
                break;
            }
            tokens.push(next);
        }

        model.reset_kv_cache();

        self.tokenizer
            .decode(&tokens[prompt.len()..], true)
            .map(|text| text.trim().to_string())
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("detokenize: {}", e)))
    }
}

#[async_trait]
impl TranscriptionEngine for CandleWhisperEngine {
    async fn transcribe(
        &self,
        samples: &[f32],
        batch_size: usize,
    ) -> Result<Transcription, TranscriptionError> {
        let duration_secs = samples.len() as f64 / m::SAMPLE_RATE as f64;
        let windows: Vec<&[f32]> = samples.chunks(m::N_SAMPLES).collect();
        let batch_size = batch_size.max(1);

        let mut model = self.model.lock().await;
        let mut segments = Vec::new();

        for (batch_idx, batch) in windows.chunks(batch_size).enumerate() {
            let mels = batch
                .iter()
                .map(|w| self.mel_window(w))
                .collect::<Result<Vec<_>, _>>()?;

            let features = Tensor::cat(&mels, 0)
                .and_then(|mel_batch| model.encoder.forward(&mel_batch, true))
                .map_err(|e| TranscriptionError::TranscriptionFailed(format!("encoder: {}", e)))?;

            for offset in 0..batch.len() {
                let window_idx = batch_idx * batch_size + offset;
                let window_features = features
                    .narrow(0, offset, 1)
                    .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?;

                let text = self.greedy_decode(&mut model, &window_features)?;
                tracing::debug!(window = window_idx, chars = text.len(), "Window decoded");

                if text.is_empty() {
                    continue;
                }
                let start = window_idx as f64 * WINDOW_SECS;
                let end = (start + WINDOW_SECS).min(duration_secs);
                segments.push(TranscriptSegment::new(text, Some(start), Some(end)));
            }
        }

        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        tracing::info!(
            windows = windows.len(),
            segments = segments.len(),
            chars = text.len(),
            "Whisper inference completed"
        );

        Ok(Transcription::new(text, segments))
    }
}

/// Runs the decoder over `tokens` and returns the argmax of the last position.
fn next_token(
    model: &mut m::model::Whisper,
    device: &Device,
    tokens: &[u32],
    audio_features: &Tensor,
    flush_cache: bool,
) -> Result<u32, TranscriptionError> {
    let failed = |stage: &str, e: candle_core::Error| {
        TranscriptionError::TranscriptionFailed(format!("{}: {}", stage, e))
    };

    let input = Tensor::new(tokens, device)
        .and_then(|t| t.unsqueeze(0))
        .map_err(|e| failed("tokens", e))?;

    let hidden = model
        .decoder
        .forward(&input, audio_features, flush_cache)
        .map_err(|e| failed("decoder", e))?;

    let logits = hidden
        .squeeze(0)
        .and_then(|h| model.decoder.final_linear(&h))
        .map_err(|e| failed("logits", e))?;

    logits
        .get(tokens.len() - 1)
        .and_then(|last| last.argmax(0))
        .and_then(|id| id.to_scalar::<u32>())
        .map_err(|e| failed("argmax", e))
}

fn fetch(repo: &ApiRepo, file: &str) -> Result<PathBuf, TranscriptionError> {
    repo.get(file)
        .map_err(|e| TranscriptionError::ModelLoadFailed(format!("{}: {}", file, e)))
}

fn read_hub_text(repo: &ApiRepo, file: &str) -> Result<String, TranscriptionError> {
    std::fs::read_to_string(fetch(repo, file)?)
        .map_err(|e| TranscriptionError::ModelLoadFailed(format!("{}: {}", file, e)))
}

fn to_device(device: ComputeDevice) -> Result<Device, TranscriptionError> {
    match device {
        ComputeDevice::Cpu => Ok(Device::Cpu),
        ComputeDevice::Cuda(ordinal) => Device::new_cuda(ordinal)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("cuda: {}", e))),
        ComputeDevice::Metal(ordinal) => Device::new_metal(ordinal)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("metal: {}", e))),
    }
}

fn to_dtype(precision: ComputePrecision) -> DType {
    match precision {
        ComputePrecision::Float32 => DType::F32,
        ComputePrecision::Float16 => DType::F16,
        ComputePrecision::BFloat16 => DType::BF16,
    }
}

/// Little-endian f32 filter bank, `n_mel * (N_FFT / 2 + 1)` values. The
/// published file holds 80 bins; models with more bins fail to load here.
fn parse_mel_filters(bytes: &[u8], n_mel: usize) -> Result<Vec<f32>, TranscriptionError> {
    let needed = n_mel * (m::N_FFT / 2 + 1);
    if bytes.len() < needed * 4 {
        return Err(TranscriptionError::ModelLoadFailed(format!(
            "mel filter bank has {} bytes, {} mel bins need {}",
            bytes.len(),
            n_mel,
            needed * 4
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .take(needed)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
