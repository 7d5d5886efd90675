use config::{Config, Environment};
use serde::Deserialize;

use crate::domain::SpeechModelSpec;
use crate::infrastructure::llm::DEFAULT_OPENROUTER_URL;
use crate::infrastructure::observability::TracingConfig;

const DEFAULT_CHAT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";
const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Respond naturally and helpfully to the user's questions.";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub speech: SpeechSettings,
    pub chat: ChatSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub model_size: String,
    pub device: String,
    pub compute_type: String,
    pub batch_size: usize,
}

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub environment: String,
    pub json_format: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Flat view of the process environment; keys are the lowercased variable names.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    whisper_model_size: String,
    whisper_device: String,
    whisper_compute_type: String,
    whisper_batch_size: usize,
    openrouter_api_key: Option<String>,
    openrouter_api_url: String,
    llama_model_name: String,
    llama_temperature: f32,
    llama_max_tokens: u32,
    llama_system_message: String,
    server_host: String,
    server_port: u16,
    log_format: String,
    app_env: String,
}

impl Settings {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::from_environment(Environment::default())
    }

    pub fn from_environment(environment: Environment) -> Result<Self, SettingsError> {
        let raw: EnvSettings = Config::builder()
            .set_default("whisper_model_size", "base")?
            .set_default("whisper_device", "cpu")?
            .set_default("whisper_compute_type", "float32")?
            .set_default("whisper_batch_size", 16)?
            .set_default("openrouter_api_url", DEFAULT_OPENROUTER_URL)?
            .set_default("llama_model_name", DEFAULT_CHAT_MODEL)?
            .set_default("llama_temperature", 0.7)?
            .set_default("llama_max_tokens", 1000)?
            .set_default("llama_system_message", DEFAULT_SYSTEM_PROMPT)?
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 5000)?
            .set_default("log_format", "text")?
            .set_default("app_env", "development")?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()?;

        raw.try_into()
    }
}

impl TryFrom<EnvSettings> for Settings {
    type Error = SettingsError;

    fn try_from(raw: EnvSettings) -> Result<Self, Self::Error> {
        if raw.whisper_batch_size == 0 {
            return Err(SettingsError::Invalid {
                key: "WHISPER_BATCH_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&raw.llama_temperature) {
            return Err(SettingsError::Invalid {
                key: "LLAMA_TEMPERATURE",
                reason: format!("{} is outside 0.0..=2.0", raw.llama_temperature),
            });
        }

        Ok(Self {
            server: ServerSettings {
                host: raw.server_host,
                port: raw.server_port,
            },
            speech: SpeechSettings {
                model_size: raw.whisper_model_size,
                device: raw.whisper_device,
                compute_type: raw.whisper_compute_type,
                batch_size: raw.whisper_batch_size,
            },
            chat: ChatSettings {
                api_key: raw.openrouter_api_key.filter(|k| !k.trim().is_empty()),
                api_url: raw.openrouter_api_url,
                model: raw.llama_model_name,
                temperature: raw.llama_temperature,
                max_tokens: raw.llama_max_tokens,
                system_prompt: raw.llama_system_message,
            },
            logging: LoggingSettings {
                environment: raw.app_env,
                json_format: raw.log_format.eq_ignore_ascii_case("json"),
            },
        })
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SpeechSettings {
    pub fn model_spec(&self) -> SpeechModelSpec {
        SpeechModelSpec::new(&self.model_size, &self.device, &self.compute_type)
    }
}

impl LoggingSettings {
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            environment: self.environment.clone(),
            json_format: self.json_format,
        }
    }
}
