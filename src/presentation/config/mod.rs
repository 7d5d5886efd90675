mod settings;

pub use settings::{
    ChatSettings, LoggingSettings, ServerSettings, Settings, SettingsError, SpeechSettings,
};
