/// Options for [`init_tracing`](super::init_tracing), resolved from settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Deployment label attached to the startup log line.
    pub environment: String,
    /// Emit JSON lines instead of human-readable output.
    pub json_format: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: String::from("development"),
            json_format: false,
        }
    }
}
