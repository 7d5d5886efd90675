use std::fmt;
use std::str::FromStr;

const FALLBACK_MODEL_SIZE: &str = "tiny";

/// Where inference runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeDevice {
    Cpu,
    Cuda(usize),
    Metal(usize),
}

impl FromStr for ComputeDevice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (kind, ordinal) = match lower.split_once(':') {
            Some((kind, idx)) => {
                let idx = idx
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid device ordinal in '{}'", s))?;
                (kind.to_string(), idx)
            }
            None => (lower, 0),
        };

        match kind.as_str() {
            "cpu" => Ok(ComputeDevice::Cpu),
            "cuda" | "gpu" => Ok(ComputeDevice::Cuda(ordinal)),
            "metal" | "mps" => Ok(ComputeDevice::Metal(ordinal)),
            other => Err(format!(
                "Invalid device: {}. Expected: cpu, cuda[:n], or metal[:n]",
                other
            )),
        }
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeDevice::Cpu => write!(f, "cpu"),
            ComputeDevice::Cuda(i) => write!(f, "cuda:{}", i),
            ComputeDevice::Metal(i) => write!(f, "metal:{}", i),
        }
    }
}

/// Numeric precision used for model weights and activations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputePrecision {
    Float32,
    Float16,
    BFloat16,
}

impl ComputePrecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputePrecision::Float32 => "float32",
            ComputePrecision::Float16 => "float16",
            ComputePrecision::BFloat16 => "bfloat16",
        }
    }
}

impl FromStr for ComputePrecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "float32" | "f32" => Ok(ComputePrecision::Float32),
            "float16" | "f16" => Ok(ComputePrecision::Float16),
            "bfloat16" | "bf16" => Ok(ComputePrecision::BFloat16),
            other => Err(format!(
                "Unsupported compute type: {}. Expected: float32, float16, or bfloat16",
                other
            )),
        }
    }
}

impl fmt::Display for ComputePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to load: a Whisper checkpoint size plus the raw device and precision
/// names from configuration. The names are parsed at load time so that a bad
/// value fails the load (and triggers the fallback) instead of startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechModelSpec {
    pub model_size: String,
    pub device: String,
    pub compute_type: String,
}

impl SpeechModelSpec {
    pub fn new(
        model_size: impl Into<String>,
        device: impl Into<String>,
        compute_type: impl Into<String>,
    ) -> Self {
        Self {
            model_size: model_size.into(),
            device: device.into(),
            compute_type: compute_type.into(),
        }
    }

    /// Smallest checkpoint on CPU at full precision.
    pub fn fallback() -> Self {
        Self::new(
            FALLBACK_MODEL_SIZE,
            ComputeDevice::Cpu.to_string(),
            ComputePrecision::Float32.as_str(),
        )
    }

    /// Hugging Face repository holding the checkpoint, e.g. `openai/whisper-base`.
    /// A size that already names a repository is used as is.
    pub fn repo_id(&self) -> String {
        if self.model_size.contains('/') {
            self.model_size.clone()
        } else {
            format!("openai/whisper-{}", self.model_size.trim())
        }
    }

    pub fn parsed_device(&self) -> Result<ComputeDevice, String> {
        self.device.parse()
    }

    pub fn parsed_precision(&self) -> Result<ComputePrecision, String> {
        self.compute_type.parse()
    }
}

impl fmt::Display for SpeechModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} ({})",
            self.model_size, self.device, self.compute_type
        )
    }
}
