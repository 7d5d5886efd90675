use serde::Serialize;

/// A sub-span of a transcript. Times are in seconds from the start of the audio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: Option<f64>, end: Option<f64>) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Raw output of a speech model for one audio input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcription {
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcription {
    pub fn new(text: impl Into<String>, segments: Vec<TranscriptSegment>) -> Self {
        Self {
            text: text.into(),
            segments,
        }
    }

    /// Trimmed top-level text, or the space-joined segment texts when that is empty.
    /// `None` means no speech was found by either path.
    pub fn resolve_transcript(&self) -> Option<String> {
        let primary = self.text.trim();
        if !primary.is_empty() {
            return Some(primary.to_string());
        }

        let joined = self
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let fallback = joined.trim();

        if fallback.is_empty() {
            None
        } else {
            Some(fallback.to_string())
        }
    }
}
