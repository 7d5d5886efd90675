use serde::{Deserialize, Serialize};

/// Author of a chat-completion message, serialized the way OpenAI-compatible
/// APIs expect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}
