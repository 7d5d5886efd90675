mod openrouter_client;

pub use openrouter_client::{DEFAULT_OPENROUTER_URL, OpenRouterClient};
