//! Generative service configuration from TOML (`[service]` section)

use cowrite_application::config::{DEFAULT_HISTORY_WINDOW, DEFAULT_TIMEOUT_SECONDS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Raw service configuration from TOML
///
/// # Example
///
/// ```toml
/// [service]
/// endpoint = "http://127.0.0.1:5000/chat"
/// model = "claude-sonnet-4-20250514"
/// max_tokens = 1000
/// timeout_seconds = 120
/// history_window = 20
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServiceConfig {
    /// Streaming chat endpoint
    pub endpoint: String,
    /// Model hint forwarded with every request
    pub model: String,
    pub max_tokens: u32,
    /// Upper bound for one full reply
    pub timeout_seconds: u64,
    /// Chat messages sent with each request
    pub history_window: usize,
}

impl Default for FileServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}
