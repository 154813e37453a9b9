//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
///
/// ```toml
/// [logging]
/// dir = "~/.local/state/cowrite"
/// conversation_log = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for diagnostic and conversation logs
    pub dir: Option<String>,
    /// Write a JSONL transcript of collaboration events into `dir`
    pub conversation_log: bool,
}
