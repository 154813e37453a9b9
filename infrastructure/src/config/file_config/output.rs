//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Also write each change script under review to this file
    pub review_file: Option<String>,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            review_file: None,
        }
    }
}
