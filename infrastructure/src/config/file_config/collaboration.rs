//! Collaboration configuration from TOML (`[collaboration]` section)

use super::ConfigValidationError;
use cowrite_application::CancelPolicy;
use cowrite_application::config::DEFAULT_AUTO_TURNS;
use cowrite_domain::TurnSetting;
use serde::{Deserialize, Serialize};

/// `turns` accepts either `"auto"` or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileTurns {
    Count(i64),
    Named(String),
}

impl Default for FileTurns {
    fn default() -> Self {
        Self::Named("auto".to_string())
    }
}

/// Raw collaboration configuration from TOML
///
/// # Example
///
/// ```toml
/// [collaboration]
/// turns = "auto"                 # or 1-10
/// auto_turns = 1
/// on_cancel = "rollback"         # "rollback" or "keep_partial"
/// lead_instruction = "default"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCollaborationConfig {
    pub turns: FileTurns,
    /// Turns used when `turns = "auto"` and the classifier suggests none
    pub auto_turns: u8,
    pub on_cancel: String,
    /// Instruction backing the lead agent
    pub lead_instruction: Option<String>,
}

impl Default for FileCollaborationConfig {
    fn default() -> Self {
        Self {
            turns: FileTurns::default(),
            auto_turns: DEFAULT_AUTO_TURNS,
            on_cancel: "rollback".to_string(),
            lead_instruction: None,
        }
    }
}

impl FileCollaborationConfig {
    /// Out-of-range counts are clamped, not rejected.
    pub fn parse_turns(&self) -> Result<TurnSetting, ConfigValidationError> {
        match &self.turns {
            FileTurns::Count(n) => Ok(TurnSetting::fixed(*n)),
            FileTurns::Named(s) => s
                .parse()
                .map_err(|_| ConfigValidationError::InvalidTurns(s.clone())),
        }
    }

    pub fn parse_cancel_policy(&self) -> Result<CancelPolicy, ConfigValidationError> {
        self.on_cancel
            .parse()
            .map_err(|_| ConfigValidationError::InvalidCancelPolicy(self.on_cancel.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;

    #[test]
    fn test_turns_accepts_number_or_auto() {
        let config: FileConfig = toml::from_str("[collaboration]\nturns = 3\n").unwrap();
        assert_eq!(config.collaboration.parse_turns().unwrap(), TurnSetting::Fixed(3));

        let config: FileConfig = toml::from_str("[collaboration]\nturns = \"auto\"\n").unwrap();
        assert_eq!(config.collaboration.parse_turns().unwrap(), TurnSetting::Auto);

        let config: FileConfig = toml::from_str("[collaboration]\nturns = 40\n").unwrap();
        assert_eq!(config.collaboration.parse_turns().unwrap(), TurnSetting::Fixed(10));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let config: FileConfig =
            toml::from_str("[collaboration]\nturns = \"lots\"\non_cancel = \"shrug\"\n").unwrap();
        assert!(matches!(
            config.collaboration.parse_turns(),
            Err(ConfigValidationError::InvalidTurns(_))
        ));
        assert!(matches!(
            config.collaboration.parse_cancel_policy(),
            Err(ConfigValidationError::InvalidCancelPolicy(_))
        ));
    }

    #[test]
    fn test_keep_partial() {
        let config: FileConfig =
            toml::from_str("[collaboration]\non_cancel = \"keep_partial\"\n").unwrap();
        assert_eq!(
            config.collaboration.parse_cancel_policy().unwrap(),
            CancelPolicy::KeepPartial
        );
    }
}
