//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave,
//! such as request timeouts and what happens when a collaboration is cancelled.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;
pub const DEFAULT_HISTORY_WINDOW: usize = 20;
pub const DEFAULT_AUTO_TURNS: u8 = 1;

/// What to do with applied waypoints when a collaboration is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// Discard the working copy
    #[default]
    Rollback,
    /// Reconcile whatever was applied before the cancel
    KeepPartial,
}

impl std::str::FromStr for CancelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rollback" => Ok(Self::Rollback),
            "keep_partial" => Ok(Self::KeepPartial),
            other => Err(format!("unknown cancel policy '{other}'")),
        }
    }
}

/// Application behavior configuration.
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    /// Maximum time to wait for one full reply before timing out.
    pub timeout: Option<Duration>,
    /// Number of chat messages sent with each request.
    pub history_window: usize,
    /// Turns to run when turns are `auto` and the classifier suggests none.
    pub auto_turns: u8,
    pub cancel_policy: CancelPolicy,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
            history_window: DEFAULT_HISTORY_WINDOW,
            auto_turns: DEFAULT_AUTO_TURNS,
            cancel_policy: CancelPolicy::default(),
        }
    }
}

impl BehaviorConfig {
    /// Creates a BehaviorConfig from an optional timeout in seconds.
    ///
    /// If `seconds` is `None`, no timeout is applied.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            timeout: seconds.map(Duration::from_secs),
            ..Self::default()
        }
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_auto_turns(mut self, turns: u8) -> Self {
        self.auto_turns = turns;
        self
    }

    pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BehaviorConfig::default();
        assert_eq!(config.timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.history_window, 20);
        assert_eq!(config.cancel_policy, CancelPolicy::Rollback);
    }

    #[test]
    fn test_cancel_policy_from_str() {
        assert_eq!("keep-partial".parse::<CancelPolicy>(), Ok(CancelPolicy::KeepPartial));
        assert_eq!("Rollback".parse::<CancelPolicy>(), Ok(CancelPolicy::Rollback));
        assert!("undo".parse::<CancelPolicy>().is_err());
    }
}
