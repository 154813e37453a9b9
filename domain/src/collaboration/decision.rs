//! Classification of a user request as direct or delegated.

use super::roster::{TurnSetting, clamp_turns};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// One reply, applied as a change script
    Direct,
    /// Run the roster through the turn loop
    Delegate,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Direct => "direct",
            Action::Delegate => "delegate",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of classifying one user request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    /// Suggested turn count, already clamped
    pub turns: Option<u8>,
    /// Task handed to the agents
    pub task: String,
}

impl Decision {
    /// Delegate the original message as-is.
    pub fn fallback(user_message: &str) -> Self {
        Self {
            action: Action::Delegate,
            turns: None,
            task: user_message.to_string(),
        }
    }

    pub fn is_delegate(&self) -> bool {
        self.action == Action::Delegate
    }
}

/// Parse the classifier's JSON reply.
///
/// Scans the reply for the first JSON object carrying a `direct` or
/// `delegate` action; prose and unrelated braces around it are ignored.
/// Returns `None` when no such object exists.
pub fn parse_decision(reply: &str, user_message: &str) -> Option<Decision> {
    let (action, value) = reply
        .match_indices('{')
        .find_map(|(start, _)| decision_object(&reply[start..]))?;

    let turns = match value.get("turns") {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .map(clamp_turns);

    let task = value
        .get("task")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(user_message)
        .to_string();

    Some(Decision {
        action,
        turns,
        task,
    })
}

fn decision_object(text: &str) -> Option<(Action, Value)> {
    let value = serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()?
        .ok()?;
    let action = match value.get("action")?.as_str()?.trim().to_ascii_lowercase().as_str() {
        "direct" => Action::Direct,
        "delegate" => Action::Delegate,
        _ => return None,
    };
    Some((action, value))
}

/// Number of turns to run for a delegated request.
///
/// A fixed configuration wins; `auto` takes the classifier's suggestion,
/// then `auto_turns`. Always within the supported range.
pub fn resolve_turns(configured: TurnSetting, decision: &Decision, auto_turns: u8) -> u8 {
    let n = match configured {
        TurnSetting::Fixed(n) => n,
        TurnSetting::Auto => decision.turns.unwrap_or(auto_turns),
    };
    clamp_turns(i64::from(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delegate_with_prose() {
        let reply = r#"Sure. {"action": "delegate", "turns": 3, "task": "Outline the launch plan"} Done."#;
        let decision = parse_decision(reply, "plan the launch").unwrap();
        assert_eq!(decision.action, Action::Delegate);
        assert_eq!(decision.turns, Some(3));
        assert_eq!(decision.task, "Outline the launch plan");
    }

    #[test]
    fn test_parse_direct_defaults_task() {
        let decision = parse_decision(r#"{"action":"DIRECT"}"#, "make it a table").unwrap();
        assert_eq!(decision.action, Action::Direct);
        assert_eq!(decision.turns, None);
        assert_eq!(decision.task, "make it a table");
    }

    #[test]
    fn test_parse_clamps_turns() {
        let decision = parse_decision(r#"{"action":"delegate","turns":"50"}"#, "x").unwrap();
        assert_eq!(decision.turns, Some(10));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_decision("no json here", "x"), None);
        assert_eq!(parse_decision(r#"{"action": "maybe"}"#, "x"), None);
        assert_eq!(parse_decision(r#"{"action": "direct""#, "x"), None);
    }

    #[test]
    fn test_parse_skips_braces_before_object() {
        let decision = parse_decision(r#"{note} {"action":"direct"}"#, "x").unwrap();
        assert_eq!(decision.action, Action::Direct);

        let reply = r#"Options: {"action": "maybe"} then {"action": "delegate", "turns": 2}"#;
        let decision = parse_decision(reply, "x").unwrap();
        assert_eq!(decision.action, Action::Delegate);
        assert_eq!(decision.turns, Some(2));
    }

    #[test]
    fn test_fallback_is_delegate_with_message() {
        let decision = Decision::fallback("write an intro");
        assert!(decision.is_delegate());
        assert_eq!(decision.task, "write an intro");
        assert_eq!(decision.turns, None);
    }

    #[test]
    fn test_resolve_turns() {
        let suggested = Decision {
            action: Action::Delegate,
            turns: Some(4),
            task: String::new(),
        };
        let none = Decision::fallback("x");
        assert_eq!(resolve_turns(TurnSetting::Fixed(2), &suggested, 1), 2);
        assert_eq!(resolve_turns(TurnSetting::Auto, &suggested, 1), 4);
        assert_eq!(resolve_turns(TurnSetting::Auto, &none, 1), 1);
        assert_eq!(resolve_turns(TurnSetting::Auto, &none, 0), 1);
        assert_eq!(resolve_turns(TurnSetting::Auto, &none, 30), 10);
    }
}
