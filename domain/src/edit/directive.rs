//! Per-turn edit directives.

use crate::document::{ElementId, Position};
use serde::{Deserialize, Serialize};

/// Action named by an `<edit action="…">` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    Modify,
    Delete,
    Add,
}

impl EditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditAction::Modify => "modify",
            EditAction::Delete => "delete",
            EditAction::Add => "add",
        }
    }
}

impl std::fmt::Display for EditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "modify" => Ok(EditAction::Modify),
            "delete" => Ok(EditAction::Delete),
            "add" => Ok(EditAction::Add),
            other => Err(other.to_string()),
        }
    }
}

/// One edit proposed by an agent against the working document.
///
/// Payloads are kept as raw markup and parsed when applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum EditDirective {
    /// Replace the target element, keeping its id
    Modify { target: ElementId, payload: String },
    /// Remove the target element
    Delete { target: ElementId },
    /// Insert the payload next to the anchor element
    Add {
        anchor: ElementId,
        position: Position,
        payload: String,
    },
}

impl EditDirective {
    pub fn action(&self) -> EditAction {
        match self {
            EditDirective::Modify { .. } => EditAction::Modify,
            EditDirective::Delete { .. } => EditAction::Delete,
            EditDirective::Add { .. } => EditAction::Add,
        }
    }

    /// The id this directive addresses (target or anchor).
    pub fn anchor_id(&self) -> &ElementId {
        match self {
            EditDirective::Modify { target, .. } | EditDirective::Delete { target } => target,
            EditDirective::Add { anchor, .. } => anchor,
        }
    }
}

/// Short human-readable description of a batch, e.g. `"2 modified, 1 added"`.
pub fn summarize(directives: &[EditDirective]) -> String {
    let count = |action: EditAction| directives.iter().filter(|d| d.action() == action).count();
    let parts: Vec<String> = [
        (count(EditAction::Modify), "modified"),
        (count(EditAction::Add), "added"),
        (count(EditAction::Delete), "deleted"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, verb)| format!("{n} {verb}"))
    .collect();

    if parts.is_empty() {
        "no edits".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_str() {
        assert_eq!("Modify".parse::<EditAction>(), Ok(EditAction::Modify));
        assert_eq!(" add ".parse::<EditAction>(), Ok(EditAction::Add));
        assert!("rewrite".parse::<EditAction>().is_err());
    }

    #[test]
    fn test_summarize() {
        let directives = vec![
            EditDirective::Modify {
                target: "el-1".into(),
                payload: "<p>x</p>".into(),
            },
            EditDirective::Add {
                anchor: "el-1".into(),
                position: Position::After,
                payload: "<p>y</p>".into(),
            },
            EditDirective::Modify {
                target: "el-2".into(),
                payload: "<p>z</p>".into(),
            },
        ];
        assert_eq!(summarize(&directives), "2 modified, 1 added");
        assert_eq!(summarize(&[]), "no edits");
    }
}
