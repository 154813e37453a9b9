//! Parsing of `<edits>` blocks from free-text agent replies.
//!
//! ```text
//! <edits>
//!   <edit action="modify" target="el-2"><p>New wording</p></edit>
//!   <edit action="delete" target="el-5"></edit>
//!   <edit action="add" after="el-3"><p>Inserted</p></edit>
//! </edits>
//! ```
//!
//! Parsing never fails. A directive missing what its action requires is
//! dropped with a warning and its siblings are still parsed.

use super::directive::{EditAction, EditDirective};
use crate::document::{ElementId, Position};
use crate::markup::{TagBlock, scan_blocks};
use thiserror::Error;
use tracing::warn;

/// Why a single `<edit>` tag was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveIssue {
    #[error("missing action attribute")]
    MissingAction,

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("{0} directive without a target")]
    MissingTarget(EditAction),

    #[error("add directive without an after/before anchor")]
    MissingAnchor,

    #[error("add directive with both after and before anchors")]
    ConflictingAnchors,
}

/// A dropped directive and its position among the `<edit>` tags seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveWarning {
    pub index: usize,
    pub issue: DirectiveIssue,
}

/// Result of parsing one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDirectives {
    pub directives: Vec<EditDirective>,
    pub warnings: Vec<DirectiveWarning>,
}

impl ParsedDirectives {
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// Parse every `<edits>` block in a reply.
///
/// Replies without a block yield no directives.
pub fn parse_directives(reply: &str) -> ParsedDirectives {
    let mut parsed = ParsedDirectives::default();
    let mut index = 0;

    for block in scan_blocks(reply, &["edits"]) {
        for tag in scan_blocks(&block.body, &["edit"]) {
            match parse_edit(&tag) {
                Ok(directive) => parsed.directives.push(directive),
                Err(issue) => {
                    warn!(index, %issue, "Dropping edit directive");
                    parsed.warnings.push(DirectiveWarning { index, issue });
                }
            }
            index += 1;
        }
    }

    parsed
}

fn non_empty_attr(tag: &TagBlock, name: &str) -> Option<ElementId> {
    tag.attrs
        .get(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ElementId::new)
}

fn parse_edit(tag: &TagBlock) -> Result<EditDirective, DirectiveIssue> {
    let action = tag
        .attrs
        .get("action")
        .filter(|a| !a.trim().is_empty())
        .ok_or(DirectiveIssue::MissingAction)?;
    let action: EditAction = action.parse().map_err(DirectiveIssue::UnknownAction)?;
    let payload = tag.body.trim().to_string();

    match action {
        EditAction::Modify => {
            let target =
                non_empty_attr(tag, "target").ok_or(DirectiveIssue::MissingTarget(action))?;
            Ok(EditDirective::Modify { target, payload })
        }
        EditAction::Delete => {
            let target =
                non_empty_attr(tag, "target").ok_or(DirectiveIssue::MissingTarget(action))?;
            Ok(EditDirective::Delete { target })
        }
        EditAction::Add => {
            let (anchor, position) =
                match (non_empty_attr(tag, "after"), non_empty_attr(tag, "before")) {
                    (Some(id), None) => (id, Position::After),
                    (None, Some(id)) => (id, Position::Before),
                    (Some(_), Some(_)) => return Err(DirectiveIssue::ConflictingAnchors),
                    (None, None) => return Err(DirectiveIssue::MissingAnchor),
                };
            Ok(EditDirective::Add {
                anchor,
                position,
                payload,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_actions() {
        let reply = r#"Here is my pass.
<edits>
  <edit action="modify" target="el-2"><p>Sharper intro</p></edit>
  <edit action="delete" target="el-5"></edit>
  <edit action="add" after="el-3"><p>New point</p></edit>
  <edit action="add" before="el-1"><h2>Heading</h2></edit>
</edits>"#;
        let parsed = parse_directives(reply);
        assert!(parsed.warnings.is_empty());
        assert_eq!(
            parsed.directives,
            vec![
                EditDirective::Modify {
                    target: "el-2".into(),
                    payload: "<p>Sharper intro</p>".into(),
                },
                EditDirective::Delete {
                    target: "el-5".into()
                },
                EditDirective::Add {
                    anchor: "el-3".into(),
                    position: Position::After,
                    payload: "<p>New point</p>".into(),
                },
                EditDirective::Add {
                    anchor: "el-1".into(),
                    position: Position::Before,
                    payload: "<h2>Heading</h2>".into(),
                },
            ]
        );
    }

    #[test]
    fn test_reply_without_block_yields_nothing() {
        let parsed = parse_directives(
            r#"I'd suggest <edit action="delete" target="el-1"></edit> outside a block."#,
        );
        assert!(parsed.is_empty());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_invalid_directives_dropped_siblings_kept() {
        let reply = r#"<edits>
  <edit target="el-1"><p>no action</p></edit>
  <edit action="modify"><p>no target</p></edit>
  <edit action="add"><p>no anchor</p></edit>
  <edit action="add" after="el-1" before="el-2"><p>both</p></edit>
  <edit action="rewrite" target="el-1"></edit>
  <edit action="delete" target="el-9"/>
</edits>"#;
        let parsed = parse_directives(reply);
        assert_eq!(
            parsed.directives,
            vec![EditDirective::Delete {
                target: "el-9".into()
            }]
        );
        let issues: Vec<DirectiveIssue> = parsed.warnings.into_iter().map(|w| w.issue).collect();
        assert_eq!(
            issues,
            vec![
                DirectiveIssue::MissingAction,
                DirectiveIssue::MissingTarget(EditAction::Modify),
                DirectiveIssue::MissingAnchor,
                DirectiveIssue::ConflictingAnchors,
                DirectiveIssue::UnknownAction("rewrite".into()),
            ]
        );
    }

    #[test]
    fn test_multiple_blocks_are_concatenated() {
        let reply = r#"<edits><edit action="delete" target="el-1"></edit></edits>
and later
<edits><edit action="delete" target="el-2"></edit></edits>"#;
        assert_eq!(parse_directives(reply).directives.len(), 2);
    }
}
