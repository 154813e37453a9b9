//! Parsing of `<changes>` scripts from reconciliation and direct-edit replies.

use super::entities::{ChangeAnchor, ChangeEntry, ChangeScript, StructuralPattern, StyleName, StyleOp};
use crate::document::ElementId;
use crate::markup::{TagBlock, scan_blocks};
use thiserror::Error;
use tracing::warn;

const ENTRY_TAGS: &[&str] = &[
    "add",
    "delete",
    "modify",
    "format",
    "add-sequence",
    "delete-pattern",
];

/// Why a change entry was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeIssue {
    #[error("{0} without an insertBefore/insertAfter anchor")]
    MissingAnchor(&'static str),

    #[error("{0} with more than one anchor attribute")]
    ConflictingAnchors(&'static str),

    #[error("format without a targetId")]
    MissingTarget,

    #[error("modify without <{0}>")]
    MissingPart(&'static str),

    #[error("{0} with no content")]
    EmptyEntry(&'static str),

    #[error("delete-pattern without a pattern")]
    MissingPattern,

    #[error("unknown structural pattern '{0}'")]
    UnknownPattern(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeWarning {
    pub index: usize,
    pub issue: ChangeIssue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedChangeScript {
    pub script: ChangeScript,
    pub warnings: Vec<ChangeWarning>,
}

/// Parse the first `<changes>` block of a reply.
///
/// A reply without one yields an empty script.
pub fn parse_change_script(reply: &str) -> ParsedChangeScript {
    let mut parsed = ParsedChangeScript::default();
    let Some(block) = scan_blocks(reply, &["changes"]).into_iter().next() else {
        return parsed;
    };

    for (index, tag) in scan_blocks(&block.body, ENTRY_TAGS).iter().enumerate() {
        match parse_entry(tag) {
            Ok(entry) => parsed.script.entries.push(entry),
            Err(issue) => {
                warn!(index, %issue, "Dropping change entry");
                parsed.warnings.push(ChangeWarning { index, issue });
            }
        }
    }

    parsed
}

fn parse_entry(tag: &TagBlock) -> Result<ChangeEntry, ChangeIssue> {
    let body = tag.body.trim();
    match tag.name.as_str() {
        "add" => {
            let anchor = anchor_of(tag, "add")?;
            if body.is_empty() {
                return Err(ChangeIssue::EmptyEntry("add"));
            }
            Ok(ChangeEntry::Add {
                anchor,
                content: body.to_string(),
            })
        }
        "delete" => {
            let target = target_of(tag);
            if body.is_empty() && target.is_none() {
                return Err(ChangeIssue::EmptyEntry("delete"));
            }
            Ok(ChangeEntry::Delete {
                target,
                content: body.to_string(),
            })
        }
        "modify" => {
            let original = first_body(body, "original").ok_or(ChangeIssue::MissingPart("original"))?;
            let new = first_body(body, "new").ok_or(ChangeIssue::MissingPart("new"))?;
            Ok(ChangeEntry::Modify {
                target: target_of(tag),
                original,
                new,
            })
        }
        "format" => {
            let target = target_of(tag).ok_or(ChangeIssue::MissingTarget)?;
            let text = tag
                .attrs
                .get("text")
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            let ops = scan_blocks(body, &["style", "remove"])
                .into_iter()
                .filter(|b| !b.body.trim().is_empty())
                .map(|b| {
                    let style = StyleName::parse(&b.body);
                    if b.name == "remove" {
                        StyleOp::Remove(style)
                    } else {
                        StyleOp::Apply(style)
                    }
                })
                .collect();
            Ok(ChangeEntry::Format { target, text, ops })
        }
        "add-sequence" => {
            let anchor = anchor_of(tag, "add-sequence")?;
            let items: Vec<String> = scan_blocks(body, &["item"])
                .into_iter()
                .map(|b| b.body.trim().to_string())
                .filter(|i| !i.is_empty())
                .collect();
            if items.is_empty() {
                return Err(ChangeIssue::EmptyEntry("add-sequence"));
            }
            Ok(ChangeEntry::AddSequence { anchor, items })
        }
        _ => {
            let name = tag
                .attrs
                .get("pattern")
                .filter(|p| !p.trim().is_empty())
                .ok_or(ChangeIssue::MissingPattern)?;
            let pattern: StructuralPattern = name.parse().map_err(ChangeIssue::UnknownPattern)?;
            Ok(ChangeEntry::DeletePattern { pattern })
        }
    }
}

fn target_of(tag: &TagBlock) -> Option<ElementId> {
    tag.attrs
        .get("targetId")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ElementId::new)
}

fn anchor_of(tag: &TagBlock, entry: &'static str) -> Result<ChangeAnchor, ChangeIssue> {
    let mut anchors = ChangeAnchor::ATTRIBUTES.iter().filter_map(|name| {
        let value = tag.attrs.get(name)?;
        (!value.trim().is_empty()).then(|| ChangeAnchor::from_attribute(name, value))?
    });
    let anchor = anchors.next().ok_or(ChangeIssue::MissingAnchor(entry))?;
    if anchors.next().is_some() {
        return Err(ChangeIssue::ConflictingAnchors(entry));
    }
    Ok(anchor)
}

fn first_body(text: &str, name: &str) -> Option<String> {
    scan_blocks(text, &[name])
        .into_iter()
        .next()
        .map(|b| b.body.trim().to_string())
}
