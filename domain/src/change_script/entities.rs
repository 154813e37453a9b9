//! Change script entries handed to the review collaborator.

use crate::document::{Document, ElementId};
use crate::markup::parser::escape_attr;
use serde::{Deserialize, Serialize};

/// What an insertion is positioned against: an element id or literal content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorRef {
    Id(ElementId),
    Content(String),
}

/// Insertion point of an `add` or `add-sequence` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeAnchor {
    Before(AnchorRef),
    After(AnchorRef),
}

impl ChangeAnchor {
    /// Attribute names accepted for anchors, in lookup order.
    pub const ATTRIBUTES: [&'static str; 4] = [
        "insertAfter-id",
        "insertBefore-id",
        "insertAfter",
        "insertBefore",
    ];

    /// Build an anchor from one of [`Self::ATTRIBUTES`].
    pub fn from_attribute(name: &str, value: &str) -> Option<Self> {
        let value = value.trim();
        let anchor = match name.to_ascii_lowercase().as_str() {
            "insertafter-id" => Self::After(AnchorRef::Id(ElementId::new(value))),
            "insertbefore-id" => Self::Before(AnchorRef::Id(ElementId::new(value))),
            "insertafter" => Self::After(AnchorRef::Content(value.to_string())),
            "insertbefore" => Self::Before(AnchorRef::Content(value.to_string())),
            _ => return None,
        };
        Some(anchor)
    }

    pub fn attribute_name(&self) -> &'static str {
        match self {
            Self::After(AnchorRef::Id(_)) => "insertAfter-id",
            Self::Before(AnchorRef::Id(_)) => "insertBefore-id",
            Self::After(AnchorRef::Content(_)) => "insertAfter",
            Self::Before(AnchorRef::Content(_)) => "insertBefore",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Before(r) | Self::After(r) => match r {
                AnchorRef::Id(id) => id.as_str(),
                AnchorRef::Content(text) => text,
            },
        }
    }

    pub fn id(&self) -> Option<&ElementId> {
        match self {
            Self::Before(AnchorRef::Id(id)) | Self::After(AnchorRef::Id(id)) => Some(id),
            _ => None,
        }
    }

    fn render_attr(&self) -> String {
        format!("{}=\"{}\"", self.attribute_name(), escape_attr(self.value()))
    }
}

/// Inline or block style named inside a `format` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleName {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Heading1,
    Heading2,
    Heading3,
    Paragraph,
    Quote,
    BulletList,
    NumberedList,
    /// Passed through verbatim for the reviewer to interpret
    Other(String),
}

impl StyleName {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "underline" => Self::Underline,
            "strikethrough" => Self::Strikethrough,
            "code" => Self::Code,
            "heading1" => Self::Heading1,
            "heading2" => Self::Heading2,
            "heading3" => Self::Heading3,
            "paragraph" => Self::Paragraph,
            "quote" => Self::Quote,
            "bullet-list" => Self::BulletList,
            "numbered-list" => Self::NumberedList,
            _ => Self::Other(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Strikethrough => "strikethrough",
            Self::Code => "code",
            Self::Heading1 => "heading1",
            Self::Heading2 => "heading2",
            Self::Heading3 => "heading3",
            Self::Paragraph => "paragraph",
            Self::Quote => "quote",
            Self::BulletList => "bullet-list",
            Self::NumberedList => "numbered-list",
            Self::Other(name) => name,
        }
    }

    /// Block styles change the element kind rather than a text run.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Heading1
                | Self::Heading2
                | Self::Heading3
                | Self::Paragraph
                | Self::Quote
                | Self::BulletList
                | Self::NumberedList
        )
    }
}

/// One `<style>` or `<remove>` line of a `format` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleOp {
    Apply(StyleName),
    Remove(StyleName),
}

impl StyleOp {
    fn render(&self) -> String {
        match self {
            Self::Apply(s) => format!("<style>{}</style>", s.as_str()),
            Self::Remove(s) => format!("<remove>{}</remove>", s.as_str()),
        }
    }
}

/// Named structural clean-up; matches are found by the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructuralPattern {
    EmptyParagraphs,
    DuplicateBreaks,
    TrailingBreaks,
}

impl StructuralPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyParagraphs => "empty-paragraphs",
            Self::DuplicateBreaks => "duplicate-breaks",
            Self::TrailingBreaks => "trailing-breaks",
        }
    }
}

impl std::str::FromStr for StructuralPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(' ', "-").as_str() {
            "empty-paragraphs" => Ok(Self::EmptyParagraphs),
            "duplicate-breaks" => Ok(Self::DuplicateBreaks),
            "trailing-breaks" => Ok(Self::TrailingBreaks),
            _ => Err(s.trim().to_string()),
        }
    }
}

/// One entry of a change script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChangeEntry {
    Add {
        anchor: ChangeAnchor,
        content: String,
    },
    Delete {
        target: Option<ElementId>,
        content: String,
    },
    Modify {
        target: Option<ElementId>,
        original: String,
        new: String,
    },
    Format {
        target: ElementId,
        text: Option<String>,
        ops: Vec<StyleOp>,
    },
    AddSequence {
        anchor: ChangeAnchor,
        items: Vec<String>,
    },
    DeletePattern {
        pattern: StructuralPattern,
    },
}

impl ChangeEntry {
    /// Tag name of this entry in the script.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Delete { .. } => "delete",
            Self::Modify { .. } => "modify",
            Self::Format { .. } => "format",
            Self::AddSequence { .. } => "add-sequence",
            Self::DeletePattern { .. } => "delete-pattern",
        }
    }

    /// Element id this entry is addressed by, if any.
    pub fn anchor_id(&self) -> Option<&ElementId> {
        match self {
            Self::Add { anchor, .. } | Self::AddSequence { anchor, .. } => anchor.id(),
            Self::Delete { target, .. } | Self::Modify { target, .. } => target.as_ref(),
            Self::Format { target, .. } => Some(target),
            Self::DeletePattern { .. } => None,
        }
    }

    pub fn render(&self) -> String {
        let target_attr = |target: &Option<ElementId>| match target {
            Some(id) => format!(" targetId=\"{}\"", escape_attr(id.as_str())),
            None => String::new(),
        };
        match self {
            Self::Add { anchor, content } => {
                format!("<add {}>{}</add>", anchor.render_attr(), content)
            }
            Self::Delete { target, content } => {
                format!("<delete{}>{}</delete>", target_attr(target), content)
            }
            Self::Modify {
                target,
                original,
                new,
            } => format!(
                "<modify{}><original>{}</original><new>{}</new></modify>",
                target_attr(target),
                original,
                new
            ),
            Self::Format { target, text, ops } => {
                let text_attr = text
                    .as_ref()
                    .map(|t| format!(" text=\"{}\"", escape_attr(t)))
                    .unwrap_or_default();
                let body: String = ops.iter().map(StyleOp::render).collect();
                format!(
                    "<format targetId=\"{}\"{}>{}</format>",
                    escape_attr(target.as_str()),
                    text_attr,
                    body
                )
            }
            Self::AddSequence { anchor, items } => {
                let body: String = items.iter().map(|i| format!("<item>{i}</item>")).collect();
                format!("<add-sequence {}>{}</add-sequence>", anchor.render_attr(), body)
            }
            Self::DeletePattern { pattern } => {
                format!("<delete-pattern pattern=\"{}\"/>", pattern.as_str())
            }
        }
    }
}

/// A complete change script plus who produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeScript {
    pub entries: Vec<ChangeEntry>,
    /// Contributor labels joined with `" & "`; not part of the rendered script
    pub attribution: Option<String>,
}

impl ChangeScript {
    pub fn new(entries: Vec<ChangeEntry>) -> Self {
        Self {
            entries,
            attribution: None,
        }
    }

    /// Attribute the script to the distinct labels, in the given order.
    pub fn with_attribution<S: AsRef<str>>(mut self, labels: &[S]) -> Self {
        let mut distinct: Vec<&str> = Vec::new();
        for label in labels.iter().map(AsRef::as_ref) {
            if !label.is_empty() && !distinct.contains(&label) {
                distinct.push(label);
            }
        }
        self.attribution = (!distinct.is_empty()).then(|| distinct.join(" & "));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Every element id the entries are addressed by.
    pub fn anchor_ids(&self) -> Vec<&ElementId> {
        self.entries.iter().filter_map(ChangeEntry::anchor_id).collect()
    }

    /// Drop entries addressed by ids that `doc` does not contain.
    ///
    /// Returns the dropped entries.
    pub fn retain_anchored_in(&mut self, doc: &Document) -> Vec<ChangeEntry> {
        let (kept, dropped) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.anchor_id().is_none_or(|id| doc.contains(id)));
        self.entries = kept;
        dropped
    }

    /// The script text exactly as the reviewer expects it.
    pub fn render(&self) -> String {
        let mut out = String::from("<changes>\n");
        for entry in &self.entries {
            out.push_str(&entry.render());
            out.push('\n');
        }
        out.push_str("</changes>");
        out
    }
}

impl std::fmt::Display for ChangeScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChangeScript {
        ChangeScript::new(vec![
            ChangeEntry::Add {
                anchor: ChangeAnchor::After(AnchorRef::Id("el-3".into())),
                content: "<p>New</p>".into(),
            },
            ChangeEntry::Modify {
                target: Some("el-5".into()),
                original: "Old".into(),
                new: "Better".into(),
            },
            ChangeEntry::Format {
                target: "el-6".into(),
                text: Some("key \"term\"".into()),
                ops: vec![
                    StyleOp::Apply(StyleName::Bold),
                    StyleOp::Remove(StyleName::Italic),
                ],
            },
            ChangeEntry::DeletePattern {
                pattern: StructuralPattern::EmptyParagraphs,
            },
        ])
    }

    #[test]
    fn test_render_exact() {
        let expected = "<changes>\n\
<add insertAfter-id=\"el-3\"><p>New</p></add>\n\
<modify targetId=\"el-5\"><original>Old</original><new>Better</new></modify>\n\
<format targetId=\"el-6\" text=\"key &quot;term&quot;\"><style>bold</style><remove>italic</remove></format>\n\
<delete-pattern pattern=\"empty-paragraphs\"/>\n\
</changes>";
        assert_eq!(sample().render(), expected);
    }

    #[test]
    fn test_render_sequence_and_untargeted_delete() {
        let script = ChangeScript::new(vec![
            ChangeEntry::AddSequence {
                anchor: ChangeAnchor::Before(AnchorRef::Content("Summary".into())),
                items: vec!["<li>A</li>".into(), "<li>B</li>".into()],
            },
            ChangeEntry::Delete {
                target: None,
                content: "stale line".into(),
            },
        ]);
        assert_eq!(
            script.render(),
            "<changes>\n<add-sequence insertBefore=\"Summary\"><item><li>A</li></item><item><li>B</li></item></add-sequence>\n<delete>stale line</delete>\n</changes>"
        );
    }

    #[test]
    fn test_attribution_joins_distinct_labels() {
        let script = sample().with_attribution(&["Lead", "Critic", "Lead"]);
        assert_eq!(script.attribution.as_deref(), Some("Lead & Critic"));
        let single = sample().with_attribution(&["Lead"]);
        assert_eq!(single.attribution.as_deref(), Some("Lead"));
        let none = sample().with_attribution::<&str>(&[]);
        assert_eq!(none.attribution, None);
    }

    #[test]
    fn test_anchor_ids_and_retain() {
        let mut script = sample();
        let ids: Vec<&str> = script.anchor_ids().iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["el-3", "el-5", "el-6"]);

        let doc = Document::from_html(
            "t",
            r#"<p data-id="el-3">a</p><p data-id="el-6">b</p>"#,
        );
        let dropped = script.retain_anchored_in(&doc);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].tag(), "modify");
        assert_eq!(script.len(), 3);
    }

    #[test]
    fn test_style_name_parse() {
        assert_eq!(StyleName::parse("Bold"), StyleName::Bold);
        assert_eq!(StyleName::parse("bullet-list"), StyleName::BulletList);
        assert!(StyleName::parse("heading2").is_block());
        assert_eq!(StyleName::parse("highlight"), StyleName::Other("highlight".into()));
    }

    #[test]
    fn test_pattern_from_str() {
        assert_eq!(
            "empty paragraphs".parse::<StructuralPattern>(),
            Ok(StructuralPattern::EmptyParagraphs)
        );
        assert!("everything".parse::<StructuralPattern>().is_err());
    }
}
