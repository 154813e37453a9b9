//! Tag block scanner for free-text model replies.
//!
//! Model replies mix prose with tagged blocks (`<edits>…</edits>`,
//! `<changes>…</changes>`). [`scan_blocks`] finds the blocks with the
//! requested names and hands back their attributes and raw bodies; the
//! grammar-specific parsers build typed values from those.

use super::node::Attributes;
use super::parser::{lex_end_tag, lex_start_tag};

/// A tagged block found in free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagBlock {
    /// Lower-cased tag name
    pub name: String,
    pub attrs: Attributes,
    /// Raw text between the start and end tags
    pub body: String,
    pub self_closing: bool,
}

/// Find every top-level block whose tag name is one of `names`.
///
/// Nested blocks of the same name are part of the outer block's body.
/// A block whose end tag is missing extends to the end of the text.
pub fn scan_blocks(text: &str, names: &[&str]) -> Vec<TagBlock> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('<') {
        let start = pos + offset;
        let Some(tag) = lex_start_tag(text, start) else {
            pos = start + 1;
            continue;
        };
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&tag.name)) {
            pos = start + 1;
            continue;
        }

        if tag.self_closing {
            pos = tag.end;
            blocks.push(TagBlock {
                name: tag.name,
                attrs: tag.attrs,
                body: String::new(),
                self_closing: true,
            });
            continue;
        }

        let (body_end, resume) = find_matching_end(text, tag.end, &tag.name);
        blocks.push(TagBlock {
            body: text[tag.end..body_end].to_string(),
            name: tag.name,
            attrs: tag.attrs,
            self_closing: false,
        });
        pos = resume;
    }

    blocks
}

/// Returns `(body_end, resume_offset)` for a block opened just before `from`.
fn find_matching_end(text: &str, from: usize, name: &str) -> (usize, usize) {
    let mut depth = 1usize;
    let mut cursor = from;

    while let Some(offset) = text[cursor..].find('<') {
        let at = cursor + offset;
        if let Some((end_name, end)) = lex_end_tag(text, at) {
            if end_name == name {
                depth -= 1;
                if depth == 0 {
                    return (at, end);
                }
            }
            cursor = end;
            continue;
        }
        if let Some(start) = lex_start_tag(text, at)
            && start.name == name
            && !start.self_closing
        {
            depth += 1;
            cursor = start.end;
            continue;
        }
        cursor = at + 1;
    }

    (text.len(), text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_finds_blocks_in_prose() {
        let reply = r#"I tightened the intro.
<edits>
  <edit action="delete" target="el-2"></edit>
</edits>
Let me know what you think."#;
        let blocks = scan_blocks(reply, &["edits"]);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].body.contains(r#"action="delete""#));
    }

    #[test]
    fn test_scan_respects_same_name_nesting() {
        let text = "<item>outer <item>inner</item> rest</item><item>second</item>";
        let blocks = scan_blocks(text, &["item"]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].body, "outer <item>inner</item> rest");
        assert_eq!(blocks[1].body, "second");
    }

    #[test]
    fn test_scan_self_closing_and_unterminated() {
        let text = r#"<delete-pattern pattern="empty-paragraphs"/><add insertAfter-id="el-1">tail"#;
        let blocks = scan_blocks(text, &["delete-pattern", "add"]);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].self_closing);
        assert_eq!(blocks[0].attrs.get("pattern"), Some("empty-paragraphs"));
        assert_eq!(blocks[1].body, "tail");
    }

    #[test]
    fn test_scan_distinguishes_similar_names() {
        let text = "<add-sequence insertAfter-id=\"el-1\"><item>a</item></add-sequence>";
        assert!(scan_blocks(text, &["add"]).is_empty());
        assert_eq!(scan_blocks(text, &["add-sequence"]).len(), 1);
    }
}
