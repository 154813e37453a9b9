//! Document value objects.

use serde::{Deserialize, Serialize};

/// Attribute that carries an element's stable anchor id.
pub const ID_ATTR: &str = "data-id";

/// Prefix of generated anchor ids (`el-1`, `el-2`, …).
pub const ID_PREFIX: &str = "el-";

/// Stable per-element identifier used to address document content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generated id for the given sequence number.
    pub fn generated(n: u64) -> Self {
        Self(format!("{ID_PREFIX}{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sequence number if this id has the generated `el-<n>` form.
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(ID_PREFIX)?.parse().ok()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Where new content goes relative to an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Before,
    After,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Before => "before",
            Position::After => "after",
        }
    }
}

/// Inline tags that are never addressed by id.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "cite", "code", "del", "em", "font", "i", "ins", "kbd", "mark", "q",
    "s", "small", "span", "strike", "strong", "sub", "sup", "u", "wbr",
];

/// Whether elements with this tag receive anchor ids.
pub fn is_addressable(tag: &str) -> bool {
    !INLINE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_sequence() {
        let id = ElementId::generated(7);
        assert_eq!(id.as_str(), "el-7");
        assert_eq!(id.sequence(), Some(7));
        assert_eq!(ElementId::new("intro").sequence(), None);
    }

    #[test]
    fn test_addressable_tags() {
        assert!(is_addressable("p"));
        assert!(is_addressable("li"));
        assert!(!is_addressable("strong"));
        assert!(!is_addressable("BR"));
    }
}
