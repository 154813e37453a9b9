//! Recursive-descent parser and renderer for HTML-like fragments.
//!
//! The parser is tolerant in the way an editor surface has to be: stray
//! closing tags are dropped, unclosed elements are closed by their parent's
//! end tag, and anything that does not lex as a tag is kept as text.
//! Text is stored verbatim (entities untouched) so that rendering a parsed
//! fragment reproduces it.

use super::node::{Attributes, Element, Node, is_void_tag};

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Parse a fragment into a list of root nodes.
pub fn parse_fragment(input: &str) -> Vec<Node> {
    let mut parser = Parser {
        src: input,
        pos: 0,
        open: Vec::new(),
    };
    let mut nodes = Vec::new();
    parser.parse_nodes(&mut nodes);
    nodes
}

/// Render nodes back to markup.
pub fn render(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, &mut out);
    }
    out
}

/// Render a single element (including its own tags).
pub fn render_element(element: &Element) -> String {
    let mut out = String::new();
    render_element_into(element, &mut out);
    out
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Element(el) => render_element_into(el, out),
    }
}

fn render_element_into(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in el.attrs.iter() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');
    if el.is_void() {
        return;
    }
    for child in &el.children {
        render_node(child, out);
    }
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse of [`escape_attr`], also accepting the single-quote forms.
pub fn unescape_attr(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

// ==================== Lexing ====================

/// A lexed start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StartTag {
    /// Lower-cased tag name
    pub name: String,
    pub attrs: Attributes,
    pub self_closing: bool,
    /// Byte offset just past the closing `>`
    pub end: usize,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

/// Lex a start tag at `pos`, which must point at `<`.
///
/// Returns `None` if the text there is not a well-formed start tag.
pub(crate) fn lex_start_tag(src: &str, pos: usize) -> Option<StartTag> {
    let bytes = src.as_bytes();
    if bytes.get(pos) != Some(&b'<') || !bytes.get(pos + 1)?.is_ascii_alphabetic() {
        return None;
    }

    let mut i = pos + 1;
    let name_start = i;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    let name = src[name_start..i].to_ascii_lowercase();
    let mut attrs = Attributes::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                    end: i + 1,
                });
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: true,
                    end: i + 2,
                });
            }
            b'/' | b'=' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let attr_name = src[attr_start..i].to_string();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            attrs.set(attr_name, "");
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = match bytes.get(i)? {
            quote @ (b'"' | b'\'') => {
                let close = src[i + 1..].find(*quote as char)? + i + 1;
                let raw = &src[i + 1..close];
                i = close + 1;
                raw
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                &src[value_start..i]
            }
        };
        attrs.set(attr_name, unescape_attr(value));
    }
}

/// Lex an end tag at `pos`, which must point at `</`.
///
/// Returns the lower-cased name and the offset past `>`.
pub(crate) fn lex_end_tag(src: &str, pos: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    if !src[pos..].starts_with("</") || !bytes.get(pos + 2)?.is_ascii_alphabetic() {
        return None;
    }
    let mut i = pos + 2;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    let name = src[pos + 2..i].to_ascii_lowercase();
    let close = src[i..].find('>')? + i;
    Some((name, close + 1))
}

// ==================== Parsing ====================

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// Names of the elements currently being parsed, outermost first
    open: Vec<String>,
}

impl Parser<'_> {
    fn parse_nodes(&mut self, out: &mut Vec<Node>) {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];

            if rest.starts_with("<!--") {
                self.pos = rest
                    .find("-->")
                    .map(|i| self.pos + i + 3)
                    .unwrap_or(self.src.len());
                continue;
            }

            if rest.starts_with("</") {
                if let Some((name, end)) = lex_end_tag(self.src, self.pos) {
                    if self.open.iter().any(|open| *open == name) {
                        // Belongs to us or an ancestor; let the owner consume it
                        return;
                    }
                    self.pos = end;
                    continue;
                }
                push_text(out, "<");
                self.pos += 1;
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.pos = rest
                    .find('>')
                    .map(|i| self.pos + i + 1)
                    .unwrap_or(self.src.len());
                continue;
            }

            if rest.starts_with('<') {
                match lex_start_tag(self.src, self.pos) {
                    Some(tag) => {
                        self.pos = tag.end;
                        let element = self.parse_element(tag);
                        out.push(Node::Element(element));
                    }
                    None => {
                        push_text(out, "<");
                        self.pos += 1;
                    }
                }
                continue;
            }

            let next = rest.find('<').map(|i| self.pos + i).unwrap_or(self.src.len());
            push_text(out, &self.src[self.pos..next]);
            self.pos = next;
        }
    }

    fn parse_element(&mut self, tag: StartTag) -> Element {
        let mut element = Element {
            tag: tag.name,
            attrs: tag.attrs,
            children: Vec::new(),
        };

        if tag.self_closing || is_void_tag(&element.tag) {
            return element;
        }

        if RAW_TEXT_TAGS.contains(&element.tag.as_str()) {
            let closing = format!("</{}", element.tag);
            let rest = &self.src[self.pos..];
            let body_end = find_ignore_case(rest, &closing)
                .map(|i| self.pos + i)
                .unwrap_or(self.src.len());
            if body_end > self.pos {
                element
                    .children
                    .push(Node::Text(self.src[self.pos..body_end].to_string()));
            }
            self.pos = lex_end_tag(self.src, body_end)
                .map(|(_, end)| end)
                .unwrap_or(self.src.len());
            return element;
        }

        self.open.push(element.tag.clone());
        self.parse_nodes(&mut element.children);
        self.open.pop();

        if self.pos < self.src.len()
            && let Some((name, end)) = lex_end_tag(self.src, self.pos)
            && name == element.tag
        {
            self.pos = end;
        }
        element
    }
}

fn push_text(out: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Node::Text(text.to_string()));
    }
}

/// ASCII case-insensitive substring search.
pub(crate) fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || pat.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - pat.len()).find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}
