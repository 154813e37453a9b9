//! The shared rich-text document.

use super::value_objects::{ElementId, ID_ATTR, Position, is_addressable};
use crate::markup::{Element, Node, parse_fragment, render, text_of};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A document: title plus content tree (Entity).
///
/// Every addressable element carries a stable anchor id in its `data-id`
/// attribute. Equality is structural, which is how drift between the
/// original snapshot and the working copy is detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    title: String,
    nodes: Vec<Node>,
}

impl Document {
    pub fn new(title: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            title: title.into(),
            nodes,
        }
    }

    /// An empty document, used when nothing is open.
    pub fn untitled() -> Self {
        Self::new("Untitled", Vec::new())
    }

    /// Parse HTML content and stamp anchor ids on elements lacking one.
    pub fn from_html(title: impl Into<String>, html: &str) -> Self {
        let mut doc = Self::new(title, parse_fragment(html));
        doc.ensure_ids();
        doc
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn to_html(&self) -> String {
        render(&self.nodes)
    }

    pub fn text_content(&self) -> String {
        text_of(&self.nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(Node::is_blank_text)
    }

    // ==================== Lookup ====================

    pub fn find(&self, id: &ElementId) -> Option<&Element> {
        let path = path_to(&self.nodes, id.as_str())?;
        let mut current = &self.nodes;
        let (last, parents) = path.split_last()?;
        for &index in parents {
            current = &current.get(index)?.as_element()?.children;
        }
        current.get(*last)?.as_element()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        path_to(&self.nodes, id.as_str()).is_some()
    }

    /// All anchor ids in document order.
    pub fn ids(&self) -> Vec<ElementId> {
        let mut ids = Vec::new();
        collect_ids(&self.nodes, &mut ids);
        ids
    }

    // ==================== Id stamping ====================

    /// Give every addressable element a unique anchor id.
    ///
    /// Elements without an id, and later duplicates of an id already seen,
    /// get fresh ids. Returns the ids that were assigned.
    pub fn ensure_ids(&mut self) -> Vec<ElementId> {
        let mut allocator = IdAllocator::from_nodes(&self.nodes);
        let mut seen = HashSet::new();
        let mut fresh = Vec::new();
        stamp(&mut self.nodes, &mut allocator, &mut seen, &mut fresh);
        fresh
    }

    /// Stamp ids on nodes about to be inserted into this document.
    ///
    /// Ids already present in the document are treated as collisions and
    /// replaced, so insertion never produces duplicate anchors.
    pub fn stamp_new_nodes(&self, nodes: &mut [Node]) -> Vec<ElementId> {
        self.stamp_against(nodes, None)
    }

    /// Stamp ids on the children of an element that will replace `target`.
    ///
    /// Ids inside the replaced subtree may be reused by the replacement;
    /// ids anywhere else in the document count as collisions.
    pub fn stamp_replacement(&self, target: &ElementId, nodes: &mut [Node]) -> Vec<ElementId> {
        self.stamp_against(nodes, Some(target))
    }

    fn stamp_against(&self, nodes: &mut [Node], replacing: Option<&ElementId>) -> Vec<ElementId> {
        let mut allocator = IdAllocator::from_nodes(&self.nodes);
        allocator.reserve_from(nodes);

        let mut released = Vec::new();
        if let Some(target) = replacing
            && let Some(old) = self.find(target)
        {
            collect_ids(&old.children, &mut released);
        }
        let mut seen: HashSet<String> = self
            .ids()
            .into_iter()
            .filter(|id| !released.contains(id))
            .map(|id| id.as_str().to_string())
            .collect();

        let mut fresh = Vec::new();
        stamp(nodes, &mut allocator, &mut seen, &mut fresh);
        fresh
    }

    // ==================== Mutation ====================

    /// Replace the element with the given id. Returns `false` if not found.
    pub fn replace_element(&mut self, id: &ElementId, replacement: Element) -> bool {
        let Some((container, index)) = self.locate_mut(id) else {
            return false;
        };
        container[index] = Node::Element(replacement);
        true
    }

    /// Remove the element with the given id, returning it.
    pub fn remove_element(&mut self, id: &ElementId) -> Option<Element> {
        let (container, index) = self.locate_mut(id)?;
        match container.remove(index) {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Insert nodes before or after the anchor element.
    pub fn insert_relative(
        &mut self,
        anchor: &ElementId,
        position: Position,
        nodes: Vec<Node>,
    ) -> bool {
        let Some((container, index)) = self.locate_mut(anchor) else {
            return false;
        };
        let at = match position {
            Position::Before => index,
            Position::After => index + 1,
        };
        container.splice(at..at, nodes);
        true
    }

    fn locate_mut(&mut self, id: &ElementId) -> Option<(&mut Vec<Node>, usize)> {
        let path = path_to(&self.nodes, id.as_str())?;
        let (last, parents) = path.split_last()?;
        let container = container_mut(&mut self.nodes, parents)?;
        Some((container, *last))
    }
}

fn element_id(el: &Element) -> Option<&str> {
    el.attrs.get(ID_ATTR).filter(|id| !id.is_empty())
}

fn path_to(nodes: &[Node], id: &str) -> Option<Vec<usize>> {
    for (index, node) in nodes.iter().enumerate() {
        let Node::Element(el) = node else { continue };
        if element_id(el) == Some(id) {
            return Some(vec![index]);
        }
        if let Some(mut rest) = path_to(&el.children, id) {
            rest.insert(0, index);
            return Some(rest);
        }
    }
    None
}

fn container_mut<'a>(nodes: &'a mut Vec<Node>, path: &[usize]) -> Option<&'a mut Vec<Node>> {
    let mut current = nodes;
    for &index in path {
        current = &mut current.get_mut(index)?.as_element_mut()?.children;
    }
    Some(current)
}

fn collect_ids(nodes: &[Node], out: &mut Vec<ElementId>) {
    for node in nodes {
        if let Node::Element(el) = node {
            if let Some(id) = element_id(el) {
                out.push(ElementId::new(id));
            }
            collect_ids(&el.children, out);
        }
    }
}

fn stamp(
    nodes: &mut [Node],
    allocator: &mut IdAllocator,
    seen: &mut HashSet<String>,
    fresh: &mut Vec<ElementId>,
) {
    for node in nodes {
        let Node::Element(el) = node else { continue };
        if is_addressable(&el.tag) {
            let existing = element_id(el).map(str::to_string);
            match existing {
                Some(id) if !seen.contains(&id) => {
                    seen.insert(id);
                }
                _ => {
                    let id = allocator.allocate();
                    el.attrs.set(ID_ATTR, id.as_str());
                    seen.insert(id.as_str().to_string());
                    fresh.push(id);
                }
            }
        }
        stamp(&mut el.children, allocator, seen, fresh);
    }
}

/// Hands out `el-<n>` ids that are not in use.
struct IdAllocator {
    next: u64,
    used: HashSet<String>,
}

impl IdAllocator {
    fn from_nodes(nodes: &[Node]) -> Self {
        let mut allocator = Self {
            next: 1,
            used: HashSet::new(),
        };
        allocator.reserve_from(nodes);
        allocator
    }

    fn reserve_from(&mut self, nodes: &[Node]) {
        let mut ids = Vec::new();
        collect_ids(nodes, &mut ids);
        for id in ids {
            if let Some(n) = id.sequence() {
                self.next = self.next.max(n.saturating_add(1));
            }
            self.used.insert(id.as_str().to_string());
        }
    }

    fn allocate(&mut self) -> ElementId {
        loop {
            let id = ElementId::generated(self.next);
            // Past u64::MAX, restart from 1 and rely on the used set
            self.next = self.next.checked_add(1).unwrap_or(1);
            if self.used.insert(id.as_str().to_string()) {
                return id;
            }
        }
    }
}
