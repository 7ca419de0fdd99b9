//! Element type - named model nodes with attributes and children
//!
//! The core building block of the document tree. Offsets inside an element
//! count one unit per character of text and one unit per child element.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::attr::{Attrs, AttrsExt};

use super::{Children, Node, Text, CONTAINER_BLOCK, CONTAINER_CLASS_ATTR, PARAGRAPH, ROOT, SOFT_BREAK};

// =============================================================================
// Element
// =============================================================================

/// Model element with attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Element name (`paragraph`, `containerBlock`, `softBreak`, ...)
    pub name: CompactString,
    /// Element attributes
    pub attrs: Attrs,
    /// Child nodes
    pub children: Children,
}

/// Result of looking up the child that covers an offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSlot {
    /// Index of the child covering the offset (`children.len()` at the end)
    pub index: usize,
    /// Offset at which that child starts
    pub start: usize,
}

impl Element {
    /// Create an empty element
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: SmallVec::new(),
        }
    }

    /// Create a line-break marker
    pub fn soft_break() -> Self {
        Self::new(SOFT_BREAK)
    }

    /// Create a paragraph containing a single text run
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(PARAGRAPH).text(text)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder API
    // ─────────────────────────────────────────────────────────────────────────

    /// Builder: set an attribute
    pub fn attr(mut self, name: impl Into<CompactString>, value: impl Into<CompactString>) -> Self {
        self.attrs.set_attr(name, value);
        self
    }

    /// Builder: append a child element
    pub fn child(mut self, elem: Element) -> Self {
        self.children.push(Node::Element(Box::new(elem)));
        self
    }

    /// Builder: append a text run (merged with a preceding plain run)
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(Text::new(text)));
        self.normalize();
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Name predicates
    // ─────────────────────────────────────────────────────────────────────────

    impl_name_predicates!(
        root => ROOT,
        paragraph => PARAGRAPH,
        soft_break => SOFT_BREAK,
        container_block => CONTAINER_BLOCK,
    );

    // ─────────────────────────────────────────────────────────────────────────
    // Attribute access
    // ─────────────────────────────────────────────────────────────────────────

    /// Get attribute value by name
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_attr(name)
    }

    /// Set attribute value (update if exists, add if not)
    pub fn set_attr(&mut self, name: impl Into<CompactString>, value: impl Into<CompactString>) {
        self.attrs.set_attr(name, value);
    }

    /// Remove attribute by name, returning the old value if it existed
    pub fn remove_attr(&mut self, name: &str) -> Option<CompactString> {
        self.attrs.remove_attr(name)
    }

    /// Check if attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.has_attr(name)
    }

    /// The `containerClass` attribute of a container block
    pub fn container_class(&self) -> Option<&str> {
        self.get_attr(CONTAINER_CLASS_ATTR)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Offsets
    // ─────────────────────────────────────────────────────────────────────────

    /// Check if element has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Total offset size of the children
    pub fn max_offset(&self) -> usize {
        self.children.iter().map(Node::offset_size).sum()
    }

    /// Offset at which the child with `index` starts
    pub fn offset_of(&self, index: usize) -> usize {
        self.children[..index.min(self.children.len())]
            .iter()
            .map(Node::offset_size)
            .sum()
    }

    /// Find the child covering `offset`
    ///
    /// Returns `None` when the offset is past the end.
    pub fn slot_at(&self, offset: usize) -> Option<ChildSlot> {
        let mut start = 0;
        for (index, child) in self.children.iter().enumerate() {
            let end = start + child.offset_size();
            if offset < end {
                return Some(ChildSlot { index, start });
            }
            start = end;
        }
        (offset == start).then_some(ChildSlot {
            index: self.children.len(),
            start,
        })
    }

    /// Node starting exactly at `offset`; `None` inside a text run
    pub fn node_after(&self, offset: usize) -> Option<&Node> {
        let slot = self.slot_at(offset)?;
        (slot.start == offset).then(|| self.children.get(slot.index)).flatten()
    }

    /// Node ending exactly at `offset`; `None` inside a text run
    pub fn node_before(&self, offset: usize) -> Option<&Node> {
        let slot = self.slot_at(offset)?;
        if slot.start != offset || slot.index == 0 {
            return None;
        }
        self.children.get(slot.index - 1)
    }

    /// Text run strictly containing `offset` (not touching its edges)
    pub fn text_containing(&self, offset: usize) -> Option<&Text> {
        let slot = self.slot_at(offset)?;
        if slot.start == offset {
            return None;
        }
        self.children.get(slot.index).and_then(Node::as_text)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structural edits (offset based)
    // ─────────────────────────────────────────────────────────────────────────

    /// Make sure a child boundary exists at `offset`, splitting a text run if needed
    ///
    /// Returns the index of the first child at or after the offset, or `None`
    /// when the offset is past the end.
    pub fn split_at(&mut self, offset: usize) -> Option<usize> {
        let slot = self.slot_at(offset)?;
        if slot.start == offset {
            return Some(slot.index);
        }
        let Some(Node::Text(text)) = self.children.get_mut(slot.index) else {
            return Some(slot.index);
        };
        let tail = text.split_off(offset - slot.start);
        self.children.insert(slot.index + 1, Node::Text(tail));
        Some(slot.index + 1)
    }

    /// Insert nodes at `offset`; returns `false` when the offset is past the end
    pub fn insert_at(&mut self, offset: usize, nodes: impl IntoIterator<Item = Node>) -> bool {
        let Some(index) = self.split_at(offset) else {
            return false;
        };
        self.children.insert_many(index, nodes);
        self.normalize();
        true
    }

    /// Remove and return the nodes between two offsets
    pub fn remove_between(&mut self, start: usize, end: usize) -> Option<Vec<Node>> {
        if start > end || end > self.max_offset() {
            return None;
        }
        let start_index = self.split_at(start)?;
        let end_index = self.split_at(end)?;
        let removed: Vec<Node> = self.children.drain(start_index..end_index).collect();
        self.normalize();
        Some(removed)
    }

    /// Split children at `offset`, returning everything after it
    pub fn split_off(&mut self, offset: usize) -> Option<Children> {
        let index = self.split_at(offset)?;
        let tail: Children = self.children.drain(index..).collect();
        self.normalize();
        Some(tail)
    }

    /// Merge adjacent text runs with equal attributes and drop empty runs
    pub fn normalize(&mut self) {
        let mut merged: Children = SmallVec::with_capacity(self.children.len());
        for child in self.children.drain(..) {
            match child {
                Node::Text(text) if text.is_empty() => {}
                Node::Text(text) => match merged.last_mut() {
                    Some(Node::Text(prev)) if prev.attrs == text.attrs => prev.data.push_str(&text.data),
                    _ => merged.push(Node::Text(text)),
                },
                other => merged.push(other),
            }
        }
        self.children = merged;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Other helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Get text content of this element (concatenated from all text nodes)
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, buf: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => buf.push_str(&t.data),
                Node::Element(e) => e.collect_text(buf),
            }
        }
    }
}
