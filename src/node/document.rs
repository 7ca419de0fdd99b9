//! Document type and related utilities
//!
//! The root container for model trees, with path addressing and ancestor
//! queries. A path is a sequence of offsets: each entry is the offset
//! of the next element inside its parent.

use super::{Element, Node, ROOT};

// =============================================================================
// Document
// =============================================================================

/// Root document container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Root element (always named `$root`)
    pub root: Element,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Element::new(ROOT))
    }
}

impl Document {
    /// Create a new document with a root element
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Create a document whose root holds the given blocks
    pub fn with_blocks(blocks: impl IntoIterator<Item = Element>) -> Self {
        let mut root = Element::new(ROOT);
        root.children.extend(blocks.into_iter().map(Node::from));
        Self::new(root)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Path addressing
    // ─────────────────────────────────────────────────────────────────────────

    /// Element addressed by an offset path (empty path is the root)
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let mut current = &self.root;
        for &offset in path {
            current = current.node_after(offset)?.as_element()?;
        }
        Some(current)
    }

    /// Element addressed by an offset path (mutable)
    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = &mut self.root;
        for &offset in path {
            let slot = current.slot_at(offset)?;
            if slot.start != offset {
                return None;
            }
            current = current.children.get_mut(slot.index)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Check whether the path names an element whose ancestors (or itself) satisfy `predicate`
    pub fn has_ancestor<F>(&self, path: &[usize], predicate: F) -> bool
    where
        F: Fn(&Element) -> bool,
    {
        (0..=path.len()).rev().any(|len| self.element_at(&path[..len]).is_some_and(&predicate))
    }
}
