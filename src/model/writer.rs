//! Writer - the only way to mutate a model inside a change block
//!
//! Every primitive keeps the document normalized and maps the selection
//! through the edit, so positions taken from the selection stay valid for the
//! rest of the transaction.

use compact_str::CompactString;

use crate::attr::AttrsExt;
use crate::error::{ModelError, ModelResult};
use crate::node::{Document, Element, Node, SOFT_BREAK};

use super::position::{Position, Range, Selection};
use super::schema::{AttrTarget, ChildKind, Schema};

/// Mutable access to the document during one transaction
pub struct Writer<'a> {
    doc: &'a mut Document,
    selection: &'a mut Selection,
    schema: &'a Schema,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(doc: &'a mut Document, selection: &'a mut Selection, schema: &'a Schema) -> Self {
        Self { doc, selection, schema }
    }

    /// Document being edited
    pub fn document(&self) -> &Document {
        self.doc
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        self.selection
    }

    /// Schema of the model
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Run `f` as part of the enclosing transaction
    pub fn change<R, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<R, E>) -> Result<R, E> {
        f(self)
    }

    fn element_mut(&mut self, path: &[usize]) -> ModelResult<&mut Element> {
        self.doc
            .element_at_mut(path)
            .ok_or_else(|| ModelError::no_element(path))
    }

    fn parent_mut(&mut self, pos: &Position) -> ModelResult<&mut Element> {
        match self.doc.element_at_mut(pos.parent_path()) {
            Some(parent) if pos.offset() <= parent.max_offset() => Ok(parent),
            _ => Err(ModelError::InvalidPosition(pos.clone())),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Insertion
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert nodes at `pos`, returning the position after them
    pub fn insert(&mut self, pos: &Position, nodes: impl IntoIterator<Item = Node>) -> ModelResult<Position> {
        let nodes: Vec<Node> = nodes.into_iter().collect();
        let len: usize = nodes.iter().map(Node::offset_size).sum();
        self.parent_mut(pos)?.insert_at(pos.offset(), nodes);
        self.selection
            .map_positions(|p| p.transformed_by_insertion(pos.parent_path(), pos.offset(), len));
        Ok(pos.shifted(len as isize))
    }

    /// Insert a plain text run at `pos`
    pub fn insert_text(&mut self, pos: &Position, text: &str) -> ModelResult<Position> {
        if text.is_empty() {
            return Ok(pos.clone());
        }
        self.insert(pos, [Node::text(text)])
    }

    /// Insert an element at `pos`
    pub fn insert_element(&mut self, pos: &Position, elem: Element) -> ModelResult<Position> {
        self.insert(pos, [Node::from(elem)])
    }

    /// Append an element to the element at `parent`, returning the position before it
    pub fn append_element(&mut self, parent: &[usize], elem: Element) -> ModelResult<Position> {
        let offset = self.element_mut(parent)?.max_offset();
        let pos = Position::at(parent, offset);
        self.insert_element(&pos, elem)?;
        Ok(pos)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Removal
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove the content of a flat range
    pub fn remove(&mut self, range: &Range) -> ModelResult<Vec<Node>> {
        if !range.is_flat() {
            return Err(ModelError::CrossParentRange {
                start: range.start.clone(),
                end: range.end.clone(),
            });
        }
        let (start, end) = (range.start.offset(), range.end.offset());
        let removed = self
            .parent_mut(&range.end)?
            .remove_between(start, end)
            .ok_or_else(|| ModelError::InvalidPosition(range.start.clone()))?;
        let parent = range.start.parent_path();
        self.selection
            .map_positions(|p| p.transformed_by_removal(parent, start, end));
        Ok(removed)
    }

    /// Remove the element at `path`
    pub fn remove_node(&mut self, path: &[usize]) -> ModelResult<Node> {
        if path.is_empty() {
            return Err(ModelError::RootOperation);
        }
        self.remove(&Range::on(path))?
            .pop()
            .ok_or_else(|| ModelError::no_element(path))
    }

    /// Delete the selected content and collapse the selection at its start
    ///
    /// Ranges across sibling blocks remove the blocks in between and merge
    /// the two outer ones.
    pub fn delete_content(&mut self) -> ModelResult<()> {
        let range = self.selection.first_range().clone();
        if range.is_collapsed() {
            return Ok(());
        }
        if range.is_flat() {
            self.remove(&range)?;
            self.set_selection_at(range.start);
            return Ok(());
        }

        let (start, end) = (&range.start, &range.end);
        let (start_block, end_block) = (start.parent_path(), end.parent_path());
        let siblings = !start_block.is_empty()
            && start_block.len() == end_block.len()
            && start_block[..start_block.len() - 1] == end_block[..end_block.len() - 1];
        if !siblings {
            return Err(ModelError::CrossParentRange {
                start: start.clone(),
                end: end.clone(),
            });
        }

        self.remove(&Range::new(Position::at(end_block, 0), end.clone()))?;
        let start_len = self.element_mut(start_block)?.max_offset();
        self.remove(&Range::new(start.clone(), Position::at(start_block, start_len)))?;

        let between = Position::after(start_block);
        let end_index = end_block[end_block.len() - 1];
        if between.offset() < end_index {
            self.remove(&Range::new(between.clone(), between.with_offset(end_index)))?;
        }
        self.merge(&between)?;
        self.set_selection_at(start.clone());
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Element edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Change the name of the element at `path`
    pub fn rename(&mut self, path: &[usize], name: impl Into<CompactString>) -> ModelResult<()> {
        if path.is_empty() {
            return Err(ModelError::RootOperation);
        }
        self.element_mut(path)?.name = name.into();
        Ok(())
    }

    /// Set an attribute on the element at `path`
    pub fn set_attribute(
        &mut self,
        path: &[usize],
        key: impl Into<CompactString>,
        value: impl Into<CompactString>,
    ) -> ModelResult<()> {
        self.element_mut(path)?.set_attr(key, value);
        Ok(())
    }

    /// Remove an attribute from the element at `path`
    pub fn remove_attribute(&mut self, path: &[usize], key: &str) -> ModelResult<Option<CompactString>> {
        Ok(self.element_mut(path)?.remove_attr(key))
    }

    /// Set a formatting attribute on the text inside a flat range
    ///
    /// Returns `false` without changes when the schema does not allow the
    /// attribute on text in that parent.
    pub fn set_text_attribute(
        &mut self,
        range: &Range,
        key: impl Into<CompactString>,
        value: impl Into<CompactString>,
    ) -> ModelResult<bool> {
        if !range.is_flat() {
            return Err(ModelError::CrossParentRange {
                start: range.start.clone(),
                end: range.end.clone(),
            });
        }
        let (key, value) = (key.into(), value.into());
        let schema = self.schema;
        let parent = self.parent_mut(&range.end)?;
        if !schema.check_attribute(AttrTarget::Text { parent: &parent.name }, &key) {
            return Ok(false);
        }
        let invalid = || ModelError::InvalidPosition(range.start.clone());
        let first = parent.split_at(range.start.offset()).ok_or_else(invalid)?;
        let last = parent.split_at(range.end.offset()).ok_or_else(invalid)?;
        for child in &mut parent.children[first..last] {
            if let Node::Text(text) = child {
                text.attrs.set_attr(key.clone(), value.clone());
            }
        }
        parent.normalize();
        Ok(true)
    }

    /// Split the parent of `pos` in two, returning the position between the parts
    ///
    /// The second part copies the name and attributes of the first.
    pub fn split(&mut self, pos: &Position) -> ModelResult<Position> {
        let elem_path = pos.parent_path();
        if elem_path.is_empty() {
            return Err(ModelError::RootOperation);
        }
        let parent = self.parent_mut(pos)?;
        let children = parent
            .split_off(pos.offset())
            .ok_or_else(|| ModelError::InvalidPosition(pos.clone()))?;
        let second = Element {
            name: parent.name.clone(),
            attrs: parent.attrs.clone(),
            children,
        };

        let between = Position::after(elem_path);
        self.element_mut(between.parent_path())?
            .insert_at(between.offset(), [Node::from(second)]);
        self.selection
            .map_positions(|p| p.transformed_by_split(elem_path, pos.offset()));
        Ok(between)
    }

    /// Merge the elements on both sides of `pos` into the first one
    pub fn merge(&mut self, pos: &Position) -> ModelResult<()> {
        let nothing = || ModelError::NothingToMerge(pos.clone());
        let parent = self.element_mut(pos.parent_path())?;
        let slot = parent
            .slot_at(pos.offset())
            .filter(|s| s.start == pos.offset() && s.index > 0 && s.index < parent.children.len())
            .ok_or_else(nothing)?;
        if !parent.children[slot.index - 1].is_element() || !parent.children[slot.index].is_element() {
            return Err(nothing());
        }
        let Node::Element(second) = parent.children.remove(slot.index) else {
            return Err(nothing());
        };
        let first = parent.children[slot.index - 1]
            .as_element_mut()
            .ok_or_else(nothing)?;
        let first_len = first.max_offset();
        first.children.extend(second.children);
        first.normalize();

        let first_pos = pos.shifted(-1);
        self.selection
            .map_positions(|p| p.transformed_by_merge(first_pos.path(), first_len));
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Schema cleanup
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop attributes the schema does not allow on the element at `path` or its text
    pub fn remove_disallowed_attributes(&mut self, path: &[usize]) -> ModelResult<()> {
        let schema = self.schema;
        let elem = self.element_mut(path)?;
        let name = elem.name.clone();
        elem.attrs
            .retain(|(key, _)| schema.check_attribute(AttrTarget::Element(&name), key));
        for child in elem.children.iter_mut() {
            if let Node::Text(text) = child {
                text.attrs
                    .retain(|(key, _)| schema.check_attribute(AttrTarget::Text { parent: &name }, key));
            }
        }
        elem.normalize();
        Ok(())
    }

    /// Remove children the schema does not allow in the element at `path`
    pub fn remove_disallowed_children(&mut self, path: &[usize]) -> ModelResult<()> {
        let schema = self.schema;
        let elem = self.element_mut(path)?;
        let mut illegal = Vec::new();
        let mut offset = 0;
        for child in &elem.children {
            let kind = match child {
                Node::Text(_) => ChildKind::Text,
                Node::Element(e) => ChildKind::Element(&e.name),
            };
            if !schema.check_child(&elem.name, kind) {
                illegal.push((offset, offset + child.offset_size()));
            }
            offset += child.offset_size();
        }
        for (start, end) in illegal.into_iter().rev() {
            self.remove(&Range::new(Position::at(path, start), Position::at(path, end)))?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the selection
    pub fn set_selection(&mut self, selection: Selection) {
        *self.selection = selection;
    }

    /// Collapse the selection at `pos`
    pub fn set_selection_at(&mut self, pos: Position) {
        *self.selection = Selection::collapsed(pos);
    }

    /// Select the whole content of the element at `path`
    pub fn set_selection_in(&mut self, path: &[usize]) -> ModelResult<()> {
        let len = self.element_mut(path)?.max_offset();
        *self.selection = Selection::from_range(Range::new(Position::at(path, 0), Position::at(path, len)));
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Line-break primitives
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the selection with a line-break marker
    ///
    /// Returns `false` (after deleting the selected content) when the schema
    /// does not allow a marker at the cursor.
    pub fn insert_soft_break(&mut self) -> ModelResult<bool> {
        self.delete_content()?;
        let pos = self.selection.first_position().clone();
        let allowed = self
            .doc
            .element_at(pos.parent_path())
            .is_some_and(|parent| self.schema.check_child(&parent.name, ChildKind::Element(SOFT_BREAK)));
        if !allowed {
            return Ok(false);
        }
        let after = self.insert_element(&pos, Element::soft_break())?;
        self.set_selection_at(after);
        Ok(true)
    }

    /// Replace the selection with a block split and move the cursor into the second part
    ///
    /// Returns the position between the two parts.
    pub fn split_block(&mut self) -> ModelResult<Position> {
        self.delete_content()?;
        let pos = self.selection.first_position().clone();
        let between = self.split(&pos)?;
        self.set_selection_at(Position::at(between.path(), 0));
        Ok(between)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PARAGRAPH;

    fn with_writer<R>(doc: &mut Document, selection: &mut Selection, f: impl FnOnce(&mut Writer<'_>) -> R) -> R {
        let schema = Schema::default();
        let mut writer = Writer::new(doc, selection, &schema);
        f(&mut writer)
    }

    #[test]
    fn test_insert_and_remove_text() {
        let mut doc = Document::with_blocks([Element::paragraph("foo")]);
        let mut sel = Selection::collapsed(Position::at(&[0], 3));
        with_writer(&mut doc, &mut sel, |w| {
            let end = w.insert_text(&Position::at(&[0], 1), "XY").unwrap();
            assert_eq!(end, Position::at(&[0], 3));
            assert_eq!(w.selection().anchor(), &Position::at(&[0], 5));

            w.remove(&Range::new(Position::at(&[0], 0), Position::at(&[0], 2))).unwrap();
            assert_eq!(w.selection().anchor(), &Position::at(&[0], 3));
        });
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(doc.element_at(&[0]).unwrap().text_content(), "Yoo");
    }

    #[test]
    fn test_split_and_merge() {
        let mut doc = Document::with_blocks([Element::paragraph("foobar").attr("alignment", "left")]);
        let mut sel = Selection::collapsed(Position::at(&[0], 4));
        with_writer(&mut doc, &mut sel, |w| {
            let between = w.split(&Position::at(&[0], 3)).unwrap();
            assert_eq!(between, Position::new([1]));
            assert_eq!(w.selection().anchor(), &Position::at(&[1], 1));
        });
        assert_eq!(doc.root.children.len(), 2);
        assert_eq!(doc.element_at(&[1]).unwrap().get_attr("alignment"), Some("left"));
        assert_eq!(doc.element_at(&[1]).unwrap().text_content(), "bar");

        with_writer(&mut doc, &mut sel, |w| {
            w.merge(&Position::new([1])).unwrap();
            assert_eq!(w.selection().anchor(), &Position::at(&[0], 4));
        });
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(doc.element_at(&[0]).unwrap().child_count(), 1);
    }

    #[test]
    fn test_root_is_protected() {
        let mut doc = Document::with_blocks([Element::paragraph("foo")]);
        let mut sel = Selection::default();
        with_writer(&mut doc, &mut sel, |w| {
            assert!(matches!(w.rename(&[], PARAGRAPH), Err(ModelError::RootOperation)));
            assert!(matches!(w.split(&Position::new([0])), Err(ModelError::RootOperation)));
            assert!(matches!(
                w.insert_text(&Position::at(&[0], 9), "x"),
                Err(ModelError::InvalidPosition(_))
            ));
        });
    }

    #[test]
    fn test_delete_content_across_blocks() {
        let mut doc = Document::with_blocks([
            Element::paragraph("foo"),
            Element::paragraph("mid"),
            Element::paragraph("bar"),
        ]);
        let mut sel = Selection::from_range(Range::new(Position::at(&[0], 1), Position::at(&[2], 2)));
        with_writer(&mut doc, &mut sel, |w| w.delete_content().unwrap());
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(doc.element_at(&[0]).unwrap().text_content(), "fr");
        assert_eq!(sel, Selection::collapsed(Position::at(&[0], 1)));
    }

    #[test]
    fn test_soft_break_and_split_block() {
        let mut doc = Document::with_blocks([Element::paragraph("foobar")]);
        let mut sel = Selection::collapsed(Position::at(&[0], 3));
        with_writer(&mut doc, &mut sel, |w| {
            assert!(w.insert_soft_break().unwrap());
            assert_eq!(w.selection().anchor(), &Position::at(&[0], 4));
            let between = w.split_block().unwrap();
            assert_eq!(between, Position::new([1]));
            assert_eq!(w.selection().anchor(), &Position::at(&[1], 0));
        });
        let first = doc.element_at(&[0]).unwrap();
        assert_eq!(first.child_count(), 2);
        assert!(first.children[1].is_soft_break());
        assert_eq!(doc.element_at(&[1]).unwrap().text_content(), "bar");
    }

    #[test]
    fn test_set_text_attribute() {
        let mut doc = Document::with_blocks([Element::paragraph("foobar")]);
        let mut sel = Selection::default();
        with_writer(&mut doc, &mut sel, |w| {
            let range = Range::new(Position::at(&[0], 1), Position::at(&[0], 3));
            assert!(w.set_text_attribute(&range, "bold", "true").unwrap());
            assert!(!w.set_text_attribute(&range, "bogus", "true").unwrap());
        });
        let p = doc.element_at(&[0]).unwrap();
        assert_eq!(p.child_count(), 3);
        assert!(p.children[1].as_text().unwrap().attrs.get_attr("bold").is_some());
    }

    #[test]
    fn test_remove_disallowed() {
        let mut doc = Document::with_blocks([Element::paragraph("foo").attr("bogus", "1")]);
        doc.element_at_mut(&[0]).unwrap().children[0]
            .as_text_mut()
            .unwrap()
            .attrs
            .push(("bold".into(), "true".into()));
        let mut sel = Selection::default();
        with_writer(&mut doc, &mut sel, |w| {
            w.remove_disallowed_attributes(&[0]).unwrap();
        });
        let p = doc.element_at(&[0]).unwrap();
        assert!(!p.has_attr("bogus"));
        assert_eq!(p.children[0].as_text().unwrap().attrs.len(), 1);
    }
}
