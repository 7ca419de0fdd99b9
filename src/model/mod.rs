//! Document model: tree, selection, schema and transactions.
//!
//! All mutation goes through [`Model::change`], which hands out a [`Writer`].
//! A change whose closure fails is rolled back; a committed change that
//! touched the document is recorded in the undo history.

mod position;
mod schema;
mod writer;

pub use position::{Path, Position, Range, Selection};
pub use schema::{
    AttrTarget, AttributeCheck, ChildCheck, ChildKind, ElementDef, Schema, BLOCK, IMAGE_INLINE, INLINE, TEXT,
};
pub use writer::Writer;

use crate::node::{Document, Element, Node, Text};

/// Default number of undo steps kept by a model.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

type Snapshot = (Document, Selection);

// =============================================================================
// Model
// =============================================================================

/// Document plus selection, schema and undo history
#[derive(Debug)]
pub struct Model {
    doc: Document,
    selection: Selection,
    schema: Schema,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    history_depth: usize,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(Schema::default())
    }
}

impl Model {
    /// Create an empty model with the given schema
    pub fn new(schema: Schema) -> Self {
        Self {
            doc: Document::default(),
            selection: Selection::default(),
            schema,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }

    /// Builder: limit the undo history
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth;
        self
    }

    /// Current document
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Replace document and selection without recording history
    pub fn load(&mut self, doc: Document, selection: Selection) {
        self.doc = doc;
        self.selection = selection;
        self.clear_history();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `f` as one atomic change
    ///
    /// When `f` returns `Err` the document and selection are restored to
    /// their state before the call.
    pub fn change<R, E>(&mut self, f: impl FnOnce(&mut Writer<'_>) -> Result<R, E>) -> Result<R, E> {
        let snapshot = (self.doc.clone(), self.selection.clone());
        let result = {
            let mut writer = Writer::new(&mut self.doc, &mut self.selection, &self.schema);
            f(&mut writer)
        };
        match result {
            Ok(value) => {
                if snapshot.0 != self.doc {
                    self.push_undo(snapshot);
                    self.redo_stack.clear();
                }
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(target: "container_block::model", "change rolled back");
                (self.doc, self.selection) = snapshot;
                Err(err)
            }
        }
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        if self.history_depth == 0 {
            return;
        }
        if self.undo_stack.len() == self.history_depth {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(snapshot);
    }

    /// Revert the last committed change; returns `false` when there is none
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        let current = self.restore(snapshot);
        self.redo_stack.push(current);
        true
    }

    /// Re-apply the last undone change; returns `false` when there is none
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = self.restore(snapshot);
        self.undo_stack.push(current);
        true
    }

    fn restore(&mut self, (doc, selection): Snapshot) -> Snapshot {
        (
            std::mem::replace(&mut self.doc, doc),
            std::mem::replace(&mut self.selection, selection),
        )
    }

    /// Number of undo steps available
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Forget all undo and redo steps
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Paths of the leaf blocks touched by the first selection range, in document order
    ///
    /// A block that the range only touches at its very start (a non-collapsed
    /// range ending at offset 0) is not included.
    pub fn selected_blocks(&self) -> Vec<Path> {
        let range = self.selection.first_range();
        let mut blocks = Vec::new();
        collect_leaf_blocks(&self.doc.root, &mut Path::new(), &self.schema, &mut |path, elem| {
            let start = Position::at(path, 0);
            let end = Position::at(path, elem.max_offset());
            let touched = range.start <= end && start <= range.end;
            let only_at_start = !range.is_collapsed() && range.end == start;
            if touched && !only_at_start {
                blocks.push(Path::from_slice(path));
            }
        });
        blocks
    }

    /// Path of the first selected leaf block
    pub fn first_selected_block(&self) -> Option<Path> {
        self.selected_blocks().into_iter().next()
    }
}

fn collect_leaf_blocks<F>(elem: &Element, path: &mut Path, schema: &Schema, visit: &mut F)
where
    F: FnMut(&[usize], &Element),
{
    let mut offset = 0;
    let mut has_block_child = false;
    for child in &elem.children {
        if let Node::Element(child_elem) = child {
            if schema.is_block(&child_elem.name) {
                has_block_child = true;
                path.push(offset);
                collect_leaf_blocks(child_elem, path, schema, visit);
                path.pop();
            }
        }
        offset += child.offset_size();
    }
    if !has_block_child && !path.is_empty() && schema.is_block(&elem.name) {
        visit(path, elem);
    }
}

// =============================================================================
// Position queries on the document
// =============================================================================

impl Document {
    /// Parent element of a position
    pub fn parent_of(&self, pos: &Position) -> Option<&Element> {
        self.element_at(pos.parent_path())
    }

    /// Node starting at the position
    pub fn node_after(&self, pos: &Position) -> Option<&Node> {
        self.parent_of(pos)?.node_after(pos.offset())
    }

    /// Node ending at the position
    pub fn node_before(&self, pos: &Position) -> Option<&Node> {
        self.parent_of(pos)?.node_before(pos.offset())
    }

    /// Text run the position is strictly inside of
    pub fn text_at(&self, pos: &Position) -> Option<&Text> {
        self.parent_of(pos)?.text_containing(pos.offset())
    }

    /// Check whether the position is at offset 0 of its parent
    pub fn is_at_start(&self, pos: &Position) -> bool {
        pos.offset() == 0
    }

    /// Check whether the position is at the end of its parent
    pub fn is_at_end(&self, pos: &Position) -> bool {
        self.parent_of(pos).is_some_and(|p| p.max_offset() == pos.offset())
    }
}
