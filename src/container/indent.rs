//! Indent and outdent commands
//!
//! Both work on the positions from [`locate_line_starts`]: indent inserts the
//! configured sequence at each of them, outdent removes one trailing
//! occurrence of the sequence from each line's leading whitespace.

use crate::config::ContainerRegistry;
use crate::error::ModelResult;
use crate::model::{Model, Position, Range};
use crate::node::{Document, Element};

use super::{locate_line_starts, CommandState};

fn first_block_is_container(model: &Model) -> bool {
    model
        .first_selected_block()
        .is_some_and(|path| model.document().element_at(&path).is_some_and(Element::is_container_block))
}

// =============================================================================
// IndentLineCommand
// =============================================================================

/// The `indentLine` command
#[derive(Debug, Clone, Default)]
pub struct IndentLineCommand {
    state: CommandState,
}

impl IndentLineCommand {
    /// Command name
    pub const NAME: &'static str = "indentLine";

    pub fn new() -> Self {
        Self::default()
    }

    /// State computed by the last refresh
    pub fn state(&self) -> &CommandState {
        &self.state
    }

    /// Enabled when an indent sequence is configured and the first selected
    /// block is a container
    pub fn refresh(&mut self, model: &Model, registry: &ContainerRegistry) {
        self.state.enabled = registry.indent_sequence().is_some() && first_block_is_container(model);
    }

    /// Indent the selected lines; returns `false` when disabled
    pub fn execute(&mut self, model: &mut Model, registry: &ContainerRegistry) -> ModelResult<bool> {
        self.refresh(model, registry);
        let Some(sequence) = registry.indent_sequence().filter(|_| self.state.enabled) else {
            return Ok(false);
        };
        model.change(|w| -> ModelResult<()> {
            let positions = locate_line_starts(w.document(), w.selection());
            tracing::debug!(target: "container_block::indent", lines = positions.len(), "indent");
            for pos in &positions {
                w.insert_text(pos, sequence)?;
            }
            Ok(())
        })?;
        self.refresh(model, registry);
        Ok(true)
    }
}

// =============================================================================
// OutdentLineCommand
// =============================================================================

/// The `outdentLine` command
#[derive(Debug, Clone, Default)]
pub struct OutdentLineCommand {
    state: CommandState,
}

impl OutdentLineCommand {
    /// Command name
    pub const NAME: &'static str = "outdentLine";

    pub fn new() -> Self {
        Self::default()
    }

    /// State computed by the last refresh
    pub fn state(&self) -> &CommandState {
        &self.state
    }

    /// Enabled when at least one selected line ends its indentation with the sequence
    pub fn refresh(&mut self, model: &Model, registry: &ContainerRegistry) {
        self.state.enabled = match registry.indent_sequence() {
            Some(sequence) if first_block_is_container(model) => {
                let doc = model.document();
                locate_line_starts(doc, model.selection())
                    .iter()
                    .any(|pos| outdent_range(doc, pos, sequence).is_some())
            }
            _ => false,
        };
    }

    /// Outdent the selected lines; returns `false` when disabled
    pub fn execute(&mut self, model: &mut Model, registry: &ContainerRegistry) -> ModelResult<bool> {
        self.refresh(model, registry);
        let Some(sequence) = registry.indent_sequence().filter(|_| self.state.enabled) else {
            return Ok(false);
        };
        model.change(|w| -> ModelResult<()> {
            let positions = locate_line_starts(w.document(), w.selection());
            tracing::debug!(target: "container_block::indent", lines = positions.len(), "outdent");
            for pos in &positions {
                if let Some(range) = outdent_range(w.document(), pos, sequence) {
                    w.remove(&range)?;
                }
            }
            Ok(())
        })?;
        self.refresh(model, registry);
        Ok(true)
    }
}

/// Range of the sequence ending the leading whitespace of the line at `pos`
///
/// The line is the text run at the position, or the one right before it when
/// the position sits on a marker or at the container end.
pub fn outdent_range(doc: &Document, pos: &Position, sequence: &str) -> Option<Range> {
    let parent = doc.parent_of(pos)?;
    let slot = parent.slot_at(pos.offset())?;
    let index = match parent.children.get(slot.index) {
        Some(node) if !node.is_soft_break() => slot.index,
        _ => slot.index.checked_sub(1)?,
    };
    let text = parent.children.get(index)?.as_text()?;
    let indent = text.leading_whitespace();
    if sequence.is_empty() || !indent.ends_with(sequence) {
        return None;
    }
    let end = parent.offset_of(index) + indent.chars().count();
    let start = end - sequence.chars().count();
    Some(Range::new(pos.with_offset(start), pos.with_offset(end)))
}
