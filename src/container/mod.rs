//! Container blocks
//!
//! A container block is a `containerBlock` element holding text runs and
//! `softBreak` markers. Its lines are implicit: a line is the run of text
//! between two markers, or between a marker and a container edge.
//!
//! # Module Structure
//!
//! - [`locator`] - line-start positions for indent and outdent
//! - [`toggle`] - wrap blocks into a container and unwrap it again
//! - [`boundary`] - line-break key handling inside a container
//! - [`indent`] - indent and outdent commands
//! - [`clipboard`] - paste and copy inside a container

pub mod boundary;
pub mod clipboard;
pub mod indent;
pub mod locator;
pub mod toggle;

pub use boundary::{decide_boundary, handle_line_break, BoundaryOutcome};
pub use clipboard::{paste_plain_text, selected_content};
pub use indent::{IndentLineCommand, OutdentLineCommand};
pub use locator::locate_line_starts;
pub use toggle::{ToggleContainerCommand, ToggleOptions};
pub use crate::node::{CONTAINER_BLOCK, CONTAINER_CLASS_ATTR};

use compact_str::CompactString;

use crate::model::{AttrTarget, ChildKind, ElementDef, Path, Position, Schema, TEXT};
use crate::node::{Document, Element, SOFT_BREAK};

/// Observable state of a command after its last refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandState {
    /// Whether executing the command would do anything
    pub enabled: bool,
    /// Command value (the container name for `toggleContainer`)
    pub value: Option<CompactString>,
}

/// Register `containerBlock` in a schema
///
/// The container is allowed wherever blocks are. It takes text and line-break
/// markers, never objects, and its text carries no formatting attributes.
pub fn register_schema(schema: &mut Schema) {
    schema.register(
        ElementDef::new(CONTAINER_BLOCK)
            .block()
            .allow_child(TEXT)
            .allow_child(SOFT_BREAK)
            .allow_attribute(CONTAINER_CLASS_ATTR),
    );
    schema.add_child_check(|parent, child, schema| match child {
        ChildKind::Element(name) if parent == CONTAINER_BLOCK && schema.is_object(name) => Some(false),
        _ => None,
    });
    schema.add_attribute_check(|target, _| match target {
        AttrTarget::Text { parent } if parent == CONTAINER_BLOCK => Some(false),
        _ => None,
    });
}

/// Path of the container block a position sits directly in
pub fn container_of(doc: &Document, pos: &Position) -> Option<Path> {
    doc.parent_of(pos)
        .filter(|parent| parent.is_container_block())
        .map(|_| Path::from_slice(pos.parent_path()))
}

/// Check whether the block at `path` may become a container block
///
/// The root, limit elements and blocks whose parent refuses a container
/// are not eligible.
pub fn can_become_container(doc: &Document, schema: &Schema, path: &[usize]) -> bool {
    let Some((_, parent_path)) = path.split_last() else {
        return false;
    };
    let (Some(elem), Some(parent)) = (doc.element_at(path), doc.element_at(parent_path)) else {
        return false;
    };
    !schema.is_limit(&elem.name) && schema.check_child(&parent.name, ChildKind::Element(CONTAINER_BLOCK))
}

/// Create a container block with the given class and no content
pub fn new_container(class: &str) -> Element {
    Element::new(CONTAINER_BLOCK).attr(CONTAINER_CLASS_ATTR, class)
}
