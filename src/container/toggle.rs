//! Toggle command: wrap blocks into one container, or unwrap a container
//!
//! Wrapping renames every eligible selected block to `containerBlock` and
//! merges adjacent ones, joining them with line-break markers. Unwrapping
//! splits a container at each marker back into paragraphs.

use compact_str::CompactString;

use crate::config::ContainerRegistry;
use crate::error::ModelResult;
use crate::model::{Model, Path, Position, Range, Writer};
use crate::node::{Element, PARAGRAPH};

use super::{can_become_container, CommandState, CONTAINER_BLOCK, CONTAINER_CLASS_ATTR};

/// Options for one toggle execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleOptions {
    /// Container name (or literal class) to apply
    pub container: Option<CompactString>,
    /// Force wrapping (`true`) or unwrapping (`false`) instead of toggling
    pub force_value: Option<bool>,
    /// Fall back to the last used container before the default one
    pub use_previous: bool,
}

impl ToggleOptions {
    /// Options applying a specific container
    pub fn container(name: impl Into<CompactString>) -> Self {
        Self {
            container: Some(name.into()),
            ..Default::default()
        }
    }

    /// Builder: force wrapping or unwrapping
    pub fn force(mut self, value: bool) -> Self {
        self.force_value = Some(value);
        self
    }

    /// Builder: prefer the last used container
    pub fn use_previous(mut self) -> Self {
        self.use_previous = true;
        self
    }
}

// =============================================================================
// ToggleContainerCommand
// =============================================================================

/// The `toggleContainer` command
///
/// Remembers the last container it applied for `use_previous` executions.
#[derive(Debug, Clone, Default)]
pub struct ToggleContainerCommand {
    state: CommandState,
    last_used: Option<CompactString>,
}

impl ToggleContainerCommand {
    /// Command name
    pub const NAME: &'static str = "toggleContainer";

    pub fn new() -> Self {
        Self::default()
    }

    /// State computed by the last refresh
    pub fn state(&self) -> &CommandState {
        &self.state
    }

    /// Container applied by the last wrapping execution
    pub fn last_used(&self) -> Option<&str> {
        self.last_used.as_deref()
    }

    /// Recompute `value` and `enabled` from the selection
    ///
    /// `value` is the container name of the first selected block; the command
    /// is enabled when that block is a container or can become one.
    pub fn refresh(&mut self, model: &Model, registry: &ContainerRegistry) {
        let doc = model.document();
        let first = model.first_selected_block();
        let value = first
            .as_deref()
            .and_then(|path| doc.element_at(path))
            .filter(|block| block.is_container_block())
            .map(|block| container_name(block, registry));
        let enabled = value.is_some()
            || first
                .as_deref()
                .is_some_and(|path| can_become_container(doc, model.schema(), path));
        self.state = CommandState { enabled, value };
    }

    /// Wrap or unwrap the selected blocks
    pub fn execute(
        &mut self,
        model: &mut Model,
        registry: &ContainerRegistry,
        options: &ToggleOptions,
    ) -> ModelResult<()> {
        self.refresh(model, registry);
        let wrap = options.force_value.unwrap_or(self.state.value.is_none());
        let blocks = model.selected_blocks();

        if wrap {
            let name = options
                .container
                .clone()
                .or_else(|| options.use_previous.then(|| self.last_used.clone()).flatten())
                .unwrap_or_else(|| registry.default_definition().name.clone());
            let class = registry.class_for(&name);
            tracing::debug!(target: "container_block::toggle", %name, blocks = blocks.len(), "wrapping blocks");
            model.change(|w| apply(w, &blocks, &class))?;
            self.last_used = Some(name);
        } else {
            tracing::debug!(target: "container_block::toggle", blocks = blocks.len(), "unwrapping containers");
            model.change(|w| remove(w, &blocks))?;
        }
        self.refresh(model, registry);
        Ok(())
    }
}

/// Configured name of a container's class, or the class itself
fn container_name(block: &Element, registry: &ContainerRegistry) -> CompactString {
    let class = block.container_class().unwrap_or_default();
    registry
        .by_class(class)
        .map_or_else(|| CompactString::from(class), |def| def.name.clone())
}

// =============================================================================
// Transforms
// =============================================================================

/// Turn the eligible blocks into containers with `class` and merge neighbours
///
/// `blocks` must be in document order. Returns the number of blocks converted.
pub fn apply(writer: &mut Writer<'_>, blocks: &[Path], class: &str) -> ModelResult<usize> {
    let eligible: Vec<&Path> = blocks
        .iter()
        .filter(|path| can_become_container(writer.document(), writer.schema(), path))
        .collect();

    for path in &eligible {
        writer.rename(path, CONTAINER_BLOCK)?;
        writer.set_attribute(path, CONTAINER_CLASS_ATTR, class)?;
        writer.remove_disallowed_attributes(path)?;
        writer.remove_disallowed_children(path)?;
    }

    for pair in eligible.windows(2).rev() {
        let (earlier, later) = (pair[0], pair[1]);
        if !is_next_sibling(earlier, later) {
            continue;
        }
        writer.append_element(earlier, Element::soft_break())?;
        writer.merge(&Position::after(earlier))?;
    }
    Ok(eligible.len())
}

/// Split every container among `blocks` into plain paragraphs, one per line
///
/// `blocks` must be in document order.
pub fn remove(writer: &mut Writer<'_>, blocks: &[Path]) -> ModelResult<()> {
    for path in blocks.iter().rev() {
        let Some(block) = writer.document().element_at(path) else {
            continue;
        };
        if !block.is_container_block() {
            continue;
        }
        let mut markers = Vec::new();
        let mut offset = 0;
        for child in &block.children {
            if child.is_soft_break() {
                markers.push(offset);
            }
            offset += child.offset_size();
        }

        for &marker in markers.iter().rev() {
            let between = writer.split(&Position::at(path, marker))?;
            let line = between.node_path();
            writer.rename(line, PARAGRAPH)?;
            writer.remove_attribute(line, CONTAINER_CLASS_ATTR)?;
            writer.remove(&Range::new(Position::at(line, 0), Position::at(line, 1)))?;
        }
        writer.rename(path, PARAGRAPH)?;
        writer.remove_attribute(path, CONTAINER_CLASS_ATTR)?;
    }
    Ok(())
}

fn is_next_sibling(earlier: &[usize], later: &[usize]) -> bool {
    match (earlier.split_last(), later.split_last()) {
        (Some((a, a_parent)), Some((b, b_parent))) => a_parent == b_parent && a + 1 == *b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{new_container, register_schema};
    use crate::model::{Schema, Selection};
    use crate::node::{Document, Node};
    use pretty_assertions::assert_eq;

    fn model(blocks: impl IntoIterator<Item = Element>, selection: Selection) -> Model {
        let mut schema = Schema::default();
        register_schema(&mut schema);
        let mut model = Model::new(schema);
        model.load(Document::with_blocks(blocks), selection);
        model
    }

    fn select_all(blocks: usize, last_len: usize) -> Selection {
        Selection::between(Position::at(&[0], 0), Position::at(&[blocks - 1], last_len))
    }

    #[test]
    fn test_wrap_merges_blocks() {
        let registry = ContainerRegistry::default();
        let mut model = model(
            [Element::paragraph("foo"), Element::paragraph("bar"), Element::paragraph("baz")],
            select_all(3, 3),
        );
        let mut command = ToggleContainerCommand::new();
        command
            .execute(&mut model, &registry, &ToggleOptions::container("warning"))
            .unwrap();

        assert_eq!(
            model.document(),
            &Document::with_blocks([new_container("warning")
                .text("foo")
                .child(Element::soft_break())
                .text("bar")
                .child(Element::soft_break())
                .text("baz")])
        );
        assert_eq!(command.state().value.as_deref(), Some("warning"));
        assert_eq!(command.last_used(), Some("warning"));
    }

    #[test]
    fn test_unwrap_restores_blocks() {
        let registry = ContainerRegistry::default();
        let container = new_container("info")
            .text("foo")
            .child(Element::soft_break())
            .child(Element::soft_break())
            .text("bar");
        let mut model = model([container], Selection::collapsed(Position::at(&[0], 1)));
        let mut command = ToggleContainerCommand::new();
        command.refresh(&model, &registry);
        assert_eq!(command.state().value.as_deref(), Some("info"));

        command.execute(&mut model, &registry, &ToggleOptions::default()).unwrap();
        assert_eq!(
            model.document(),
            &Document::with_blocks([
                Element::paragraph("foo"),
                Element::new(PARAGRAPH),
                Element::paragraph("bar"),
            ])
        );
        assert_eq!(command.state().value, None);
        assert!(command.state().enabled);
    }

    #[test]
    fn test_container_resolution() {
        let registry = ContainerRegistry::default();
        let mut command = ToggleContainerCommand::new();

        let mut m = model([Element::paragraph("a")], Selection::collapsed(Position::at(&[0], 0)));
        command.execute(&mut m, &registry, &ToggleOptions::container("error")).unwrap();
        assert_eq!(m.document().element_at(&[0]).unwrap().container_class(), Some("error"));

        // The default container unless the previous one is requested
        let mut m = model([Element::paragraph("a")], Selection::collapsed(Position::at(&[0], 0)));
        command.execute(&mut m, &registry, &ToggleOptions::default()).unwrap();
        assert_eq!(m.document().element_at(&[0]).unwrap().container_class(), Some("success"));

        let mut m = model([Element::paragraph("a")], Selection::collapsed(Position::at(&[0], 0)));
        command.last_used = Some("warning".into());
        command
            .execute(&mut m, &registry, &ToggleOptions::default().use_previous())
            .unwrap();
        assert_eq!(m.document().element_at(&[0]).unwrap().container_class(), Some("warning"));

        // Unknown names are stored verbatim
        let mut m = model([Element::paragraph("a")], Selection::collapsed(Position::at(&[0], 0)));
        command.execute(&mut m, &registry, &ToggleOptions::container("custom")).unwrap();
        assert_eq!(m.document().element_at(&[0]).unwrap().container_class(), Some("custom"));
        assert_eq!(command.state().value.as_deref(), Some("custom"));
    }

    #[test]
    fn test_force_value() {
        let registry = ContainerRegistry::default();
        let mut command = ToggleContainerCommand::new();
        let mut m = model(
            [new_container("info").text("a"), Element::paragraph("b")],
            select_all(2, 1),
        );
        command
            .execute(&mut m, &registry, &ToggleOptions::container("info").force(true))
            .unwrap();
        assert_eq!(
            m.document(),
            &Document::with_blocks([new_container("info")
                .text("a")
                .child(Element::soft_break())
                .text("b")])
        );
    }

    #[test]
    fn test_apply_strips_disallowed_content() {
        let registry = ContainerRegistry::default();
        let paragraph = Element::new(PARAGRAPH)
            .attr("alignment", "right")
            .text("a")
            .child(Element::new(crate::model::IMAGE_INLINE))
            .text("b");
        let mut m = model([paragraph], Selection::collapsed(Position::at(&[0], 0)));
        ToggleContainerCommand::new()
            .execute(&mut m, &registry, &ToggleOptions::default())
            .unwrap();
        let block = m.document().element_at(&[0]).unwrap();
        assert!(block.is_container_block());
        assert!(!block.has_attr("alignment"));
        assert_eq!(block.children.as_slice(), &[Node::text("ab")]);
    }

    #[test]
    fn test_disabled_for_limits() {
        let registry = ContainerRegistry::default();
        let mut command = ToggleContainerCommand::new();
        let mut schema = Schema::default();
        register_schema(&mut schema);
        let mut m = Model::new(schema);
        m.load(Document::default(), Selection::default());
        command.refresh(&m, &registry);
        assert!(!command.state().enabled);
    }
}
