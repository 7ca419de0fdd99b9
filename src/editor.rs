//! Editor session
//!
//! [`Editor`] owns one document model together with everything the container
//! feature hangs off it: the validated configuration, the three commands, both
//! downcast pipelines and the upcaster. Commands are refreshed after every
//! change so their [`CommandState`] always reflects the current selection.
//!
//! # Example
//!
//! ```
//! use container_block::editor::{Editor, KeyEvent, KeyOutcome};
//! use container_block::view::{ViewElement, ViewNode};
//!
//! let mut editor = Editor::default();
//! editor
//!     .set_data(&[ViewNode::from(ViewElement::new("p").text("Hello"))])
//!     .unwrap();
//! editor.execute("toggleContainer").unwrap();
//! assert_eq!(editor.get_data(), r#"<blockquote class="success"><p>Hello</p></blockquote>"#);
//! assert_eq!(editor.handle_key(KeyEvent::TAB).unwrap(), KeyOutcome::Handled);
//! ```

use std::convert::Infallible;

use crate::config::{ContainerConfig, ContainerRegistry};
use crate::container::{
    handle_line_break, paste_plain_text, register_schema, selected_content, BoundaryOutcome, CommandState,
    IndentLineCommand, OutdentLineCommand, ToggleContainerCommand, ToggleOptions,
};
use crate::convert::{container, Downcaster, Pipeline, Upcaster};
use crate::error::{ConfigResult, ModelResult};
use crate::model::{Model, Position, Schema, Selection};
use crate::node::{Document, Element, Node, ROOT};
use crate::render::{render_fragment, RenderConfig};
use crate::view::ViewNode;

// =============================================================================
// Key events
// =============================================================================

/// Keys the container feature listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Enter (`soft: false`) or Shift+Enter (`soft: true`)
    Enter { soft: bool },
    /// Tab (`shift: false`) or Shift+Tab (`shift: true`)
    Tab { shift: bool },
}

impl KeyEvent {
    pub const ENTER: Self = KeyEvent::Enter { soft: false };
    pub const SHIFT_ENTER: Self = KeyEvent::Enter { soft: true };
    pub const TAB: Self = KeyEvent::Tab { shift: false };
    pub const SHIFT_TAB: Self = KeyEvent::Tab { shift: true };
}

/// Whether a key event was consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The event changed the document; the host must not handle it again
    Handled,
    /// Not applicable here; the host's default behavior applies
    Ignored,
}

// =============================================================================
// Editor
// =============================================================================

/// A document model with container blocks enabled
#[derive(Debug)]
pub struct Editor {
    model: Model,
    registry: ContainerRegistry,
    toggle: ToggleContainerCommand,
    indent: IndentLineCommand,
    outdent: OutdentLineCommand,
    editing: Downcaster,
    data: Downcaster,
    upcaster: Upcaster,
    render: RenderConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_registry(ContainerRegistry::default())
    }
}

impl Editor {
    /// Editor for a configuration; fails when the configuration is invalid
    pub fn new(config: ContainerConfig) -> ConfigResult<Self> {
        Ok(Self::with_registry(ContainerRegistry::new(config)?))
    }

    /// Editor for an already validated registry
    pub fn with_registry(registry: ContainerRegistry) -> Self {
        let mut schema = Schema::default();
        register_schema(&mut schema);

        let mut editing = Downcaster::new(Pipeline::Editing);
        container::register_downcast(&mut editing);
        let mut data = Downcaster::new(Pipeline::Data);
        container::register_downcast(&mut data);
        let mut upcaster = Upcaster::new();
        container::register_upcast(&mut upcaster);

        let mut editor = Self {
            model: Model::new(schema),
            registry,
            toggle: ToggleContainerCommand::new(),
            indent: IndentLineCommand::new(),
            outdent: OutdentLineCommand::new(),
            editing,
            data,
            upcaster,
            render: RenderConfig::default(),
        };
        editor.refresh();
        editor
    }

    /// Builder: HTML rendering options for [`get_data`](Self::get_data)
    pub fn with_render_config(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn document(&self) -> &Document {
        self.model.document()
    }

    pub fn selection(&self) -> &Selection {
        self.model.selection()
    }

    pub fn registry(&self) -> &ContainerRegistry {
        &self.registry
    }

    /// Container used by the last wrapping toggle
    pub fn last_used_container(&self) -> Option<&str> {
        self.toggle.last_used()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the document with explicit content, clearing the undo history
    pub fn load(&mut self, doc: Document, selection: Selection) {
        self.model.load(doc, selection);
        self.refresh();
    }

    /// Replace the document with the upcast of an exported view fragment
    ///
    /// The cursor is placed at the start of the first block and the undo
    /// history is cleared.
    pub fn set_data(&mut self, fragment: &[ViewNode]) -> ModelResult<()> {
        self.model.load(Document::default(), Selection::default());
        let (upcaster, registry) = (&self.upcaster, &self.registry);
        let result = self.model.change(|w| -> ModelResult<()> {
            upcaster.convert(w, registry, fragment, Position::new([0]))?;
            if matches!(w.document().root.children.first(), Some(Node::Element(_))) {
                w.set_selection_at(Position::at(&[0], 0));
            }
            Ok(())
        });
        self.model.clear_history();
        self.refresh();
        tracing::debug!(target: "container_block::editor", blocks = self.document().root.children.len(), "data loaded");
        result
    }

    /// Export view tree of the document
    pub fn data_view(&self) -> Vec<ViewNode> {
        self.data.convert_document(self.model.document(), &self.registry)
    }

    /// Exported HTML of the document
    pub fn get_data(&self) -> String {
        render_fragment(&self.data_view(), &self.render)
    }

    /// Editing view tree of the document (labels included)
    pub fn editing_view(&self) -> Vec<ViewNode> {
        self.editing.convert_document(self.model.document(), &self.registry)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection and history
    // ─────────────────────────────────────────────────────────────────────────

    /// Move the selection; commands are refreshed
    pub fn set_selection(&mut self, selection: Selection) {
        let Ok(()) = self.model.change(|w| -> Result<(), Infallible> {
            w.set_selection(selection);
            Ok(())
        });
        self.refresh();
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.model.undo();
        self.refresh();
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.model.redo();
        self.refresh();
        redone
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// State of a command by name, `None` for unknown names
    pub fn command_state(&self, name: &str) -> Option<&CommandState> {
        match name {
            ToggleContainerCommand::NAME => Some(self.toggle.state()),
            IndentLineCommand::NAME => Some(self.indent.state()),
            OutdentLineCommand::NAME => Some(self.outdent.state()),
            _ => None,
        }
    }

    /// Execute a command by name with default options
    ///
    /// Returns `false` for unknown names and disabled commands.
    pub fn execute(&mut self, name: &str) -> ModelResult<bool> {
        match name {
            ToggleContainerCommand::NAME => self.execute_toggle(&ToggleOptions::default()),
            IndentLineCommand::NAME => self.execute_indent(),
            OutdentLineCommand::NAME => self.execute_outdent(),
            _ => {
                tracing::debug!(target: "container_block::editor", name, "unknown command");
                Ok(false)
            }
        }
    }

    /// Wrap or unwrap the selected blocks; returns `false` when disabled
    pub fn execute_toggle(&mut self, options: &ToggleOptions) -> ModelResult<bool> {
        if !self.toggle.state().enabled {
            return Ok(false);
        }
        let result = self.toggle.execute(&mut self.model, &self.registry, options);
        self.refresh();
        result.map(|()| true)
    }

    /// Indent the selected lines; returns `false` when disabled
    pub fn execute_indent(&mut self) -> ModelResult<bool> {
        let result = self.indent.execute(&mut self.model, &self.registry);
        self.refresh();
        result
    }

    /// Outdent the selected lines; returns `false` when disabled
    pub fn execute_outdent(&mut self) -> ModelResult<bool> {
        let result = self.outdent.execute(&mut self.model, &self.registry);
        self.refresh();
        result
    }

    fn refresh(&mut self) {
        self.toggle.refresh(&self.model, &self.registry);
        self.indent.refresh(&self.model, &self.registry);
        self.outdent.refresh(&self.model, &self.registry);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keys
    // ─────────────────────────────────────────────────────────────────────────

    /// Run the container key bindings
    ///
    /// Enter and Shift+Enter go through the boundary handling when the
    /// selection ends in a container. Tab and Shift+Tab indent and outdent
    /// when those commands are enabled.
    pub fn handle_key(&mut self, key: KeyEvent) -> ModelResult<KeyOutcome> {
        let handled = match key {
            KeyEvent::Enter { soft } => self.line_break(soft)?.is_some(),
            KeyEvent::Tab { shift: false } => self.execute_indent()?,
            KeyEvent::Tab { shift: true } => self.execute_outdent()?,
        };
        Ok(if handled {
            KeyOutcome::Handled
        } else {
            KeyOutcome::Ignored
        })
    }

    /// Handle a line break; `None` when the selection is not in a container
    pub fn line_break(&mut self, soft: bool) -> ModelResult<Option<BoundaryOutcome>> {
        let result = self.model.change(|w| handle_line_break(w, soft));
        self.refresh();
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clipboard
    // ─────────────────────────────────────────────────────────────────────────

    /// Paste plain text; returns `false` when the cursor is not in a container
    pub fn paste_text(&mut self, text: &str) -> ModelResult<bool> {
        let (upcaster, registry) = (&self.upcaster, &self.registry);
        let result = self.model.change(|w| paste_plain_text(w, upcaster, registry, text));
        self.refresh();
        result
    }

    /// Model nodes of the current selection
    pub fn copy(&self) -> Vec<Node> {
        selected_content(self.model.document(), self.model.selection())
    }

    /// Exported HTML of the current selection
    pub fn copy_html(&self) -> String {
        let mut root = Element::new(ROOT);
        root.children = self.copy().into_iter().collect();
        let view = self.data.convert_document(&Document::new(root), &self.registry);
        render_fragment(&view, &self.render)
    }
}
