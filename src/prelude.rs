//! Prelude module for common imports.
//!
//! ```ignore
//! use container_block::prelude::*;
//! ```

// Node types
pub use crate::node::{Children, Document, Element, Node, Text, PARAGRAPH, SOFT_BREAK};

// Model
pub use crate::model::{Model, Path, Position, Range, Schema, Selection, Writer};

// Attributes
pub use crate::attr::Attrs;

// Configuration
pub use crate::config::{ContainerConfig, ContainerDefinition, ContainerRegistry, DEFAULT_INDENT_SEQUENCE};

// Views
pub use crate::view::{ViewElement, ViewNode};

// Render
pub use crate::render::{render_fragment, render_view, RenderConfig};

// Conversion
pub use crate::convert::{Downcaster, Flow, Pipeline, Priority, Upcaster};

// Container editing
pub use crate::container::{
    locate_line_starts, BoundaryOutcome, CommandState, IndentLineCommand, OutdentLineCommand,
    ToggleContainerCommand, ToggleOptions, CONTAINER_BLOCK, CONTAINER_CLASS_ATTR,
};

// Editor
pub use crate::editor::{Editor, KeyEvent, KeyOutcome};

// Error
pub use crate::error::{ConfigError, ConfigResult, ModelError, ModelResult};
