//! container-block - Multi-line container blocks for structured documents
//!
//! ## Core Concepts
//!
//! **Flat line model**: a container block holds text runs and `softBreak`
//! markers only. Lines are implicit, bounded by markers and the container
//! edges, so every editing operation is a plain tree edit.
//!
//! **Handler chains**: conversion between the model and view trees runs
//! ordered handlers that answer `Handled`, `Declined` or `Aborted`.
//!
//! ## Modules
//! - `node`: Document/Element/Text/Node types
//! - `model`: positions, selection, schema, writer and transactions
//! - `view`, `render`: view trees and their HTML rendering
//! - `convert`: downcast (model → view) and upcast (view → model)
//! - `container`: locator, toggle, boundary exits, indent/outdent, clipboard
//! - `editor`: a session wiring all of the above
//! - `config`: container definitions and the indent sequence
//!
//! ## Usage
//!
//! ```
//! use container_block::prelude::*;
//!
//! let mut editor = Editor::default();
//! editor.load(
//!     Document::with_blocks([Element::paragraph("one"), Element::paragraph("two")]),
//!     Selection::between(Position::at(&[0], 0), Position::at(&[1], 3)),
//! );
//! editor.execute_toggle(&ToggleOptions::container("info")).unwrap();
//! assert_eq!(
//!     editor.get_data(),
//!     "<blockquote class=\"info\"><p>one\ntwo</p></blockquote>"
//! );
//! ```

#[macro_use]
mod macros;

// =============================================================================
// Core modules
// =============================================================================

/// Attribute types
pub mod attr;

/// Error types
pub mod error;

/// Container configuration and registry
pub mod config;

/// Node types: Document, Element, Node, Text
pub mod node;

/// Document model: positions, schema, writer, transactions
pub mod model;

/// View trees produced and consumed by conversion
pub mod view;

/// HTML rendering of view trees
pub mod render;

/// Model ↔ view conversion
pub mod convert;

/// Container block editing
pub mod container;

/// Editor session
pub mod editor;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Node types
pub use node::{Children, Document, Element, Node, Text};

// Model
pub use model::{Model, Position, Range, Schema, Selection, Writer};

// Configuration
pub use config::{ContainerConfig, ContainerDefinition, ContainerRegistry};

// Container editing
pub use container::{BoundaryOutcome, CommandState, ToggleOptions, CONTAINER_BLOCK, CONTAINER_CLASS_ATTR};

// Editor
pub use editor::{Editor, KeyEvent, KeyOutcome};

// Error types
pub use error::{ConfigError, ConfigResult, ModelError, ModelResult};
