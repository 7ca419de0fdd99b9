//! Error types for container-block.
//!
//! Precondition failures (wrong parent, nesting, schema refusal) are never
//! errors: handlers decline and commands report themselves disabled. The types
//! here cover misuse of the document model and invalid configuration.

use thiserror::Error;

use crate::model::Position;

/// Errors raised by the document model when an operation cannot address the tree.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A position does not point into the document
    #[error("position {0} does not address the document")]
    InvalidPosition(Position),

    /// A path was expected to address an element but found text or nothing
    #[error("no element at path {0:?}")]
    NoElement(Vec<usize>),

    /// A range whose start and end have different parents
    #[error("range {start}..{end} spans different parents")]
    CrossParentRange {
        /// Range start
        start: Position,
        /// Range end
        end: Position,
    },

    /// The root element cannot be split, merged, renamed or removed
    #[error("operation not permitted on the document root")]
    RootOperation,

    /// Merge requires two adjacent elements
    #[error("nothing to merge at {0}")]
    NothingToMerge(Position),
}

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while loading or validating a container configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The container list is empty, so there is no default container
    #[error("at least one container definition is required")]
    NoContainers,

    /// A definition with an empty name
    #[error("container definition #{index} has an empty name")]
    EmptyName {
        /// Index of the offending definition
        index: usize,
    },

    /// TOML parsing failed
    #[cfg(feature = "toml")]
    #[error("failed to parse container configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ModelError {
    /// Create a no-element error from any path slice.
    pub fn no_element(path: &[usize]) -> Self {
        Self::NoElement(path.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::no_element(&[0, 2]);
        assert_eq!(err.to_string(), "no element at path [0, 2]");

        let err = ConfigError::EmptyName { index: 1 };
        assert_eq!(err.to_string(), "container definition #1 has an empty name");

        let err = ModelError::InvalidPosition(Position::new([3, 1]));
        assert_eq!(err.to_string(), "position [3, 1] does not address the document");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModelError>();
        assert_send_sync::<ConfigError>();
    }
}
