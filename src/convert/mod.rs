//! Conversion between the model and view trees
//!
//! Conversion is driven by ordered handler chains. Every node produces one
//! conversion event; handlers are tried in priority order and each answers
//! with a [`Flow`]:
//!
//! | Flow | Meaning |
//! |------|---------|
//! | `Handled` | the event was consumed, the chain stops |
//! | `Declined` | nothing was changed, the next handler is tried |
//! | `Aborted` | the chain stops and the node is dropped |
//!
//! # Module Structure
//!
//! - [`downcast`] - model → view (editing and data pipelines)
//! - [`upcast`] - view → model (data ingestion and clipboard)
//! - [`container`] - container block handlers for both directions

pub mod container;
pub mod downcast;
pub mod upcast;

pub use container::{insert_raw_text, raw_text_to_view_fragment, LABEL_ATTR};
pub use downcast::{Converted, DowncastContext, DowncastEvent, DowncastHandler, Downcaster};
pub use upcast::{UpcastContext, UpcastEvent, UpcastHandler, Upcaster};

// =============================================================================
// Flow
// =============================================================================

/// Result of one handler for one conversion event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<T = ()> {
    /// Event consumed; stop the chain
    Handled(T),
    /// Not applicable; try the next handler
    Declined,
    /// Stop the chain and drop the node
    Aborted,
}

impl<T> Flow<T> {
    /// Check if the event was consumed
    #[inline]
    pub fn is_handled(&self) -> bool {
        matches!(self, Flow::Handled(_))
    }

    /// Check if the handler declined
    #[inline]
    pub fn is_declined(&self) -> bool {
        matches!(self, Flow::Declined)
    }
}

impl Flow {
    /// Shorthand for `Flow::Handled(())`
    pub const HANDLED: Self = Flow::Handled(());
}

/// Which downcast pipeline a conversion runs for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    /// Tree shown in the live editing view
    Editing,
    /// Tree used for export (`get_data`)
    Data,
}

/// Handler position in a chain; higher priorities run first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// Insert `item` after every entry with the same or higher priority
pub(crate) fn insert_by_priority<T>(chain: &mut Vec<(Priority, T)>, priority: Priority, item: T) {
    let index = chain
        .iter()
        .position(|(p, _)| *p < priority)
        .unwrap_or(chain.len());
    chain.insert(index, (priority, item));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_predicates() {
        assert!(Flow::HANDLED.is_handled());
        assert!(Flow::<()>::Declined.is_declined());
        assert!(!Flow::<()>::Aborted.is_handled());
        assert!(!Flow::<()>::Aborted.is_declined());
    }

    #[test]
    fn test_insert_by_priority() {
        let mut chain = Vec::new();
        insert_by_priority(&mut chain, Priority::Normal, "generic-1");
        insert_by_priority(&mut chain, Priority::Low, "fallback");
        insert_by_priority(&mut chain, Priority::Normal, "generic-2");
        insert_by_priority(&mut chain, Priority::High, "container");
        let order: Vec<_> = chain.iter().map(|(_, name)| *name).collect();
        assert_eq!(order, vec!["container", "generic-1", "generic-2", "fallback"]);
    }
}
