//! Document tree node types.
//!
//! This module provides the `Element`, `Node`, `Text`, and `Document` types
//! of the in-memory document model. Lines inside a container block are not
//! nodes of their own: they are the text between `softBreak` markers.

mod element;
mod text;
mod document;

pub use element::{ChildSlot, Element};
pub use text::{Text, leading_whitespace};
pub use document::Document;

use smallvec::SmallVec;

/// Name of the document root element.
pub const ROOT: &str = "$root";

/// Name of the default plain block.
pub const PARAGRAPH: &str = "paragraph";

/// Name of the zero-width line-break marker.
pub const SOFT_BREAK: &str = "softBreak";

/// Name of a container block.
pub const CONTAINER_BLOCK: &str = "containerBlock";

/// Attribute holding a container block's CSS class.
pub const CONTAINER_CLASS_ATTR: &str = "containerClass";

/// Node in a document tree - either Element or Text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Box<Element>),
    Text(Text),
}

impl Node {
    // Generates for each variant (element -> Element, etc.):
    //   - is_xxx(&self) -> bool
    //   - as_xxx(&self) -> Option<&Type>
    //   - as_xxx_mut(&mut self) -> Option<&mut Type>
    impl_enum_accessors!(element => Element(Element), text => Text(Text));

    /// Create a plain text node
    pub fn text(data: impl Into<String>) -> Self {
        Node::Text(Text::new(data))
    }

    /// Create a line-break marker node
    pub fn soft_break() -> Self {
        Node::Element(Box::new(Element::soft_break()))
    }

    /// Offset units occupied by this node
    #[inline]
    pub fn offset_size(&self) -> usize {
        match self {
            Node::Element(_) => 1,
            Node::Text(t) => t.len(),
        }
    }

    /// Check if this is a line-break marker
    #[inline]
    pub fn is_soft_break(&self) -> bool {
        self.as_element().is_some_and(Element::is_soft_break)
    }

    /// Check if this is a text run made only of whitespace
    #[inline]
    pub fn is_whitespace_text(&self) -> bool {
        self.as_text().is_some_and(Text::is_whitespace)
    }
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Node::Element(Box::new(elem))
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

/// Type alias for children collection.
pub type Children = SmallVec<[Node; 8]>;
