//! View trees
//!
//! The external tree shape produced by downcasting and consumed by upcasting.
//! View elements carry HTML tag names and attributes; the same type serves the
//! editing tree and the export tree.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::attr::{Attrs, AttrsExt, ClassNames, CLASS_ATTR};

/// View children collection.
pub type ViewChildren = SmallVec<[ViewNode; 4]>;

/// Node in a view tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode {
    Element(Box<ViewElement>),
    Text(String),
}

impl ViewNode {
    impl_enum_accessors!(element => Element(ViewElement), text => Text(String));

    /// Create a text node
    pub fn text(data: impl Into<String>) -> Self {
        ViewNode::Text(data.into())
    }
}

impl From<ViewElement> for ViewNode {
    fn from(elem: ViewElement) -> Self {
        ViewNode::Element(Box::new(elem))
    }
}

// =============================================================================
// ViewElement
// =============================================================================

/// View element with a tag, attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewElement {
    /// Tag name (`p`, `blockquote`, `br`, ...)
    pub tag: CompactString,
    /// HTML attributes
    pub attrs: Attrs,
    /// Child nodes
    pub children: ViewChildren,
}

impl ViewElement {
    /// Create an empty element
    pub fn new(tag: impl Into<CompactString>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: SmallVec::new(),
        }
    }

    /// Builder: set an attribute
    pub fn attr(mut self, name: impl Into<CompactString>, value: impl Into<CompactString>) -> Self {
        self.attrs.set_attr(name, value);
        self
    }

    /// Builder: set the `class` attribute
    pub fn class(self, class: impl Into<CompactString>) -> Self {
        self.attr(CLASS_ATTR, class)
    }

    /// Builder: append a child element
    pub fn child(mut self, elem: ViewElement) -> Self {
        self.children.push(ViewNode::from(elem));
        self
    }

    /// Builder: append text (merged with a preceding text node)
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.push_text(&text.into());
        self
    }

    /// Append text, merging with a preceding text node
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(ViewNode::Text(prev)) => prev.push_str(text),
            _ => self.children.push(ViewNode::text(text)),
        }
    }

    /// Append a node, merging text with a preceding text node
    pub fn push(&mut self, node: ViewNode) {
        match node {
            ViewNode::Text(text) => self.push_text(&text),
            elem => self.children.push(elem),
        }
    }

    /// Get attribute value by name
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_attr(name)
    }

    /// Names in the `class` attribute
    pub fn classes(&self) -> ClassNames<'_> {
        self.attrs.class_names()
    }

    /// Check whether the `class` attribute lists `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Check if element has the given tag
    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut buf = String::new();
        for child in &self.children {
            match child {
                ViewNode::Text(t) => buf.push_str(t),
                ViewNode::Element(e) => buf.push_str(&e.text_content()),
            }
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_merging() {
        let mut elem = ViewElement::new("p").text("foo");
        elem.push(ViewNode::text("\n"));
        elem.push_text("bar");
        elem.push_text("");
        assert_eq!(elem.children.len(), 1);
        assert_eq!(elem.text_content(), "foo\nbar");

        elem.push(ViewElement::new("br").into());
        elem.push_text("baz");
        assert_eq!(elem.children.len(), 3);
    }

    #[test]
    fn test_classes() {
        let elem = ViewElement::new("blockquote").class("note info");
        assert!(elem.is("blockquote"));
        assert!(elem.has_class("info"));
        assert!(!elem.has_class("warning"));
        assert_eq!(elem.classes().count(), 2);
    }
}
