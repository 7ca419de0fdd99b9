//! Model → view conversion
//!
//! A [`Downcaster`] walks the model tree and asks its handler chain to convert
//! every node. A handler either emits finished view nodes
//! ([`Converted::Leaf`]) or a view subtree with a slot that receives the
//! converted model children ([`Converted::Wrapper`]).

use smallvec::SmallVec;

use crate::config::ContainerRegistry;
use crate::model::IMAGE_INLINE;
use crate::node::{Document, Element, Node, Text};
use crate::view::{ViewElement, ViewNode};

use super::{insert_by_priority, Flow, Pipeline, Priority};

// =============================================================================
// Events and results
// =============================================================================

/// One model node to convert
#[derive(Debug, Clone, Copy)]
pub enum DowncastEvent<'a> {
    /// An element and its parent
    Element { elem: &'a Element, parent: &'a Element },
    /// A text run and its parent
    Text { text: &'a Text, parent: &'a Element },
}

impl<'a> DowncastEvent<'a> {
    /// Parent of the converted node
    pub fn parent(&self) -> &'a Element {
        match *self {
            DowncastEvent::Element { parent, .. } | DowncastEvent::Text { parent, .. } => parent,
        }
    }

    /// The element, when the event is for an element named `name`
    pub fn element_named(&self, name: &str) -> Option<&'a Element> {
        match *self {
            DowncastEvent::Element { elem, .. } if elem.name == name => Some(elem),
            _ => None,
        }
    }
}

/// View output of a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Converted {
    /// Finished nodes; the model node's children are not visited
    Leaf(Vec<ViewNode>),
    /// A view subtree; the converted children go into the element at `slot`
    /// (child indices starting from `view`)
    Wrapper {
        view: ViewElement,
        slot: SmallVec<[usize; 2]>,
    },
}

impl Converted {
    /// Single finished node
    pub fn leaf(node: impl Into<ViewNode>) -> Self {
        Converted::Leaf(vec![node.into()])
    }

    /// Children go directly into `view`
    pub fn wrapper(view: ViewElement) -> Self {
        Converted::Wrapper {
            view,
            slot: SmallVec::new(),
        }
    }

    /// Children go into the descendant of `view` at `slot`
    pub fn nested(view: ViewElement, slot: impl IntoIterator<Item = usize>) -> Self {
        Converted::Wrapper {
            view,
            slot: slot.into_iter().collect(),
        }
    }
}

/// Read-only state shared by the handlers of one conversion
#[derive(Debug, Clone, Copy)]
pub struct DowncastContext<'a> {
    /// Container definitions and lookup tables
    pub registry: &'a ContainerRegistry,
    /// Pipeline being produced
    pub pipeline: Pipeline,
}

/// A model → view handler
pub trait DowncastHandler: Send + Sync {
    /// Convert one node or decline
    fn downcast(&self, event: &DowncastEvent<'_>, cx: &DowncastContext<'_>) -> Flow<Converted>;
}

impl<F> DowncastHandler for F
where
    F: Fn(&DowncastEvent<'_>, &DowncastContext<'_>) -> Flow<Converted> + Send + Sync,
{
    fn downcast(&self, event: &DowncastEvent<'_>, cx: &DowncastContext<'_>) -> Flow<Converted> {
        self(event, cx)
    }
}

// =============================================================================
// Downcaster
// =============================================================================

/// Ordered chain of downcast handlers for one pipeline
pub struct Downcaster {
    pipeline: Pipeline,
    handlers: Vec<(Priority, Box<dyn DowncastHandler>)>,
}

impl std::fmt::Debug for Downcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downcaster")
            .field("pipeline", &self.pipeline)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Downcaster {
    /// Downcaster with the generic handlers registered
    pub fn new(pipeline: Pipeline) -> Self {
        let mut downcaster = Self::empty(pipeline);
        downcaster.register(text_to_view, Priority::Normal);
        downcaster.register(paragraph_to_view, Priority::Normal);
        downcaster.register(soft_break_to_view, Priority::Normal);
        downcaster.register(image_to_view, Priority::Normal);
        downcaster.register(element_to_view, Priority::Low);
        downcaster
    }

    /// Downcaster without handlers
    pub fn empty(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            handlers: Vec::new(),
        }
    }

    /// Pipeline this downcaster produces
    pub fn pipeline(&self) -> Pipeline {
        self.pipeline
    }

    /// Add a handler; it runs after handlers registered earlier with the same priority
    pub fn register(&mut self, handler: impl DowncastHandler + 'static, priority: Priority) {
        insert_by_priority(&mut self.handlers, priority, Box::new(handler) as Box<dyn DowncastHandler>);
    }

    /// Convert the children of the document root
    pub fn convert_document(&self, doc: &Document, registry: &ContainerRegistry) -> Vec<ViewNode> {
        let cx = DowncastContext {
            registry,
            pipeline: self.pipeline,
        };
        self.convert_children(&doc.root, &cx)
    }

    /// Convert the children of `parent`, merging adjacent view text
    pub fn convert_children(&self, parent: &Element, cx: &DowncastContext<'_>) -> Vec<ViewNode> {
        let mut out = Vec::with_capacity(parent.children.len());
        for child in &parent.children {
            let event = match child {
                Node::Element(elem) => DowncastEvent::Element { elem, parent },
                Node::Text(text) => DowncastEvent::Text { text, parent },
            };
            for node in self.convert_node(&event, cx) {
                push_merged(&mut out, node);
            }
        }
        out
    }

    fn convert_node(&self, event: &DowncastEvent<'_>, cx: &DowncastContext<'_>) -> Vec<ViewNode> {
        for (_, handler) in &self.handlers {
            match handler.downcast(event, cx) {
                Flow::Handled(converted) => return self.materialize(converted, event, cx),
                Flow::Declined => continue,
                Flow::Aborted => return Vec::new(),
            }
        }
        tracing::trace!(target: "container_block::convert", "no downcast handler for node");
        Vec::new()
    }

    fn materialize(&self, converted: Converted, event: &DowncastEvent<'_>, cx: &DowncastContext<'_>) -> Vec<ViewNode> {
        match converted {
            Converted::Leaf(nodes) => nodes,
            Converted::Wrapper { mut view, slot } => {
                if let DowncastEvent::Element { elem, .. } = event {
                    let children = self.convert_children(elem, cx);
                    if let Some(target) = slot_mut(&mut view, &slot) {
                        for node in children {
                            target.push(node);
                        }
                    }
                }
                vec![ViewNode::from(view)]
            }
        }
    }
}

fn slot_mut<'v>(view: &'v mut ViewElement, slot: &[usize]) -> Option<&'v mut ViewElement> {
    let mut current = view;
    for &index in slot {
        current = current.children.get_mut(index)?.as_element_mut()?;
    }
    Some(current)
}

fn push_merged(out: &mut Vec<ViewNode>, node: ViewNode) {
    match (out.last_mut(), node) {
        (Some(ViewNode::Text(prev)), ViewNode::Text(text)) => prev.push_str(&text),
        (_, node) => out.push(node),
    }
}

// =============================================================================
// Generic handlers
// =============================================================================

/// Text run → text, wrapped in `<strong>`/`<i>` for formatting attributes
fn text_to_view(event: &DowncastEvent<'_>, _: &DowncastContext<'_>) -> Flow<Converted> {
    let DowncastEvent::Text { text, .. } = event else {
        return Flow::Declined;
    };
    let mut node = ViewNode::text(text.data.as_str());
    for (key, tag) in [("italic", "i"), ("bold", "strong")] {
        if text.attrs.iter().any(|(k, _)| k == key) {
            let mut wrapper = ViewElement::new(tag);
            wrapper.push(node);
            node = wrapper.into();
        }
    }
    Flow::Handled(Converted::Leaf(vec![node]))
}

/// `paragraph` → `<p>`
fn paragraph_to_view(event: &DowncastEvent<'_>, _: &DowncastContext<'_>) -> Flow<Converted> {
    match event.element_named(crate::node::PARAGRAPH) {
        Some(_) => Flow::Handled(Converted::wrapper(ViewElement::new("p"))),
        None => Flow::Declined,
    }
}

/// `softBreak` → `<br>`
fn soft_break_to_view(event: &DowncastEvent<'_>, _: &DowncastContext<'_>) -> Flow<Converted> {
    match event.element_named(crate::node::SOFT_BREAK) {
        Some(_) => Flow::Handled(Converted::leaf(ViewElement::new("br"))),
        None => Flow::Declined,
    }
}

/// `imageInline` → `<img src>`
fn image_to_view(event: &DowncastEvent<'_>, _: &DowncastContext<'_>) -> Flow<Converted> {
    let Some(elem) = event.element_named(IMAGE_INLINE) else {
        return Flow::Declined;
    };
    let mut img = ViewElement::new("img");
    if let Some(src) = elem.get_attr("src") {
        img = img.attr("src", src);
    }
    Flow::Handled(Converted::leaf(img))
}

/// Any other element → a view element with the same name
fn element_to_view(event: &DowncastEvent<'_>, _: &DowncastContext<'_>) -> Flow<Converted> {
    match event {
        DowncastEvent::Element { elem, .. } => Flow::Handled(Converted::wrapper(ViewElement::new(elem.name.as_str()))),
        DowncastEvent::Text { .. } => Flow::Declined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PARAGRAPH;
    use pretty_assertions::assert_eq;

    fn convert(downcaster: &Downcaster, doc: &Document) -> Vec<ViewNode> {
        downcaster.convert_document(doc, &ContainerRegistry::default())
    }

    #[test]
    fn test_generic_paragraphs() {
        let doc = Document::with_blocks([
            Element::new(PARAGRAPH).text("a").child(Element::soft_break()).text("b"),
            Element::new("heading").text("h"),
        ]);
        let view = convert(&Downcaster::new(Pipeline::Data), &doc);
        assert_eq!(
            view,
            vec![
                ViewNode::from(ViewElement::new("p").text("a").child(ViewElement::new("br")).text("b")),
                ViewNode::from(ViewElement::new("heading").text("h")),
            ]
        );
    }

    #[test]
    fn test_text_formatting() {
        let mut para = Element::new(PARAGRAPH).text("x");
        para.children[0]
            .as_text_mut()
            .unwrap()
            .attrs
            .push(("bold".into(), "true".into()));
        let doc = Document::with_blocks([para]);
        let view = convert(&Downcaster::new(Pipeline::Data), &doc);
        assert_eq!(
            view,
            vec![ViewNode::from(ViewElement::new("p").child(ViewElement::new("strong").text("x")))]
        );
    }

    #[test]
    fn test_handler_priority_and_abort() {
        let mut downcaster = Downcaster::new(Pipeline::Editing);
        fn drop_empty(event: &DowncastEvent<'_>, _: &DowncastContext<'_>) -> Flow<Converted> {
            match event.element_named(PARAGRAPH) {
                Some(p) if p.is_empty() => Flow::Aborted,
                _ => Flow::Declined,
            }
        }
        downcaster.register(drop_empty, Priority::High);
        let doc = Document::with_blocks([Element::new(PARAGRAPH), Element::paragraph("kept")]);
        let view = convert(&downcaster, &doc);
        assert_eq!(view, vec![ViewNode::from(ViewElement::new("p").text("kept"))]);
    }

    #[test]
    fn test_nested_slot() {
        let mut downcaster = Downcaster::new(Pipeline::Data);
        fn boxed(event: &DowncastEvent<'_>, _: &DowncastContext<'_>) -> Flow<Converted> {
            match event.element_named("box") {
                Some(_) => Flow::Handled(Converted::nested(
                    ViewElement::new("div").child(ViewElement::new("span")),
                    [0],
                )),
                None => Flow::Declined,
            }
        }
        downcaster.register(boxed, Priority::High);
        let doc = Document::with_blocks([Element::new("box").text("in")]);
        let view = convert(&downcaster, &doc);
        assert_eq!(
            view,
            vec![ViewNode::from(ViewElement::new("div").child(ViewElement::new("span").text("in")))]
        );
    }
}
