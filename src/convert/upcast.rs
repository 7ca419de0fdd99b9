//! View → model conversion
//!
//! An [`Upcaster`] feeds view nodes through its handler chain. Handlers write
//! into the model through an [`UpcastContext`], which tracks the insertion
//! cursor and lets a handler convert the children of a view element into a
//! freshly inserted model element.

use crate::config::ContainerRegistry;
use crate::error::ModelResult;
use crate::model::{ChildKind, Path, Position, Range, Schema, Writer, IMAGE_INLINE};
use crate::node::{Document, Element, PARAGRAPH, SOFT_BREAK};
use crate::view::{ViewElement, ViewNode};

use super::{insert_by_priority, Flow, Priority};

// =============================================================================
// Events
// =============================================================================

/// One view node to convert
#[derive(Debug, Clone, Copy)]
pub enum UpcastEvent<'a> {
    /// A view element and its view parent (`None` at the top of a fragment)
    Element {
        elem: &'a ViewElement,
        parent: Option<&'a ViewElement>,
    },
    /// A view text node and its view parent
    Text {
        text: &'a str,
        parent: Option<&'a ViewElement>,
    },
}

impl<'a> UpcastEvent<'a> {
    /// View parent of the converted node
    pub fn parent(&self) -> Option<&'a ViewElement> {
        match *self {
            UpcastEvent::Element { parent, .. } | UpcastEvent::Text { parent, .. } => parent,
        }
    }

    /// The element, when the event is for one of `tags`
    pub fn element_tagged(&self, tags: &[&str]) -> Option<&'a ViewElement> {
        match *self {
            UpcastEvent::Element { elem, .. } if tags.iter().any(|t| elem.is(t)) => Some(elem),
            _ => None,
        }
    }
}

/// A view → model handler
pub trait UpcastHandler: Send + Sync {
    /// Convert one node into the model or decline
    fn upcast(&self, event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow>;
}

impl<F> UpcastHandler for F
where
    F: Fn(&UpcastEvent<'_>, &mut UpcastContext<'_, '_>) -> ModelResult<Flow> + Send + Sync,
{
    fn upcast(&self, event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow> {
        self(event, cx)
    }
}

type HandlerChain = [(Priority, Box<dyn UpcastHandler>)];

// =============================================================================
// UpcastContext
// =============================================================================

/// Conversion state: the writer, the insertion cursor and the handler chain
pub struct UpcastContext<'w, 'a> {
    writer: &'w mut Writer<'a>,
    registry: &'w ContainerRegistry,
    handlers: &'w HandlerChain,
    cursor: Position,
}

impl<'w, 'a> UpcastContext<'w, 'a> {
    /// Writer of the enclosing change
    pub fn writer(&mut self) -> &mut Writer<'a> {
        self.writer
    }

    /// Container definitions
    pub fn registry(&self) -> &ContainerRegistry {
        self.registry
    }

    /// Document as converted so far
    pub fn document(&self) -> &Document {
        self.writer.document()
    }

    /// Model schema
    pub fn schema(&self) -> &Schema {
        self.writer.schema()
    }

    /// Where the next converted node goes
    pub fn cursor(&self) -> &Position {
        &self.cursor
    }

    /// Move the insertion cursor
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos;
    }

    /// Element the cursor is in
    pub fn cursor_parent(&self) -> Option<&Element> {
        self.document().parent_of(&self.cursor)
    }

    /// Check whether the cursor is inside an element matching `predicate`
    pub fn is_cursor_inside<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Element) -> bool,
    {
        self.document().has_ancestor(self.cursor.parent_path(), predicate)
    }

    /// Check whether the schema allows `child` at the cursor
    pub fn can_insert(&self, child: ChildKind<'_>) -> bool {
        self.cursor_parent()
            .is_some_and(|parent| self.schema().check_child(&parent.name, child))
    }

    /// Insert text at the cursor and move the cursor past it
    pub fn insert_text(&mut self, text: &str) -> ModelResult<()> {
        self.cursor = self.writer.insert_text(&self.cursor, text)?;
        Ok(())
    }

    /// Insert an element at the cursor, move the cursor past it and return its path
    pub fn insert_element(&mut self, elem: Element) -> ModelResult<Path> {
        let path = Path::from_slice(self.cursor.path());
        self.cursor = self.writer.insert_element(&self.cursor, elem)?;
        Ok(path)
    }

    /// Convert one view node through the handler chain
    pub fn convert_node(&mut self, node: &ViewNode, parent: Option<&ViewElement>) -> ModelResult<Flow> {
        let event = match node {
            ViewNode::Element(elem) => UpcastEvent::Element { elem, parent },
            ViewNode::Text(text) => UpcastEvent::Text { text, parent },
        };
        let handlers = self.handlers;
        for (_, handler) in handlers {
            match handler.upcast(&event, self)? {
                Flow::Declined => continue,
                flow => return Ok(flow),
            }
        }
        tracing::trace!(target: "container_block::convert", "view node dropped: no upcast handler accepted it");
        Ok(Flow::Declined)
    }

    /// Convert the children of `view` at the cursor
    pub fn convert_children(&mut self, view: &ViewElement) -> ModelResult<()> {
        for child in &view.children {
            self.convert_node(child, Some(view))?;
        }
        Ok(())
    }

    /// Convert the children of `view` into the element at `path`, then
    /// restore the cursor
    pub fn convert_children_into(&mut self, view: &ViewElement, path: &[usize]) -> ModelResult<()> {
        let outer = std::mem::replace(&mut self.cursor, Position::at(path, 0));
        let result = self.convert_children(view);
        self.cursor = outer;
        result
    }
}

// =============================================================================
// Upcaster
// =============================================================================

/// Ordered chain of upcast handlers
pub struct Upcaster {
    handlers: Vec<(Priority, Box<dyn UpcastHandler>)>,
}

impl std::fmt::Debug for Upcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upcaster")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Default for Upcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Upcaster {
    /// Upcaster with the generic handlers registered
    pub fn new() -> Self {
        let mut upcaster = Self::empty();
        upcaster.register(text_to_model, Priority::Normal);
        upcaster.register(paragraph_to_model, Priority::Normal);
        upcaster.register(line_break_to_model, Priority::Normal);
        upcaster.register(image_to_model, Priority::Normal);
        upcaster.register(formatting_to_model, Priority::Normal);
        upcaster.register(flatten_unknown, Priority::Low);
        upcaster
    }

    /// Upcaster without handlers
    pub fn empty() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Add a handler; it runs after handlers registered earlier with the same priority
    pub fn register(&mut self, handler: impl UpcastHandler + 'static, priority: Priority) {
        insert_by_priority(&mut self.handlers, priority, Box::new(handler) as Box<dyn UpcastHandler>);
    }

    /// Convert a view fragment into the model at `at`, returning the cursor after it
    pub fn convert(
        &self,
        writer: &mut Writer<'_>,
        registry: &ContainerRegistry,
        fragment: &[ViewNode],
        at: Position,
    ) -> ModelResult<Position> {
        let mut cx = UpcastContext {
            writer,
            registry,
            handlers: &self.handlers,
            cursor: at,
        };
        for node in fragment {
            cx.convert_node(node, None)?;
        }
        Ok(cx.cursor)
    }
}

// =============================================================================
// Generic handlers
// =============================================================================

/// Text → text run; stray non-blank text at block level gets a paragraph
fn text_to_model(event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow> {
    let UpcastEvent::Text { text, .. } = *event else {
        return Ok(Flow::Declined);
    };
    if cx.can_insert(ChildKind::Text) {
        cx.insert_text(text)?;
        return Ok(Flow::HANDLED);
    }
    if text.trim().is_empty() || !cx.can_insert(ChildKind::Element(PARAGRAPH)) {
        return Ok(Flow::Declined);
    }
    let path = cx.insert_element(Element::paragraph(text))?;
    tracing::trace!(target: "container_block::convert", ?path, "auto-paragraph for block-level text");
    Ok(Flow::HANDLED)
}

/// `<p>` → `paragraph`, or its children inline where a paragraph cannot go
fn paragraph_to_model(event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow> {
    let Some(view) = event.element_tagged(&["p"]) else {
        return Ok(Flow::Declined);
    };
    if cx.can_insert(ChildKind::Element(PARAGRAPH)) {
        let path = cx.insert_element(Element::new(PARAGRAPH))?;
        cx.convert_children_into(view, &path)?;
    } else {
        cx.convert_children(view)?;
    }
    Ok(Flow::HANDLED)
}

/// `<br>` → `softBreak`
fn line_break_to_model(event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow> {
    if event.element_tagged(&["br"]).is_none() || !cx.can_insert(ChildKind::Element(SOFT_BREAK)) {
        return Ok(Flow::Declined);
    }
    cx.insert_element(Element::soft_break())?;
    Ok(Flow::HANDLED)
}

/// `<img>` → `imageInline`; dropped where the schema refuses it
fn image_to_model(event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow> {
    let Some(view) = event.element_tagged(&["img"]) else {
        return Ok(Flow::Declined);
    };
    if !cx.can_insert(ChildKind::Element(IMAGE_INLINE)) {
        tracing::debug!(target: "container_block::convert", "image refused at {}", cx.cursor());
        return Ok(Flow::Aborted);
    }
    let mut image = Element::new(IMAGE_INLINE);
    if let Some(src) = view.get_attr("src") {
        image.set_attr("src", src);
    }
    cx.insert_element(image)?;
    Ok(Flow::HANDLED)
}

/// `<strong>`/`<b>` → `bold`, `<i>`/`<em>` → `italic` on the converted text
fn formatting_to_model(event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow> {
    let Some(view) = event.element_tagged(&["strong", "b", "i", "em"]) else {
        return Ok(Flow::Declined);
    };
    let key = if view.is("strong") || view.is("b") { "bold" } else { "italic" };
    let start = cx.cursor().clone();
    cx.convert_children(view)?;
    let end = cx.cursor().clone();
    if start.has_same_parent_as(&end) && start != end {
        cx.writer().set_text_attribute(&Range::new(start, end), key, "true")?;
    }
    Ok(Flow::HANDLED)
}

/// Any other element: convert its children in place
fn flatten_unknown(event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow> {
    match *event {
        UpcastEvent::Element { elem, .. } => {
            cx.convert_children(elem)?;
            Ok(Flow::HANDLED)
        }
        UpcastEvent::Text { .. } => Ok(Flow::Declined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, Selection};
    use pretty_assertions::assert_eq;

    fn upcast(fragment: &[ViewNode]) -> Document {
        let mut model = Model::default();
        model.load(Document::default(), Selection::default());
        let registry = ContainerRegistry::default();
        model
            .change(|w| Upcaster::new().convert(w, &registry, fragment, Position::new([0])))
            .unwrap();
        model.document().clone()
    }

    #[test]
    fn test_paragraphs_and_breaks() {
        let doc = upcast(&[
            ViewElement::new("p").text("a").child(ViewElement::new("br")).text("b").into(),
            ViewElement::new("div").child(ViewElement::new("p").text("c")).into(),
        ]);
        assert_eq!(
            doc,
            Document::with_blocks([
                Element::new(PARAGRAPH).text("a").child(Element::soft_break()).text("b"),
                Element::paragraph("c"),
            ])
        );
    }

    #[test]
    fn test_block_level_text() {
        let doc = upcast(&[ViewNode::text("  \n"), ViewNode::text("loose")]);
        assert_eq!(doc, Document::with_blocks([Element::paragraph("loose")]));
    }

    #[test]
    fn test_formatting() {
        let doc = upcast(&[ViewElement::new("p")
            .text("a")
            .child(ViewElement::new("strong").text("b"))
            .into()]);
        let p = doc.element_at(&[0]).unwrap();
        assert_eq!(p.child_count(), 2);
        assert_eq!(p.text_content(), "ab");
    }

    #[test]
    fn test_image_aborted_at_block_level() {
        let doc = upcast(&[
            ViewElement::new("img").attr("src", "x.png").into(),
            ViewElement::new("p").child(ViewElement::new("img").attr("src", "y.png")).into(),
        ]);
        assert_eq!(doc.root.child_count(), 1);
        assert_eq!(doc.element_at(&[0, 0]).and_then(|img| img.get_attr("src")), Some("y.png"));
    }
}
