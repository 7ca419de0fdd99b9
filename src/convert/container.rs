//! Container block conversion handlers
//!
//! Model → view, both pipelines:
//!
//! ```text
//! containerBlock[containerClass=info]      <blockquote class="info">
//!   "foo" softBreak "bar"            →       <p>foo<br>bar</p>        (editing)
//!                                            <p>foo\nbar</p>          (data)
//!                                          </blockquote>
//! ```
//!
//! View → model reverses the data shape: a `<p>` inside a `<blockquote>`
//! becomes one container block, and newlines in its text become markers.

use crate::error::ModelResult;
use crate::container::{new_container, CONTAINER_BLOCK};
use crate::model::{ChildKind, Position, Writer};
use crate::node::{Element, Node, SOFT_BREAK};
use crate::view::{ViewElement, ViewNode};

use super::downcast::{Converted, DowncastContext, DowncastEvent, Downcaster};
use super::upcast::{UpcastContext, UpcastEvent, Upcaster};
use super::{Flow, Pipeline, Priority};

/// View attribute carrying the container label in the editing pipeline.
pub const LABEL_ATTR: &str = "data-label";

/// Register the container handlers on a downcaster
pub fn register_downcast(downcaster: &mut Downcaster) {
    downcaster.register(container_to_view, Priority::Normal);
    if downcaster.pipeline() == Pipeline::Data {
        downcaster.register(soft_break_to_newline, Priority::High);
    }
}

/// Register the container handlers on an upcaster
pub fn register_upcast(upcaster: &mut Upcaster) {
    upcaster.register(container_from_view, Priority::High);
    upcaster.register(line_surrogate_to_marker, Priority::High);
    upcaster.register(container_text_to_lines, Priority::High);
}

// =============================================================================
// Model → view
// =============================================================================

/// `containerBlock` → `<blockquote class><p>…</p></blockquote>`
fn container_to_view(event: &DowncastEvent<'_>, cx: &DowncastContext<'_>) -> Flow<Converted> {
    let Some(elem) = event.element_named(CONTAINER_BLOCK) else {
        return Flow::Declined;
    };
    let class = elem
        .container_class()
        .unwrap_or_else(|| cx.registry.default_definition().stored_class());
    let mut wrapper = ViewElement::new("blockquote").class(class);
    if cx.pipeline == Pipeline::Editing {
        wrapper = wrapper.attr(LABEL_ATTR, cx.registry.label_for_class(class));
    }
    Flow::Handled(Converted::nested(wrapper.child(ViewElement::new("p")), [0]))
}

/// `softBreak` inside a container → `"\n"` (data pipeline only)
fn soft_break_to_newline(event: &DowncastEvent<'_>, _: &DowncastContext<'_>) -> Flow<Converted> {
    match event.element_named(SOFT_BREAK) {
        Some(_) if event.parent().is_container_block() => Flow::Handled(Converted::leaf(ViewNode::text("\n"))),
        _ => Flow::Declined,
    }
}

// =============================================================================
// View → model
// =============================================================================

/// `<p>` wrapped in a `<blockquote>` → `containerBlock`
///
/// The class is resolved from the content node's classes, then the
/// wrapper's, falling back to the default container.
fn container_from_view(event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow> {
    let (Some(view), Some(wrapper)) = (event.element_tagged(&["p"]), event.parent()) else {
        return Ok(Flow::Declined);
    };
    if !wrapper.is("blockquote") {
        return Ok(Flow::Declined);
    }
    if cx.is_cursor_inside(Element::is_container_block) {
        tracing::debug!(target: "container_block::convert", "nested container ignored at {}", cx.cursor());
        return Ok(Flow::Declined);
    }
    if !cx.can_insert(ChildKind::Element(CONTAINER_BLOCK)) {
        tracing::debug!(target: "container_block::convert", "container not allowed at {}", cx.cursor());
        return Ok(Flow::Declined);
    }

    let class = {
        let source = if view.classes().next().is_some() { view } else { wrapper };
        let mut classes: Vec<&str> = source.classes().collect();
        if classes.is_empty() {
            classes.push("");
        }
        cx.registry().resolve_classes(classes).stored_class().to_owned()
    };
    let path = cx.insert_element(new_container(&class))?;
    cx.convert_children_into(view, &path)?;
    tracing::trace!(target: "container_block::convert", ?path, %class, "container ingested");
    Ok(Flow::HANDLED)
}

/// Empty `<p>` inside a container → line-break marker
fn line_surrogate_to_marker(event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow> {
    match event.element_tagged(&["p"]) {
        Some(view) if view.children.is_empty() && cx.is_cursor_inside(Element::is_container_block) => {
            if !cx.can_insert(ChildKind::Element(SOFT_BREAK)) {
                return Ok(Flow::Declined);
            }
            cx.insert_element(Element::soft_break())?;
            Ok(Flow::HANDLED)
        }
        _ => Ok(Flow::Declined),
    }
}

/// Text inside a container: every `"\n"` becomes a line-break marker
fn container_text_to_lines(event: &UpcastEvent<'_>, cx: &mut UpcastContext<'_, '_>) -> ModelResult<Flow> {
    let UpcastEvent::Text { text, .. } = *event else {
        return Ok(Flow::Declined);
    };
    if !cx.cursor_parent().is_some_and(Element::is_container_block) {
        return Ok(Flow::Declined);
    }
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            cx.insert_element(Element::soft_break())?;
        }
        cx.insert_text(line)?;
    }
    Ok(Flow::HANDLED)
}

// =============================================================================
// Raw text
// =============================================================================

/// Insert plain text at `pos`, one marker per newline
///
/// Returns the position after the inserted content.
pub fn insert_raw_text(writer: &mut Writer<'_>, pos: &Position, text: &str) -> ModelResult<Position> {
    let mut nodes = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            nodes.push(Node::soft_break());
        }
        if !line.is_empty() {
            nodes.push(Node::text(line));
        }
    }
    writer.insert(pos, nodes)
}

/// View fragment for plain text pasted into a container
///
/// Lines are separated by empty `<p>` surrogates, which upcast back into
/// line-break markers inside a container.
pub fn raw_text_to_view_fragment(text: &str) -> Vec<ViewNode> {
    let mut fragment = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            fragment.push(ViewElement::new("p").into());
        }
        if !line.is_empty() {
            fragment.push(ViewNode::text(line));
        }
    }
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContainerConfig, ContainerDefinition, ContainerRegistry};
    use crate::container::{register_schema, CONTAINER_CLASS_ATTR};
    use crate::model::{Model, Schema, Selection};
    use crate::node::{Document, PARAGRAPH};
    use crate::render::{render_fragment, RenderConfig};
    use pretty_assertions::assert_eq;

    fn downcaster(pipeline: Pipeline) -> Downcaster {
        let mut downcaster = Downcaster::new(pipeline);
        register_downcast(&mut downcaster);
        downcaster
    }

    fn model() -> Model {
        let mut schema = Schema::default();
        register_schema(&mut schema);
        Model::new(schema)
    }

    fn ingest(registry: &ContainerRegistry, fragment: &[ViewNode]) -> Document {
        let mut upcaster = Upcaster::new();
        register_upcast(&mut upcaster);
        let mut model = model();
        model
            .change(|w| upcaster.convert(w, registry, fragment, Position::new([0])))
            .unwrap();
        model.document().clone()
    }

    fn container_doc() -> Document {
        Document::with_blocks([new_container("info")
            .text("foo")
            .child(Element::soft_break())
            .text("bar")])
    }

    #[test]
    fn test_downcast_editing() {
        let registry = ContainerRegistry::new(ContainerConfig::with_containers([
            ContainerDefinition::new("info").with_label("Info")
        ]))
        .unwrap();
        let view = downcaster(Pipeline::Editing).convert_document(&container_doc(), &registry);
        assert_eq!(
            render_fragment(&view, &RenderConfig::COMPACT),
            "<blockquote class=\"info\" data-label=\"Info\"><p>foo<br>bar</p></blockquote>"
        );
    }

    #[test]
    fn test_downcast_data() {
        let registry = ContainerRegistry::default();
        let view = downcaster(Pipeline::Data).convert_document(&container_doc(), &registry);
        assert_eq!(
            render_fragment(&view, &RenderConfig::COMPACT),
            "<blockquote class=\"info\"><p>foo\nbar</p></blockquote>"
        );
    }

    #[test]
    fn test_data_keeps_breaks_outside_containers() {
        let doc = Document::with_blocks([Element::new(PARAGRAPH)
            .text("a")
            .child(Element::soft_break())
            .text("b")]);
        let view = downcaster(Pipeline::Data).convert_document(&doc, &ContainerRegistry::default());
        assert_eq!(render_fragment(&view, &RenderConfig::COMPACT), "<p>a<br>b</p>");
    }

    #[test]
    fn test_upcast_container() {
        let fragment = [ViewElement::new("blockquote")
            .class("warning")
            .child(ViewElement::new("p").text("one\ntwo"))
            .into()];
        let doc = ingest(&ContainerRegistry::default(), &fragment);
        assert_eq!(
            doc,
            Document::with_blocks([new_container("warning")
                .text("one")
                .child(Element::soft_break())
                .text("two")])
        );
    }

    #[test]
    fn test_upcast_class_resolution() {
        let registry = ContainerRegistry::default();

        let content_class = [ViewElement::new("blockquote")
            .class("warning")
            .child(ViewElement::new("p").class("unknown error").text("x"))
            .into()];
        let doc = ingest(&registry, &content_class);
        assert_eq!(doc.element_at(&[0]).unwrap().container_class(), Some("error"));

        let unmatched = [ViewElement::new("blockquote")
            .child(ViewElement::new("p").text("x"))
            .into()];
        let doc = ingest(&registry, &unmatched);
        assert_eq!(doc.element_at(&[0]).unwrap().container_class(), Some("success"));
    }

    #[test]
    fn test_empty_css_class_is_never_stored() {
        let registry = ContainerRegistry::new(ContainerConfig::with_containers([
            ContainerDefinition::new("plain").with_css_class("")
        ]))
        .unwrap();
        let fragment = [ViewElement::new("blockquote").child(ViewElement::new("p").text("x")).into()];
        let doc = ingest(&registry, &fragment);
        assert_eq!(doc.element_at(&[0]).and_then(Element::container_class), Some("plain"));

        let view = downcaster(Pipeline::Data).convert_document(&doc, &registry);
        assert_eq!(
            render_fragment(&view, &RenderConfig::COMPACT),
            "<blockquote class=\"plain\"><p>x</p></blockquote>"
        );
    }

    #[test]
    fn test_upcast_without_wrapper_is_a_paragraph() {
        let doc = ingest(
            &ContainerRegistry::default(),
            &[ViewElement::new("p").class("info").text("x").into()],
        );
        assert!(doc.element_at(&[0]).unwrap().is_paragraph());
    }

    #[test]
    fn test_upcast_refused_by_schema() {
        let mut model = Model::default();
        let fragment = [ViewElement::new("blockquote")
            .class("info")
            .child(ViewElement::new("p").text("x"))
            .into()];
        let mut upcaster = Upcaster::new();
        register_upcast(&mut upcaster);
        let registry = ContainerRegistry::default();
        model
            .change(|w| upcaster.convert(w, &registry, &fragment, Position::new([0])))
            .unwrap();
        let block = model.document().element_at(&[0]).unwrap();
        assert!(block.is_paragraph());
        assert!(!block.has_attr(CONTAINER_CLASS_ATTR));
    }

    #[test]
    fn test_no_nested_containers() {
        let mut model = model();
        model.load(Document::with_blocks([new_container("info").text("ab")]), Selection::default());
        let mut upcaster = Upcaster::new();
        register_upcast(&mut upcaster);
        let registry = ContainerRegistry::default();
        let fragment = [ViewElement::new("blockquote")
            .class("error")
            .child(ViewElement::new("p").text("x\ny"))
            .into()];
        model
            .change(|w| upcaster.convert(w, &registry, &fragment, Position::at(&[0], 1)))
            .unwrap();
        assert_eq!(
            model.document(),
            &Document::with_blocks([new_container("info")
                .text("ax")
                .child(Element::soft_break())
                .text("yb")])
        );
    }

    #[test]
    fn test_raw_text() {
        let fragment = raw_text_to_view_fragment("a\n\nb");
        assert_eq!(
            fragment,
            vec![
                ViewNode::text("a"),
                ViewElement::new("p").into(),
                ViewElement::new("p").into(),
                ViewNode::text("b"),
            ]
        );

        let mut model = model();
        model.load(Document::with_blocks([new_container("info")]), Selection::default());
        let end = model
            .change(|w| insert_raw_text(w, &Position::at(&[0], 0), "a\nb"))
            .unwrap();
        assert_eq!(end, Position::at(&[0], 3));
        assert_eq!(
            model.document(),
            &Document::with_blocks([new_container("info")
                .text("a")
                .child(Element::soft_break())
                .text("b")])
        );
    }
}
