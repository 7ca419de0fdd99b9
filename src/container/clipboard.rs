//! Clipboard integration
//!
//! Plain text pasted into a container keeps its lines: it goes through the
//! raw text view fragment, whose line surrogates upcast into markers. Copying
//! several lines of a container yields a container again, so pasting them
//! elsewhere does not flatten the lines into one paragraph.

use crate::config::ContainerRegistry;
use crate::convert::{raw_text_to_view_fragment, Upcaster};
use crate::error::ModelResult;
use crate::model::{Selection, Writer};
use crate::node::{Children, Document, Element, Node};

use super::container_of;

/// Paste plain text at the selection when its anchor is inside a container
///
/// Returns `false` without changes otherwise.
pub fn paste_plain_text(
    writer: &mut Writer<'_>,
    upcaster: &Upcaster,
    registry: &ContainerRegistry,
    text: &str,
) -> ModelResult<bool> {
    if container_of(writer.document(), writer.selection().anchor()).is_none() {
        return Ok(false);
    }
    writer.delete_content()?;
    let at = writer.selection().first_position().clone();
    let fragment = raw_text_to_view_fragment(text);
    let end = upcaster.convert(writer, registry, &fragment, at)?;
    tracing::debug!(target: "container_block::clipboard", lines = text.lines().count(), "pasted into container");
    writer.set_selection_at(end);
    Ok(true)
}

/// Copy of the selected content
///
/// When the selection lies inside one container and covers more than one
/// node, or the whole container, the copy is wrapped in a container with the
/// same attributes.
pub fn selected_content(doc: &Document, selection: &Selection) -> Vec<Node> {
    let range = selection.first_range();
    let (start, end) = (range.start.path(), range.end.path());
    let common = start[..start.len() - 1]
        .iter()
        .zip(&end[..end.len() - 1])
        .take_while(|(a, b)| a == b)
        .count();
    let content = match doc.element_at(&start[..common]) {
        Some(ancestor) => extract(ancestor, Some(&start[common..]), Some(&end[common..])),
        None => Children::new(),
    };

    let (anchor, focus) = (selection.anchor(), selection.focus());
    let container = doc
        .parent_of(anchor)
        .filter(|parent| parent.is_container_block() && anchor.has_same_parent_as(focus));
    match container {
        Some(parent) if !selection.is_collapsed() => {
            let whole = range.start.offset() == 0 && range.end.offset() == parent.max_offset();
            if content.len() > 1 || whole {
                let mut wrapper = Element::new(parent.name.clone());
                wrapper.attrs = parent.attrs.clone();
                wrapper.children = content;
                return vec![Node::from(wrapper)];
            }
            content.into_vec()
        }
        _ => content.into_vec(),
    }
}

/// Clone the part of `elem` between two relative paths (`None` is unbounded)
fn extract(elem: &Element, start: Option<&[usize]>, end: Option<&[usize]>) -> Children {
    let deep_start = start.filter(|s| s.len() > 1);
    let deep_end = end.filter(|e| e.len() > 1);
    // Offsets of whole nodes to keep; a deep bound's own element is handled separately
    let lo = start.map_or(0, |s| if s.len() > 1 { s[0] + 1 } else { s[0] });
    let hi = end.map_or(usize::MAX, |e| e[0]);

    let mut out = Children::new();
    let mut offset = 0;
    for child in &elem.children {
        let size = child.offset_size();
        match child {
            Node::Text(text) => {
                let from = lo.max(offset);
                let to = hi.min(offset + size);
                if from < to {
                    let mut part = text.clone();
                    let mut tail = part.split_off(from - offset);
                    tail.split_off(to - from);
                    out.push(Node::Text(tail));
                }
            }
            Node::Element(child_elem) => {
                let inner_start = deep_start.filter(|s| s[0] == offset).map(|s| &s[1..]);
                let inner_end = deep_end.filter(|e| e[0] == offset).map(|e| &e[1..]);
                if inner_start.is_some() || inner_end.is_some() {
                    let mut partial = Element::new(child_elem.name.clone());
                    partial.attrs = child_elem.attrs.clone();
                    partial.children = extract(child_elem, inner_start, inner_end);
                    out.push(Node::from(partial));
                } else if offset >= lo && offset < hi {
                    out.push(child.clone());
                }
            }
        }
        offset += size;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{new_container, register_schema};
    use crate::convert::container::register_upcast;
    use crate::model::{Model, Position, Schema};
    use crate::node::PARAGRAPH;
    use pretty_assertions::assert_eq;

    fn doc() -> Document {
        Document::with_blocks([
            Element::paragraph("intro"),
            new_container("info")
                .text("foo")
                .child(Element::soft_break())
                .text("bar"),
        ])
    }

    #[test]
    fn test_copy_single_line_part() {
        let selection = Selection::between(Position::at(&[1], 1), Position::at(&[1], 3));
        assert_eq!(selected_content(&doc(), &selection), vec![Node::text("oo")]);
    }

    #[test]
    fn test_copy_lines_keeps_container() {
        let selection = Selection::between(Position::at(&[1], 5), Position::at(&[1], 1));
        assert_eq!(
            selected_content(&doc(), &selection),
            vec![Node::from(new_container("info").text("oo").child(Element::soft_break()).text("b"))]
        );

        // A single whole-container line is wrapped as well
        let doc = Document::with_blocks([new_container("warning").text("only")]);
        let selection = Selection::between(Position::at(&[0], 0), Position::at(&[0], 4));
        assert_eq!(
            selected_content(&doc, &selection),
            vec![Node::from(new_container("warning").text("only"))]
        );
    }

    #[test]
    fn test_copy_across_blocks() {
        let selection = Selection::between(Position::at(&[0], 2), Position::at(&[1], 2));
        assert_eq!(
            selected_content(&doc(), &selection),
            vec![
                Node::from(Element::new(PARAGRAPH).text("tro")),
                Node::from(new_container("info").text("fo")),
            ]
        );
    }

    #[test]
    fn test_paste_into_container() {
        let mut schema = Schema::default();
        register_schema(&mut schema);
        let mut model = Model::new(schema);
        model.load(doc(), Selection::collapsed(Position::at(&[1], 3)));
        let mut upcaster = Upcaster::new();
        register_upcast(&mut upcaster);
        let registry = ContainerRegistry::default();

        let pasted = model
            .change(|w| paste_plain_text(w, &upcaster, &registry, "x\n\ny"))
            .unwrap();
        assert!(pasted);
        assert_eq!(
            model.document().element_at(&[1]).unwrap(),
            &new_container("info")
                .text("foox")
                .child(Element::soft_break())
                .child(Element::soft_break())
                .text("y")
                .child(Element::soft_break())
                .text("bar")
        );
        assert_eq!(model.selection(), &Selection::collapsed(Position::at(&[1], 7)));

        model.load(doc(), Selection::collapsed(Position::at(&[0], 1)));
        let pasted = model
            .change(|w| paste_plain_text(w, &upcaster, &registry, "x"))
            .unwrap();
        assert!(!pasted);
        assert_eq!(model.document(), &doc());
    }
}
