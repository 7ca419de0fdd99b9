//! Line-break handling inside a container
//!
//! A line-break key pressed while the selection ends inside a container block
//! resolves to exactly one outcome, checked in this order:
//!
//! | Outcome | Condition | Effect |
//! |---------|-----------|--------|
//! | `LeaveStart` | cursor at the start, first line empty, not a soft break | empty paragraph before the container |
//! | `LeaveEnd` | cursor at the end after one or two blank lines | blank lines removed, paragraph after the container |
//! | `SplitLine` | anything else | marker inserted, indentation carried over |
//!
//! The trailing blank line check is a backward scan over at most four
//! siblings before the cursor.

use smallvec::SmallVec;

use crate::error::ModelResult;
use crate::model::{Position, Range, Selection, Writer};
use crate::node::{Document, Element, Node, Text, PARAGRAPH};

/// What a line-break key did inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryOutcome {
    /// Empty first line left the container above it
    LeaveStart,
    /// Trailing blank lines left the container below it
    LeaveEnd,
    /// A new line was started inside the container
    SplitLine,
}

// =============================================================================
// Backward scanner
// =============================================================================

/// Sibling kinds the scanner distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sibling {
    /// `softBreak`
    Marker,
    /// Text made only of whitespace
    Blank,
    Other,
}

impl Sibling {
    fn of(node: &Node) -> Self {
        if node.is_soft_break() {
            Sibling::Marker
        } else if node.is_whitespace_text() {
            Sibling::Blank
        } else {
            Sibling::Other
        }
    }
}

const SCAN_WINDOW: usize = 4;

/// Trailing blank line shapes, read backward from the cursor
const TRAILING_BLANK_LINES: [&[Sibling]; 3] = [
    &[Sibling::Marker, Sibling::Marker],
    &[Sibling::Blank, Sibling::Marker, Sibling::Marker],
    &[Sibling::Blank, Sibling::Marker, Sibling::Blank, Sibling::Marker],
];

type Window = SmallVec<[(Sibling, usize); SCAN_WINDOW]>;

/// Kinds and sizes of up to four siblings before `offset`, nearest first
fn scan_backward(parent: &Element, offset: usize) -> Window {
    match parent.slot_at(offset) {
        Some(slot) if slot.start == offset => parent.children[..slot.index]
            .iter()
            .rev()
            .take(SCAN_WINDOW)
            .map(|node| (Sibling::of(node), node.offset_size()))
            .collect(),
        _ => Window::new(),
    }
}

/// Offset units of the first matching trailing blank line shape
fn match_trailing_blank_lines(window: &Window) -> Option<usize> {
    TRAILING_BLANK_LINES.iter().find_map(|pattern| {
        let matches = window.len() >= pattern.len()
            && window.iter().zip(pattern.iter()).all(|((kind, _), expected)| kind == expected);
        matches.then(|| window[..pattern.len()].iter().map(|(_, size)| size).sum())
    })
}

// =============================================================================
// Decision
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    LeaveStart,
    /// Remove this many units before the cursor, then leave
    LeaveEnd(usize),
    SplitLine,
}

impl From<Decision> for BoundaryOutcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::LeaveStart => BoundaryOutcome::LeaveStart,
            Decision::LeaveEnd(_) => BoundaryOutcome::LeaveEnd,
            Decision::SplitLine => BoundaryOutcome::SplitLine,
        }
    }
}

fn decide(doc: &Document, selection: &Selection, soft: bool) -> Option<Decision> {
    let last = selection.last_position();
    let container = doc.parent_of(last).filter(|p| p.is_container_block())?;
    if !selection.is_collapsed() {
        return Some(Decision::SplitLine);
    }

    if !soft && doc.is_at_start(last) && doc.node_after(last).is_some_and(Node::is_soft_break) {
        return Some(Decision::LeaveStart);
    }
    if doc.is_at_end(last) {
        if let Some(len) = match_trailing_blank_lines(&scan_backward(container, last.offset())) {
            return Some(Decision::LeaveEnd(len));
        }
    }
    Some(Decision::SplitLine)
}

/// Outcome a line-break key would have, `None` outside a container
///
/// `soft` is a soft line break (Shift+Enter); it never leaves through the
/// start of a container.
pub fn decide_boundary(doc: &Document, selection: &Selection, soft: bool) -> Option<BoundaryOutcome> {
    decide(doc, selection, soft).map(BoundaryOutcome::from)
}

// =============================================================================
// Actions
// =============================================================================

/// Handle a line-break key at the current selection
///
/// Returns `None` without changes when the selection does not end inside a
/// container block.
pub fn handle_line_break(writer: &mut Writer<'_>, soft: bool) -> ModelResult<Option<BoundaryOutcome>> {
    let Some(decision) = decide(writer.document(), writer.selection(), soft) else {
        return Ok(None);
    };
    let cursor = writer.selection().last_position().clone();
    tracing::debug!(target: "container_block::boundary", ?decision, %cursor, "line break in container");

    match decision {
        Decision::LeaveStart => leave_start(writer, &cursor)?,
        Decision::LeaveEnd(len) => leave_end(writer, &cursor, len)?,
        Decision::SplitLine => split_line(writer, &cursor)?,
    }
    Ok(Some(decision.into()))
}

/// Split at the start, turn the empty first part into a paragraph and drop the marker
fn leave_start(writer: &mut Writer<'_>, cursor: &Position) -> ModelResult<()> {
    let between = writer.split_block()?;
    let left = cursor.parent_path();
    writer.rename(left, PARAGRAPH)?;
    writer.set_selection_in(left)?;
    writer.remove_disallowed_attributes(left)?;
    writer.remove_node(Position::at(between.node_path(), 0).path())?;
    Ok(())
}

/// Drop the trailing blank lines and split at the new end
fn leave_end(writer: &mut Writer<'_>, cursor: &Position, len: usize) -> ModelResult<()> {
    let start = cursor.with_offset(cursor.offset() - len);
    writer.remove(&Range::new(start, cursor.clone()))?;
    let between = writer.split_block()?;
    let right = between.node_path();
    writer.rename(right, PARAGRAPH)?;
    writer.remove_disallowed_attributes(right)
}

/// Insert a marker and repeat the indentation of the line being split
fn split_line(writer: &mut Writer<'_>, cursor: &Position) -> ModelResult<()> {
    let doc = writer.document();
    let indent = match doc.node_before(cursor) {
        Some(Node::Text(text)) => Some(text.leading_whitespace()),
        Some(_) => None,
        None => doc.text_at(cursor).map(Text::leading_whitespace),
    }
    .filter(|ws| !ws.is_empty())
    .map(str::to_owned);

    if !writer.insert_soft_break()? {
        return Ok(());
    }
    if let Some(indent) = indent {
        let anchor = writer.selection().anchor().clone();
        writer.insert_text(&anchor, &indent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{new_container, register_schema, CONTAINER_CLASS_ATTR};
    use crate::model::{Model, Schema};
    use pretty_assertions::assert_eq;

    fn model(blocks: impl IntoIterator<Item = Element>, selection: Selection) -> Model {
        let mut schema = Schema::default();
        register_schema(&mut schema);
        let mut model = Model::new(schema);
        model.load(Document::with_blocks(blocks), selection);
        model
    }

    fn press_enter(model: &mut Model, soft: bool) -> Option<BoundaryOutcome> {
        model.change(|w| handle_line_break(w, soft)).unwrap()
    }

    fn window(nodes: &[Node]) -> Window {
        let mut elem = new_container("info");
        elem.children.extend(nodes.iter().cloned());
        scan_backward(&elem, elem.max_offset())
    }

    #[test]
    fn test_trailing_blank_line_shapes() {
        let sb = Node::soft_break;
        assert_eq!(match_trailing_blank_lines(&window(&[Node::text("a"), sb(), sb()])), Some(2));
        assert_eq!(
            match_trailing_blank_lines(&window(&[Node::text("a"), sb(), sb(), Node::text("  ")])),
            Some(4)
        );
        assert_eq!(
            match_trailing_blank_lines(&window(&[sb(), Node::text(" "), sb(), Node::text("\t")])),
            Some(4)
        );
        assert_eq!(match_trailing_blank_lines(&window(&[Node::text("a"), sb()])), None);
        assert_eq!(match_trailing_blank_lines(&window(&[sb(), Node::text("x")])), None);
        assert_eq!(match_trailing_blank_lines(&window(&[])), None);
    }

    #[test]
    fn test_outside_container() {
        let mut m = model([Element::paragraph("a")], Selection::collapsed(Position::at(&[0], 1)));
        assert_eq!(press_enter(&mut m, false), None);
        assert_eq!(m.undo_depth(), 0);
    }

    #[test]
    fn test_leave_start() {
        let container = new_container("info").child(Element::soft_break()).text("text");
        let mut m = model([container], Selection::collapsed(Position::at(&[0], 0)));
        assert_eq!(press_enter(&mut m, false), Some(BoundaryOutcome::LeaveStart));
        assert_eq!(
            m.document(),
            &Document::with_blocks([Element::new(PARAGRAPH), new_container("info").text("text")])
        );
        assert_eq!(m.selection(), &Selection::collapsed(Position::at(&[0], 0)));
    }

    #[test]
    fn test_soft_break_at_start_splits() {
        let container = new_container("info").child(Element::soft_break()).text("text");
        let mut m = model([container], Selection::collapsed(Position::at(&[0], 0)));
        assert_eq!(press_enter(&mut m, true), Some(BoundaryOutcome::SplitLine));
        assert_eq!(m.document().element_at(&[0]).unwrap().child_count(), 3);
    }

    #[test]
    fn test_leave_end() {
        let container = new_container("info")
            .text("code")
            .child(Element::soft_break())
            .child(Element::soft_break());
        let mut m = model([container], Selection::collapsed(Position::at(&[0], 6)));
        assert_eq!(press_enter(&mut m, false), Some(BoundaryOutcome::LeaveEnd));
        assert_eq!(
            m.document(),
            &Document::with_blocks([new_container("info").text("code"), Element::new(PARAGRAPH)])
        );
        assert_eq!(m.selection(), &Selection::collapsed(Position::at(&[1], 0)));
        assert!(!m.document().element_at(&[1]).unwrap().has_attr(CONTAINER_CLASS_ATTR));
    }

    #[test]
    fn test_leave_end_whitespace_lines() {
        let container = new_container("info")
            .text("code")
            .child(Element::soft_break())
            .text("  ")
            .child(Element::soft_break())
            .text(" ");
        let end = container.max_offset();
        let mut m = model([container], Selection::collapsed(Position::at(&[0], end)));
        assert_eq!(press_enter(&mut m, false), Some(BoundaryOutcome::LeaveEnd));
        assert_eq!(
            m.document(),
            &Document::with_blocks([new_container("info").text("code"), Element::new(PARAGRAPH)])
        );
    }

    #[test]
    fn test_split_line_keeps_indentation() {
        let container = new_container("info").text("  foo bar");
        let mut m = model([container], Selection::collapsed(Position::at(&[0], 5)));
        assert_eq!(press_enter(&mut m, false), Some(BoundaryOutcome::SplitLine));
        assert_eq!(
            m.document(),
            &Document::with_blocks([new_container("info")
                .text("  foo")
                .child(Element::soft_break())
                .text("   bar")])
        );
        assert_eq!(m.selection(), &Selection::collapsed(Position::at(&[0], 8)));
    }

    #[test]
    fn test_split_line_replaces_selection() {
        let container = new_container("info").text("abcd");
        let mut m = model(
            [container],
            Selection::between(Position::at(&[0], 1), Position::at(&[0], 3)),
        );
        assert_eq!(
            decide_boundary(m.document(), m.selection(), false),
            Some(BoundaryOutcome::SplitLine)
        );
        press_enter(&mut m, false);
        assert_eq!(
            m.document(),
            &Document::with_blocks([new_container("info").text("a").child(Element::soft_break()).text("d")])
        );
    }

    #[test]
    fn test_single_trailing_break_splits() {
        let container = new_container("info").text("code").child(Element::soft_break());
        let mut m = model([container], Selection::collapsed(Position::at(&[0], 5)));
        assert_eq!(press_enter(&mut m, false), Some(BoundaryOutcome::SplitLine));
        assert_eq!(m.document().element_at(&[0]).unwrap().child_count(), 3);
    }
}
