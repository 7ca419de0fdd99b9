//! Line-start locator
//!
//! Finds the position after the leading whitespace of every container line
//! touched by a selection. Results come in reverse document order, so a caller
//! can insert or remove at each position in turn without shifting the ones it
//! has not visited yet.

use crate::model::{Path, Position, Range, Selection};
use crate::node::{leading_whitespace, Document, Element, Node};

/// Line-start positions for a selection, last line first
///
/// A collapsed selection yields its anchor unchanged. Otherwise every text run
/// inside a container block that overlaps the first range contributes the
/// position right after the run's leading whitespace.
pub fn locate_line_starts(doc: &Document, selection: &Selection) -> Vec<Position> {
    if selection.is_collapsed() {
        return vec![selection.anchor().clone()];
    }
    let mut starts = Vec::new();
    collect_line_starts(&doc.root, &mut Path::new(), selection.first_range(), &mut starts);
    starts.reverse();
    starts
}

fn collect_line_starts(elem: &Element, path: &mut Path, range: &Range, out: &mut Vec<Position>) {
    let mut offset = 0;
    for child in &elem.children {
        let size = child.offset_size();
        match child {
            Node::Text(text) => {
                let overlaps =
                    Position::at(path, offset) < range.end && Position::at(path, offset + size) > range.start;
                if overlaps && elem.is_container_block() {
                    let indent = leading_whitespace(&text.data).chars().count();
                    out.push(Position::at(path, offset + indent));
                }
            }
            Node::Element(child_elem) => {
                let before = Position::at(path, offset);
                let after = Position::at(path, offset + 1);
                if before < range.end && after > range.start {
                    path.push(offset);
                    collect_line_starts(child_elem, path, range, out);
                    path.pop();
                }
            }
        }
        offset += size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::new_container;
    use crate::node::PARAGRAPH;

    fn doc() -> Document {
        Document::with_blocks([
            new_container("info")
                .text("  foo")
                .child(Element::soft_break())
                .text("bar")
                .child(Element::soft_break())
                .text("\tbaz"),
            Element::paragraph("  plain"),
        ])
    }

    #[test]
    fn test_collapsed_selection() {
        let anchor = Position::at(&[0], 7);
        let starts = locate_line_starts(&doc(), &Selection::collapsed(anchor.clone()));
        assert_eq!(starts, vec![anchor]);
    }

    #[test]
    fn test_reverse_document_order() {
        let selection = Selection::between(Position::at(&[0], 3), Position::at(&[0], 11));
        let starts = locate_line_starts(&doc(), &selection);
        assert_eq!(
            starts,
            vec![Position::at(&[0], 11), Position::at(&[0], 6), Position::at(&[0], 2)]
        );
    }

    #[test]
    fn test_lines_outside_range_are_skipped() {
        // Ends right after the first marker: the second line is not touched
        let selection = Selection::between(Position::at(&[0], 1), Position::at(&[0], 6));
        assert_eq!(locate_line_starts(&doc(), &selection), vec![Position::at(&[0], 2)]);
    }

    #[test]
    fn test_only_container_text() {
        let selection = Selection::between(Position::at(&[0], 0), Position::at(&[1], 4));
        let starts = locate_line_starts(&doc(), &selection);
        assert_eq!(starts.len(), 3);
        assert!(starts.iter().all(|p| p.parent_path() == [0]));

        let doc = Document::with_blocks([Element::new(PARAGRAPH).text("  x")]);
        let selection = Selection::between(Position::at(&[0], 0), Position::at(&[0], 3));
        assert!(locate_line_starts(&doc, &selection).is_empty());
    }
}
