//! Positions, ranges and selections
//!
//! A `Position` is an offset path from the root: every entry but the last is
//! the offset of an element inside its parent, the last entry is the offset
//! inside the position's parent element. Paths compare lexicographically, so
//! the derived ordering is document order.
//!
//! Positions are only meaningful for the tree they were computed against:
//! structural edits may shift or invalidate them.

use std::fmt;

use smallvec::SmallVec;

/// Offset path type used for positions and element addresses
pub type Path = SmallVec<[usize; 8]>;

// =============================================================================
// Position
// =============================================================================

/// A point in the document tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    path: Path,
}

impl Position {
    /// Create a position from a full offset path
    ///
    /// # Panics
    ///
    /// Panics on an empty path; a position always has an offset in some parent.
    pub fn new(path: impl IntoIterator<Item = usize>) -> Self {
        let path: Path = path.into_iter().collect();
        assert!(!path.is_empty(), "position path must not be empty");
        Self { path }
    }

    /// Position at `offset` inside the element addressed by `parent`
    pub fn at(parent: &[usize], offset: usize) -> Self {
        let mut path = Path::from_slice(parent);
        path.push(offset);
        Self { path }
    }

    /// Position directly before the element addressed by `elem`
    ///
    /// # Panics
    ///
    /// Panics when `elem` is the root path.
    pub fn before(elem: &[usize]) -> Self {
        Self::new(elem.iter().copied())
    }

    /// Position directly after the element addressed by `elem`
    pub fn after(elem: &[usize]) -> Self {
        Self::before(elem).shifted(1)
    }

    /// Full offset path
    #[inline]
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Path of the parent element
    #[inline]
    pub fn parent_path(&self) -> &[usize] {
        &self.path[..self.path.len() - 1]
    }

    /// Offset inside the parent element
    #[inline]
    pub fn offset(&self) -> usize {
        self.path[self.path.len() - 1]
    }

    /// Path of the element that starts at this position (same as the full path)
    #[inline]
    pub fn node_path(&self) -> &[usize] {
        &self.path
    }

    /// Same parent, different offset
    pub fn with_offset(&self, offset: usize) -> Self {
        let mut path = self.path.clone();
        let last = path.len() - 1;
        path[last] = offset;
        Self { path }
    }

    /// Same parent, offset moved by `delta` (saturating at zero)
    pub fn shifted(&self, delta: isize) -> Self {
        self.with_offset(self.offset().saturating_add_signed(delta))
    }

    /// Check whether two positions share a parent
    pub fn has_same_parent_as(&self, other: &Position) -> bool {
        self.parent_path() == other.parent_path()
    }

    /// Depth of the parent (0 for positions directly in the root)
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transformation by structural edits
    // ─────────────────────────────────────────────────────────────────────────

    fn is_under(&self, parent: &[usize]) -> bool {
        self.path.len() > parent.len() && self.path[..parent.len()] == *parent
    }

    /// Position after `len` units were inserted at `offset` in `parent`
    ///
    /// A position at the insertion point moves past the inserted content.
    pub fn transformed_by_insertion(&self, parent: &[usize], offset: usize, len: usize) -> Self {
        let mut pos = self.clone();
        if pos.is_under(parent) && pos.path[parent.len()] >= offset {
            pos.path[parent.len()] += len;
        }
        pos
    }

    /// Position after the units between `start` and `end` in `parent` were removed
    pub fn transformed_by_removal(&self, parent: &[usize], start: usize, end: usize) -> Self {
        if !self.is_under(parent) {
            return self.clone();
        }
        let depth = parent.len();
        let at = self.path[depth];
        if at >= end {
            let mut pos = self.clone();
            pos.path[depth] -= end - start;
            pos
        } else if at > start || (at == start && self.path.len() > depth + 1) {
            // Inside the removed content
            Self::at(parent, start)
        } else {
            self.clone()
        }
    }

    /// Position after the element at `elem` was split at `offset`
    ///
    /// Positions at or after the split point move into the new second part.
    pub fn transformed_by_split(&self, elem: &[usize], offset: usize) -> Self {
        let depth = elem.len();
        let Some((&index, grandparent)) = elem.split_last() else {
            return self.clone();
        };
        if self.is_under(elem) && self.path[depth] >= offset {
            let mut path = Path::from_slice(grandparent);
            path.push(index + 1);
            path.push(self.path[depth] - offset);
            path.extend_from_slice(&self.path[depth + 1..]);
            Self { path }
        } else if self.is_under(grandparent) && self.path[depth - 1] > index {
            let mut pos = self.clone();
            pos.path[depth - 1] += 1;
            pos
        } else {
            self.clone()
        }
    }

    /// Position after the element following `first` was merged into `first`
    /// (`first_len` is the offset size of `first` before the merge)
    pub fn transformed_by_merge(&self, first: &[usize], first_len: usize) -> Self {
        let depth = first.len();
        let Some((&index, grandparent)) = first.split_last() else {
            return self.clone();
        };
        if !self.is_under(grandparent) {
            return self.clone();
        }
        let at = self.path[depth - 1];
        if at == index + 1 {
            let mut path = Path::from_slice(first);
            match self.path.get(depth) {
                Some(&inner) => {
                    path.push(first_len + inner);
                    path.extend_from_slice(&self.path[depth + 1..]);
                }
                None => path.push(first_len),
            }
            Self { path }
        } else if at > index + 1 {
            let mut pos = self.clone();
            pos.path[depth - 1] -= 1;
            pos
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.path.as_slice())
    }
}

// =============================================================================
// Range
// =============================================================================

/// An ordered pair of positions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a range, ordering the two ends
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Collapsed range at a position
    pub fn collapsed(pos: Position) -> Self {
        Self {
            start: pos.clone(),
            end: pos,
        }
    }

    /// Range spanning exactly the element addressed by `elem`
    pub fn on(elem: &[usize]) -> Self {
        Self::new(Position::before(elem), Position::after(elem))
    }

    /// Check if start equals end
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Check if both ends share a parent
    #[inline]
    pub fn is_flat(&self) -> bool {
        self.start.has_same_parent_as(&self.end)
    }

    /// Check if a position lies within the range (ends included)
    pub fn contains(&self, pos: &Position) -> bool {
        &self.start <= pos && pos <= &self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// =============================================================================
// Selection
// =============================================================================

/// One or more ranges plus a direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    ranges: SmallVec<[Range; 1]>,
    backward: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self::collapsed(Position::new([0]))
    }
}

impl Selection {
    /// Cursor at a position
    pub fn collapsed(pos: Position) -> Self {
        Self::from_range(Range::collapsed(pos))
    }

    /// Forward selection over one range
    pub fn from_range(range: Range) -> Self {
        Self {
            ranges: SmallVec::from_buf([range]),
            backward: false,
        }
    }

    /// Selection from anchor to focus (backward when focus precedes anchor)
    pub fn between(anchor: Position, focus: Position) -> Self {
        let backward = focus < anchor;
        Self {
            ranges: SmallVec::from_buf([Range::new(anchor, focus)]),
            backward,
        }
    }

    /// Selection over several ranges (sorted into document order)
    ///
    /// Falls back to the default cursor when `ranges` is empty.
    pub fn from_ranges(ranges: impl IntoIterator<Item = Range>) -> Self {
        let mut ranges: SmallVec<[Range; 1]> = ranges.into_iter().collect();
        if ranges.is_empty() {
            return Self::default();
        }
        ranges.sort_by(|a, b| a.start.cmp(&b.start));
        Self { ranges, backward: false }
    }

    /// All ranges in document order
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// First range in document order
    pub fn first_range(&self) -> &Range {
        &self.ranges[0]
    }

    /// Last range in document order
    pub fn last_range(&self) -> &Range {
        &self.ranges[self.ranges.len() - 1]
    }

    /// Check if the selection is a single cursor point
    pub fn is_collapsed(&self) -> bool {
        self.ranges.len() == 1 && self.ranges[0].is_collapsed()
    }

    /// Check if the focus precedes the anchor
    pub fn is_backward(&self) -> bool {
        self.backward
    }

    /// Where the selection started
    pub fn anchor(&self) -> &Position {
        let range = if self.backward { self.last_range() } else { self.first_range() };
        if self.backward { &range.end } else { &range.start }
    }

    /// Where the selection ends (the moving end)
    pub fn focus(&self) -> &Position {
        let range = if self.backward { self.first_range() } else { self.last_range() };
        if self.backward { &range.start } else { &range.end }
    }

    /// First position in document order
    pub fn first_position(&self) -> &Position {
        &self.first_range().start
    }

    /// Last position in document order
    pub fn last_position(&self) -> &Position {
        &self.last_range().end
    }

    /// Map every range end through `f`, keeping the direction
    pub fn map_positions<F>(&mut self, mut f: F)
    where
        F: FnMut(&Position) -> Position,
    {
        for range in self.ranges.iter_mut() {
            *range = Range::new(f(&range.start), f(&range.end));
        }
    }
}
