//! Positions and the four-index cursor.

use std::cmp::Ordering;

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A cursor made of a fixed *anchor* and a moving *focus*.
///
/// The anchor stays in place during drag selection while the focus follows the mouse; the caret
/// is drawn at the focus. When both ends are equal there is no selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    /// Stationary end of the selection.
    pub anchor: Position,
    /// Moving end of the selection (where the caret is drawn).
    pub focus: Position,
}

impl Cursor {
    /// Create a cursor from the four indices `(anchor_line, anchor_col, focus_line, focus_col)`.
    pub const fn new(al: usize, ac: usize, fl: usize, fc: usize) -> Self {
        Self {
            anchor: Position::new(al, ac),
            focus: Position::new(fl, fc),
        }
    }

    /// A caret with no selection.
    pub const fn caret(line: usize, column: usize) -> Self {
        Self::new(line, column, line, column)
    }

    /// Create a cursor from two positions.
    pub const fn from_positions(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// The two ends in reading order: `(top_left, bottom_right)`.
    pub fn sorted(&self) -> (Position, Position) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }

    /// Returns `true` iff the anchor is strictly after the focus.
    pub fn is_flipped(&self) -> bool {
        self.anchor > self.focus
    }

    /// Returns `true` if anchor and focus differ.
    pub fn has_selection(&self) -> bool {
        self.anchor != self.focus
    }

    /// Returns `true` if the selection lies on a single line.
    pub fn is_single_line(&self) -> bool {
        self.anchor.line == self.focus.line
    }

    /// The cursor as `(anchor_line, anchor_col, focus_line, focus_col)`.
    pub fn as_tuple(&self) -> (usize, usize, usize, usize) {
        (
            self.anchor.line,
            self.anchor.column,
            self.focus.line,
            self.focus.column,
        )
    }

    /// The same cursor with anchor and focus collapsed onto the focus.
    pub fn collapsed(&self) -> Self {
        Self::from_positions(self.focus, self.focus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_returns_reading_order() {
        let cursor = Cursor::new(3, 1, 1, 4);
        assert!(cursor.is_flipped());
        assert_eq!(cursor.sorted(), (Position::new(1, 4), Position::new(3, 1)));

        let forward = Cursor::new(1, 4, 3, 1);
        assert!(!forward.is_flipped());
        assert_eq!(forward.sorted(), cursor.sorted());
    }

    #[test]
    fn equal_ends_are_not_flipped() {
        let caret = Cursor::caret(2, 2);
        assert!(!caret.is_flipped());
        assert!(!caret.has_selection());
        assert_eq!(caret.as_tuple(), (2, 2, 2, 2));
    }
}
