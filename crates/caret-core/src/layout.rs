//! Text metrics: cell widths, tab stops and the column <-> visual x mapping.
//!
//! Vertical caret movement remembers a *visual* column so that moving through lines that mix
//! tabs, CJK wide characters and plain ASCII keeps the caret visually aligned. The occurrence
//! highlighter and the text views use the same functions to turn columns into pixels.

use unicode_width::UnicodeWidthChar;

/// Cell width of a single character (UAX #11). Control characters count as one cell.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Cell width of `ch` when it starts at `cell_offset_in_line`.
///
/// A `'\t'` advances to the next multiple of `tab_width`.
pub fn cell_width_at(ch: char, cell_offset_in_line: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        let rem = cell_offset_in_line % tab_width;
        tab_width - rem
    } else {
        char_width(ch)
    }
}

/// Total cell width of `s`, expanding tabs.
pub fn str_width_with_tab_width(s: &str, tab_width: usize) -> usize {
    let mut x = 0usize;
    for ch in s.chars() {
        x = x.saturating_add(cell_width_at(ch, x, tab_width));
    }
    x
}

/// Cell x offset of the char at `column` within `line`.
pub fn visual_x_for_column(line: &str, column: usize, tab_width: usize) -> usize {
    let mut x = 0usize;
    for ch in line.chars().take(column) {
        x = x.saturating_add(cell_width_at(ch, x, tab_width));
    }
    x
}

/// Char column whose cell range contains `x`, rounding to the nearest boundary.
///
/// Positions past the end of the line clamp to the line length.
pub fn column_for_visual_x(line: &str, x: usize, tab_width: usize) -> usize {
    let mut cell = 0usize;
    for (column, ch) in line.chars().enumerate() {
        let width = cell_width_at(ch, cell, tab_width);
        if x < cell + width {
            // Snap to whichever edge of the glyph is closer.
            return if x - cell > width / 2 { column + 1 } else { column };
        }
        cell += width;
    }
    line.chars().count()
}

/// Width in cells of the leading whitespace of `line`.
pub fn indent_width(line: &str, tab_width: usize) -> usize {
    str_width_with_tab_width(crate::text::leading_whitespace(line), tab_width)
}
