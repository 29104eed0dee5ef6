//! Indent and unindent.

use super::{CommandResult, EditContext};
use crate::cursor::{Cursor, Position};
use crate::document::IndentType;
use crate::layout::visual_x_for_column;
use crate::text;
use std::ops::RangeInclusive;

/// Lines touched by a line-wise verb. A selection ending at column 0 of a later line does not
/// include that line.
pub(super) fn selected_lines(cursor: Cursor) -> RangeInclusive<usize> {
    let (start, end) = cursor.sorted();
    let last = if end.line > start.line && end.column == 0 {
        end.line - 1
    } else {
        end.line
    };
    start.line..=last
}

pub(super) fn indent(ctx: &mut EditContext<'_>) -> CommandResult {
    let cursor = ctx.doc.cursor();
    if cursor.is_single_line() {
        return indent_at_caret(ctx, cursor);
    }

    let lines = selected_lines(cursor);
    let unit = ctx.doc.indent_unit();
    let n = text::char_len(&unit);
    ctx.begin("indent");
    for line in lines.clone() {
        ctx.doc.insert_at(Position::new(line, 0), &unit);
    }
    let shift = |p: Position| {
        if lines.contains(&p.line) {
            Position::new(p.line, p.column + n)
        } else {
            p
        }
    };
    ctx.doc
        .set_cursor(Cursor::from_positions(shift(cursor.anchor), shift(cursor.focus)));
    ctx.finish()
}

/// Pad from the start of the selection to the next tab stop.
fn indent_at_caret(ctx: &mut EditContext<'_>, cursor: Cursor) -> CommandResult {
    let (start, _) = cursor.sorted();
    let tab_width = ctx.doc.tab_width();
    let pad = match ctx.doc.indent_type() {
        IndentType::Tabs => "\t".to_string(),
        IndentType::Spaces => {
            let x = visual_x_for_column(&ctx.doc.line_text(start.line), start.column, tab_width);
            " ".repeat(tab_width - x % tab_width)
        }
    };
    let n = text::char_len(&pad);
    ctx.begin("indent");
    ctx.doc.insert_at(start, &pad);
    let shift = |p: Position| Position::new(p.line, p.column + n);
    ctx.doc
        .set_cursor(Cursor::from_positions(shift(cursor.anchor), shift(cursor.focus)));
    ctx.finish()
}

pub(super) fn unindent(ctx: &mut EditContext<'_>) -> CommandResult {
    let cursor = ctx.doc.cursor();
    let tab_width = ctx.doc.tab_width();
    let removals: Vec<(usize, usize)> = selected_lines(cursor)
        .filter_map(|line| {
            let n = removable(&ctx.doc.line_text(line), tab_width);
            (n > 0).then_some((line, n))
        })
        .collect();
    if removals.is_empty() {
        return CommandResult::Cancelled;
    }

    ctx.begin("unindent");
    for &(line, n) in &removals {
        ctx.doc
            .replace(Position::new(line, 0), Position::new(line, n), "");
    }
    let shift = |p: Position| match removals.iter().find(|(line, _)| *line == p.line) {
        Some(&(_, n)) => Position::new(p.line, p.column.saturating_sub(n)),
        None => p,
    };
    ctx.doc
        .set_cursor(Cursor::from_positions(shift(cursor.anchor), shift(cursor.focus)));
    ctx.finish()
}

/// Chars one unindent removes from the start of `line`.
///
/// A leading tab goes on its own. Space indentation that is off the tab grid loses only the
/// remainder, so the line snaps back onto the grid.
fn removable(line: &str, tab_width: usize) -> usize {
    if line.starts_with('\t') {
        return 1;
    }
    let spaces = line.chars().take_while(|&c| c == ' ').count();
    match spaces % tab_width {
        0 => spaces.min(tab_width),
        rem => rem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removable_snaps_to_the_tab_grid() {
        assert_eq!(removable("        x", 4), 4);
        assert_eq!(removable("      x", 4), 2);
        assert_eq!(removable("  x", 4), 2);
        assert_eq!(removable("\t\tx", 4), 1);
        assert_eq!(removable("x", 4), 0);
    }

    #[test]
    fn trailing_column_zero_line_is_excluded() {
        assert_eq!(selected_lines(Cursor::new(0, 2, 2, 0)), 0..=1);
        assert_eq!(selected_lines(Cursor::new(2, 0, 0, 2)), 0..=1);
        assert_eq!(selected_lines(Cursor::new(1, 0, 1, 0)), 1..=1);
    }
}
