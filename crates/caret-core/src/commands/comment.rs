//! Line comment toggle.
//!
//! Commenting puts the token at a shared column: the smallest indent in the block, or the
//! line's own indent rounded down to the indent grid when that is deeper. Nested blocks
//! therefore keep their comment markers aligned with their code.

use super::indent::selected_lines;
use super::{CommandResult, EditContext};
use crate::cursor::{Cursor, Position};
use crate::layout::{cell_width_at, indent_width};
use crate::text;

pub(super) fn toggle_comment(ctx: &mut EditContext<'_>) -> CommandResult {
    let cursor = ctx.doc.cursor();
    let token = ctx.lang.comment_token().to_string();
    let prefix = ctx.lang.config().comment.line_prefix();
    let tab_width = ctx.doc.tab_width();

    let lines: Vec<(usize, String)> = selected_lines(cursor)
        .map(|i| (i, ctx.doc.line_text(i)))
        .filter(|(_, body)| !text::is_blank(body))
        .collect();
    if lines.is_empty() {
        return CommandResult::Cancelled;
    }

    let do_comment = lines
        .iter()
        .any(|(_, body)| !body.trim_start().starts_with(token.as_str()));
    let min_indent = lines
        .iter()
        .map(|(_, body)| indent_width(body, tab_width))
        .min()
        .unwrap_or(0);

    // (line, column, chars inserted (+) or removed (-))
    let mut edits: Vec<(usize, usize, isize)> = Vec::with_capacity(lines.len());
    for (line, body) in &lines {
        if do_comment {
            let width = indent_width(body, tab_width);
            let target = min_indent.max(width / tab_width * tab_width);
            let column = column_at_width(body, target, tab_width);
            edits.push((*line, column, text::char_len(&prefix) as isize));
        } else {
            let column = text::char_len(text::leading_whitespace(body));
            let rest = text::slice_chars(body, column, usize::MAX);
            let removed = if rest.starts_with(prefix.as_str()) {
                text::char_len(&prefix)
            } else {
                text::char_len(&token)
            };
            edits.push((*line, column, -(removed as isize)));
        }
    }

    ctx.begin("comment");
    for &(line, column, delta) in &edits {
        let at = Position::new(line, column);
        if delta > 0 {
            ctx.doc.insert_at(at, &prefix);
        } else {
            ctx.doc
                .replace(at, Position::new(line, column + delta.unsigned_abs()), "");
        }
    }

    let shift = |p: Position| {
        let Some(&(_, column, delta)) = edits.iter().find(|(line, _, _)| *line == p.line) else {
            return p;
        };
        if delta > 0 {
            // A caret at column 0 stays put so whole-line selections keep covering whole lines.
            if p.column > column || (p.column == column && column > 0) {
                return Position::new(p.line, p.column + delta as usize);
            }
            p
        } else if p.column > column {
            let removed = delta.unsigned_abs();
            Position::new(p.line, column.max(p.column.saturating_sub(removed)))
        } else {
            p
        }
    };
    ctx.doc
        .set_cursor(Cursor::from_positions(shift(cursor.anchor), shift(cursor.focus)));
    ctx.finish()
}

/// Char column where the leading whitespace of `body` reaches `width` cells.
fn column_at_width(body: &str, width: usize, tab_width: usize) -> usize {
    let mut x = 0;
    for (column, ch) in body.chars().enumerate() {
        if x >= width || !matches!(ch, ' ' | '\t') {
            return column;
        }
        x += cell_width_at(ch, x, tab_width);
    }
    text::char_len(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_at_width_walks_mixed_indent() {
        assert_eq!(column_at_width("        x", 4, 4), 4);
        assert_eq!(column_at_width("\t    x", 4, 4), 1);
        assert_eq!(column_at_width("\t    x", 8, 4), 5);
        assert_eq!(column_at_width("x", 0, 4), 0);
    }
}
