//! Selection expansion: to the enclosing brackets, or over a dotted path.

use super::{CommandResult, EditContext};
use crate::bracket;
use crate::cursor::{Cursor, Position};
use caret_lang::is_path_separator;

/// Grow the selection to the contents of the innermost enclosing region, or to the region
/// itself when its contents are already selected.
pub(super) fn expand_to_brackets(ctx: &mut EditContext<'_>) -> CommandResult {
    let (start, end) = ctx.doc.cursor().sorted();
    let text = ctx.doc.text();
    *ctx.retained = None;

    for region in bracket::enclosing_regions(&text, start, end) {
        let target = if region.inner == (start, end) {
            region.outer
        } else {
            region.inner
        };
        if target != (start, end) {
            return ctx.move_cursor(Cursor::from_positions(target.0, target.1));
        }
    }
    CommandResult::Cancelled
}

/// Grow the selection left and right until a path separator. Periods do not separate.
pub(super) fn expand_to_path(ctx: &mut EditContext<'_>) -> CommandResult {
    let (start, end) = ctx.doc.cursor().sorted();
    *ctx.retained = None;

    let head: Vec<char> = ctx.doc.line_text(start.line).chars().collect();
    let mut from = start.column.min(head.len());
    while from > 0 && !is_path_separator(head[from - 1]) {
        from -= 1;
    }

    let tail: Vec<char> = ctx.doc.line_text(end.line).chars().collect();
    let mut to = end.column.min(tail.len());
    while to < tail.len() && !is_path_separator(tail[to]) {
        to += 1;
    }

    let (new_start, new_end) = (Position::new(start.line, from), Position::new(end.line, to));
    if (new_start, new_end) == (start, end) {
        return CommandResult::Cancelled;
    }
    ctx.move_cursor(Cursor::from_positions(new_start, new_end))
}
