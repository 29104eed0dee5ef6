//! Backspace / delete, by char or by word.

use super::{CommandResult, DeleteMode, EditContext};
use crate::cursor::{Cursor, Position};
use crate::{text, word};

pub(super) fn delete(ctx: &mut EditContext<'_>, mode: DeleteMode) -> CommandResult {
    let cursor = ctx.doc.cursor();
    if cursor.has_selection() {
        let (start, end) = cursor.sorted();
        return remove(ctx, start, end);
    }

    let pos = cursor.focus;
    let len = ctx.doc.line_len(pos.line);
    let backward = matches!(mode, DeleteMode::PreviousChar | DeleteMode::PreviousWord);

    // Line merges.
    if backward && pos.column == 0 {
        if pos.line == 0 {
            return CommandResult::Cancelled;
        }
        let prev_end = Position::new(pos.line - 1, ctx.doc.line_len(pos.line - 1));
        return remove(ctx, prev_end, pos);
    }
    if !backward && pos.column >= len {
        if pos.line + 1 >= ctx.doc.num_lines() {
            return CommandResult::Cancelled;
        }
        return remove(ctx, pos, Position::new(pos.line + 1, 0));
    }

    let line = ctx.doc.line_text(pos.line);
    let (start, end) = match mode {
        DeleteMode::PreviousChar => (previous_char_start(ctx, &line, pos), pos),
        DeleteMode::NextChar => (
            pos,
            Position::new(pos.line, text::next_grapheme_boundary(&line, pos.column)),
        ),
        DeleteMode::PreviousWord => (
            Position::new(pos.line, word::prev_word_boundary(&line, pos.column, false)),
            pos,
        ),
        DeleteMode::NextWord => (
            pos,
            Position::new(pos.line, word::next_word_boundary(&line, pos.column, false)),
        ),
    };

    // An empty pair around the caret goes as a whole.
    if mode == DeleteMode::PreviousChar
        && let (Some(prev), Some(next)) = (
            text::char_at(&line, pos.column - 1),
            text::char_at(&line, pos.column),
        )
        && ctx.lang.config().closer_for(prev) == Some(next)
    {
        return remove(
            ctx,
            Position::new(pos.line, pos.column - 1),
            Position::new(pos.line, pos.column + 1),
        );
    }
    remove(ctx, start, end)
}

/// Start of the range removed by a backspace at `pos` (column > 0).
fn previous_char_start(ctx: &EditContext<'_>, line: &str, pos: Position) -> Position {
    let before = text::slice_chars(line, 0, pos.column);
    if before.chars().all(|c| c == ' ') {
        // Inside space indentation: back to the previous tab stop.
        let tab_width = ctx.doc.tab_width();
        let n = (pos.column - 1) % tab_width + 1;
        return Position::new(pos.line, pos.column - n);
    }
    Position::new(pos.line, text::prev_grapheme_boundary(line, pos.column))
}

fn remove(ctx: &mut EditContext<'_>, start: Position, end: Position) -> CommandResult {
    if start == end {
        return CommandResult::Cancelled;
    }
    ctx.begin("delete");
    let at = ctx.doc.replace(start, end, "");
    ctx.doc.set_cursor(Cursor::from_positions(at, at));
    ctx.finish()
}
