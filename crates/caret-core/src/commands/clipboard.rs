//! Copy, cut and paste.
//!
//! The clipboard is written before the document changes, so a failing backend leaves the
//! document and its history as they were.

use super::{CommandError, CommandResult, EditContext};
use crate::cursor::{Cursor, Position};

/// The selection, or the caret line plus newline when line fallback is on.
fn copy_target(ctx: &EditContext<'_>) -> Option<String> {
    let cursor = ctx.doc.cursor();
    if cursor.has_selection() {
        return Some(ctx.doc.selected_text());
    }
    if !ctx.prefs.copy_line_fallback {
        return None;
    }
    Some(format!("{}\n", ctx.doc.line_text(cursor.focus.line)))
}

pub(super) fn copy(ctx: &mut EditContext<'_>) -> Result<CommandResult, CommandError> {
    let Some(text) = copy_target(ctx) else {
        return Ok(CommandResult::Cancelled);
    };
    ctx.clipboard.set(&text)?;
    Ok(CommandResult::Text(text))
}

pub(super) fn cut(ctx: &mut EditContext<'_>) -> Result<CommandResult, CommandError> {
    let Some(text) = copy_target(ctx) else {
        return Ok(CommandResult::Cancelled);
    };
    ctx.clipboard.set(&text)?;

    let cursor = ctx.doc.cursor();
    if cursor.has_selection() {
        ctx.begin("cut");
        ctx.doc.write("");
        ctx.finish();
        return Ok(CommandResult::Text(text));
    }

    // Whole line: the caret lands at column 0 of the following line, or at the end of the
    // previous line when the last line goes.
    let line = cursor.focus.line;
    let last = ctx.doc.num_lines() - 1;
    let (start, end, caret) = if line < last {
        (Position::new(line, 0), Position::new(line + 1, 0), Position::new(line, 0))
    } else if line > 0 {
        let prev_end = Position::new(line - 1, ctx.doc.line_len(line - 1));
        (prev_end, Position::new(line, ctx.doc.line_len(line)), prev_end)
    } else {
        (Position::new(0, 0), Position::new(0, ctx.doc.line_len(0)), Position::new(0, 0))
    };
    if start != end {
        ctx.begin("cut");
        ctx.doc.replace(start, end, "");
        ctx.doc.set_cursor(Cursor::from_positions(caret, caret));
        ctx.finish();
    }
    Ok(CommandResult::Text(text))
}

pub(super) fn paste(ctx: &mut EditContext<'_>) -> Result<CommandResult, CommandError> {
    let text = ctx.clipboard.get()?;
    if text.is_empty() {
        return Ok(CommandResult::Cancelled);
    }

    let cursor = ctx.doc.cursor();
    ctx.begin("paste");
    if !cursor.has_selection() && text.ends_with('\n') {
        // A copied line goes in above the caret line; the caret keeps its column.
        let caret = cursor.focus;
        let added = text.matches('\n').count();
        ctx.doc.insert_at(Position::new(caret.line, 0), &text);
        let caret = Position::new(caret.line + added, caret.column);
        ctx.doc.set_cursor(Cursor::from_positions(caret, caret));
    } else {
        ctx.doc.write(&text);
    }
    Ok(ctx.finish())
}
