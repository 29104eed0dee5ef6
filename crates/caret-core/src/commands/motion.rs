//! Caret movement with visual column retention, and click selections.

use super::{CommandResult, EditContext};
use crate::cursor::{Cursor, Position};
use crate::layout::{column_for_visual_x, visual_x_for_column};
use crate::text::{self, is_word_char};
use crate::word;

/// Direction and unit of a caret move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// One grapheme left.
    Left,
    /// One grapheme right.
    Right,
    /// One line up.
    Up,
    /// One line down.
    Down,
    /// To the previous word boundary.
    WordLeft,
    /// To the next word boundary.
    WordRight,
    /// Smart home: first non-blank char, then column 0.
    LineStart,
    /// End of line.
    LineEnd,
    /// Up by one view height.
    PageUp,
    /// Down by one view height.
    PageDown,
    /// Start of the document.
    DocumentStart,
    /// End of the document.
    DocumentEnd,
}

impl Motion {
    fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::PageUp | Self::PageDown)
    }
}

/// Visual x positions (in cells) recorded by the first vertical move of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetainedColumns {
    /// Visual x of the anchor.
    pub anchor_x: usize,
    /// Visual x of the focus.
    pub focus_x: usize,
}

const DEFAULT_PAGE_LINES: usize = 20;

pub(super) fn move_cursor(ctx: &mut EditContext<'_>, motion: Motion, select: bool) -> CommandResult {
    let cursor = ctx.doc.cursor();
    if motion.is_vertical() {
        return move_vertical(ctx, motion, select);
    }
    *ctx.retained = None;

    let (start, end) = cursor.sorted();
    let focus = match motion {
        // Without shift, a selection collapses to the side the caret moves towards.
        Motion::Left if !select && cursor.has_selection() => start,
        Motion::Right if !select && cursor.has_selection() => end,
        Motion::Left => step_left(ctx, cursor.focus),
        Motion::Right => step_right(ctx, cursor.focus),
        Motion::WordLeft => word_left(ctx, cursor.focus),
        Motion::WordRight => word_right(ctx, cursor.focus),
        Motion::LineStart => {
            let line = ctx.doc.line_text(cursor.focus.line);
            let first = text::char_len(text::leading_whitespace(&line));
            let column = if cursor.focus.column == first { 0 } else { first };
            Position::new(cursor.focus.line, column)
        }
        Motion::LineEnd => Position::new(cursor.focus.line, ctx.doc.line_len(cursor.focus.line)),
        Motion::DocumentStart => Position::new(0, 0),
        Motion::DocumentEnd => {
            let last = ctx.doc.num_lines() - 1;
            Position::new(last, ctx.doc.line_len(last))
        }
        Motion::Up | Motion::Down | Motion::PageUp | Motion::PageDown => cursor.focus,
    };
    let anchor = if select { cursor.anchor } else { focus };
    ctx.move_cursor(Cursor::from_positions(anchor, focus))
}

fn step_left(ctx: &EditContext<'_>, pos: Position) -> Position {
    if pos.column == 0 {
        if pos.line == 0 {
            return pos;
        }
        return Position::new(pos.line - 1, ctx.doc.line_len(pos.line - 1));
    }
    let line = ctx.doc.line_text(pos.line);
    Position::new(pos.line, text::prev_grapheme_boundary(&line, pos.column))
}

fn step_right(ctx: &EditContext<'_>, pos: Position) -> Position {
    let len = ctx.doc.line_len(pos.line);
    if pos.column >= len {
        if pos.line + 1 >= ctx.doc.num_lines() {
            return pos;
        }
        return Position::new(pos.line + 1, 0);
    }
    let line = ctx.doc.line_text(pos.line);
    Position::new(pos.line, text::next_grapheme_boundary(&line, pos.column))
}

fn word_left(ctx: &EditContext<'_>, pos: Position) -> Position {
    if pos.column == 0 {
        return step_left(ctx, pos);
    }
    let line = ctx.doc.line_text(pos.line);
    Position::new(pos.line, word::prev_word_boundary(&line, pos.column, true))
}

fn word_right(ctx: &EditContext<'_>, pos: Position) -> Position {
    if pos.column >= ctx.doc.line_len(pos.line) {
        return step_right(ctx, pos);
    }
    let line = ctx.doc.line_text(pos.line);
    Position::new(pos.line, word::next_word_boundary(&line, pos.column, true))
}

fn move_vertical(ctx: &mut EditContext<'_>, motion: Motion, select: bool) -> CommandResult {
    let cursor = ctx.doc.cursor();
    let tab_width = ctx.doc.tab_width();
    let retained = match *ctx.retained {
        Some(retained) => retained,
        None => {
            let x_of = |p: Position| visual_x_for_column(&ctx.doc.line_text(p.line), p.column, tab_width);
            let retained = RetainedColumns {
                anchor_x: x_of(cursor.anchor),
                focus_x: x_of(cursor.focus),
            };
            *ctx.retained = Some(retained);
            retained
        }
    };

    let page = match ctx.view.as_ref() {
        Some((scroll, vp)) => (scroll.visible_lines(*vp).floor() as usize).max(1),
        None => DEFAULT_PAGE_LINES,
    };
    let last = ctx.doc.num_lines() - 1;
    let line = cursor.focus.line;
    let focus = match motion {
        Motion::Up if line == 0 => Position::new(0, 0),
        Motion::Down if line == last => Position::new(last, ctx.doc.line_len(last)),
        _ => {
            let target = match motion {
                Motion::Up => line - 1,
                Motion::Down => line + 1,
                Motion::PageUp => line.saturating_sub(page),
                _ => (line + page).min(last),
            };
            let text = ctx.doc.line_text(target);
            Position::new(target, column_for_visual_x(&text, retained.focus_x, tab_width))
        }
    };
    let anchor = if select { cursor.anchor } else { focus };
    ctx.move_cursor(Cursor::from_positions(anchor, focus))
}

/// Select the identifier at `at`, or the single character there.
pub(super) fn select_word(ctx: &mut EditContext<'_>, at: Position) -> CommandResult {
    *ctx.retained = None;
    let at = ctx.doc.clamp(at);
    let chars: Vec<char> = ctx.doc.line_text(at.line).chars().collect();
    let on_word = |c: usize| chars.get(c).copied().is_some_and(is_word_char);
    let probe = if on_word(at.column) {
        Some(at.column)
    } else if at.column > 0 && on_word(at.column - 1) {
        Some(at.column - 1)
    } else {
        None
    };
    let (start, end) = match probe {
        Some(c) => {
            let mut start = c;
            while start > 0 && on_word(start - 1) {
                start -= 1;
            }
            let mut end = c;
            while on_word(end) {
                end += 1;
            }
            (start, end)
        }
        None if at.column < chars.len() => (at.column, at.column + 1),
        None => (at.column, at.column),
    };
    ctx.move_cursor(Cursor::new(at.line, start, at.line, end))
}

/// Select a whole line including its newline (up to end of text on the last line).
pub(super) fn select_line(ctx: &mut EditContext<'_>, line: usize) -> CommandResult {
    *ctx.retained = None;
    let last = ctx.doc.num_lines() - 1;
    let line = line.min(last);
    let end = if line < last {
        Position::new(line + 1, 0)
    } else {
        Position::new(line, ctx.doc.line_len(line))
    };
    ctx.move_cursor(Cursor::from_positions(Position::new(line, 0), end))
}
