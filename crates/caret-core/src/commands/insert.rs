//! Typing: auto-close pairs, surround, quote and bracket skip-over.

use super::{CommandResult, EditContext};
use crate::bracket;
use crate::cursor::{Cursor, Position};
use crate::document::LITERAL_FORMAT;
use crate::text::is_word_char;

/// Replace the selection with `text` verbatim as one undo step.
pub(super) fn write(ctx: &mut EditContext<'_>, text: &str) -> CommandResult {
    if text.is_empty() && !ctx.doc.cursor().has_selection() {
        return CommandResult::Cancelled;
    }
    ctx.begin("write");
    ctx.doc.write(text);
    ctx.finish()
}

/// Typed text. Single characters get the smart pair behavior.
pub(super) fn insert(ctx: &mut EditContext<'_>, text: &str) -> CommandResult {
    let mut chars = text.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return write(ctx, text);
    };
    let lang = ctx.lang;
    let lang = lang.config();
    let cursor = ctx.doc.cursor();

    if cursor.has_selection() {
        if let Some(closer) = lang.closer_for(ch)
            && (lang.is_quote(ch) || lang.is_opener(ch))
        {
            return surround(ctx, ch, closer);
        }
        return typed(ctx, ch);
    }

    let pos = cursor.focus;
    let next = ctx.doc.char_at(pos);
    if lang.is_quote(ch) {
        return insert_quote(ctx, ch, pos, next);
    }
    if lang.is_opener(ch) {
        let free = match next {
            None => true,
            Some(n) => n.is_whitespace() || lang.is_closer(n),
        };
        if free && let Some(closer) = lang.closer_for(ch) {
            return insert_pair(ctx, ch, closer);
        }
        return typed(ctx, ch);
    }
    if lang.is_closer(ch) && next == Some(ch) {
        return advance(ctx, pos);
    }
    typed(ctx, ch)
}

fn typed(ctx: &mut EditContext<'_>, ch: char) -> CommandResult {
    ctx.begin_typed("insert", ch);
    ctx.doc.write(ch.encode_utf8(&mut [0; 4]));
    ctx.finish()
}

/// Step over the character at `pos` without editing.
fn advance(ctx: &mut EditContext<'_>, pos: Position) -> CommandResult {
    *ctx.retained = None;
    let next = Position::new(pos.line, pos.column + 1);
    ctx.move_cursor(Cursor::from_positions(next, next))
}

fn insert_pair(ctx: &mut EditContext<'_>, open: char, close: char) -> CommandResult {
    ctx.begin_typed("insert", open);
    ctx.doc.write(open.encode_utf8(&mut [0; 4]));
    let caret = ctx.caret();
    ctx.doc.insert_at(caret, close.encode_utf8(&mut [0; 4]));
    ctx.doc.set_cursor(Cursor::from_positions(caret, caret));
    ctx.finish()
}

fn insert_quote(ctx: &mut EditContext<'_>, q: char, pos: Position, next: Option<char>) -> CommandResult {
    let text = ctx.doc.text();
    let region = bracket::string_at(&text, pos);
    // The scanner decides when it sees a literal here; the host format byte is only
    // consulted when it does not.
    let in_string = match &region {
        Some(_) => true,
        None => ctx.doc.format_at(pos) == Some(LITERAL_FORMAT),
    };

    if next == Some(q) {
        let at_closer = region.is_some_and(|r| {
            r.closed && r.end.line == pos.line && r.inner.1 <= pos && pos < r.end
        });
        if at_closer || !in_string {
            return advance(ctx, pos);
        }
    }

    let line = ctx.doc.line_text(pos.line);
    let before: Vec<char> = line.chars().take(pos.column).collect();
    let prev = before.last().copied();
    if before.len() >= 2 && before[before.len() - 2..] == [q, q] {
        // `""` + `"` opens a triple-quoted string: emit its closer too.
        let closer: String = [q; 3].iter().collect();
        ctx.begin_typed("insert", q);
        ctx.doc.write(q.encode_utf8(&mut [0; 4]));
        let caret = ctx.caret();
        ctx.doc.insert_at(caret, &closer);
        ctx.doc.set_cursor(Cursor::from_positions(caret, caret));
        return ctx.finish();
    }

    let word_boundary = !prev.is_some_and(is_word_char) && !next.is_some_and(is_word_char);
    if word_boundary && !in_string {
        return insert_pair(ctx, q, q);
    }
    typed(ctx, q)
}

fn surround(ctx: &mut EditContext<'_>, open: char, close: char) -> CommandResult {
    let cursor = ctx.doc.cursor();
    let (start, end) = cursor.sorted();
    ctx.begin("surround");
    ctx.doc.insert_at(end, close.encode_utf8(&mut [0; 4]));
    ctx.doc.insert_at(start, open.encode_utf8(&mut [0; 4]));
    let shift = |p: Position| {
        if p == start || p.line == start.line {
            Position::new(p.line, p.column + 1)
        } else {
            p
        }
    };
    ctx.doc
        .set_cursor(Cursor::from_positions(shift(cursor.anchor), shift(cursor.focus)));
    ctx.finish()
}
