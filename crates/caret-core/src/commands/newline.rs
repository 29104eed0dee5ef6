//! Smart line break.
//!
//! The new line's indent comes from a reference line: the text before the caret, or when that
//! is blank or only a comment, the nearest line above that is neither. Block openers add one
//! unit, block enders remove one, and an unclosed bracket right before the caret adds one.

use super::{CommandResult, EditContext};
use crate::cursor::{Cursor, Position};
use crate::document::IndentType;
use crate::layout::indent_width;
use crate::text;

pub(super) fn line_break(ctx: &mut EditContext<'_>) -> CommandResult {
    let lang = ctx.lang;
    let (start, end) = ctx.doc.cursor().sorted();
    let tab_width = ctx.doc.tab_width();

    let line = ctx.doc.line_text(start.line);
    let before = text::slice_chars(&line, 0, start.column).to_string();
    let after_text = if end.line == start.line {
        text::slice_chars(&line, end.column, usize::MAX).to_string()
    } else {
        let end_line = ctx.doc.line_text(end.line);
        text::slice_chars(&end_line, end.column, usize::MAX).to_string()
    };
    let after = after_text.trim_start_matches([' ', '\t']);
    let stripped = text::char_len(&after_text) - text::char_len(after);

    let base = indent_width(&before, tab_width);
    let comment_line = !text::is_blank(&before) && lang.is_comment_only(&before);

    let mut width = if comment_line {
        base
    } else {
        let reference = reference_line(ctx, start.line, &before);
        let width = indent_width(&reference, tab_width);
        if lang.opens_block(&reference) {
            width + tab_width
        } else if lang.closes_block(&reference) {
            width.saturating_sub(tab_width)
        } else {
            width
        }
    };

    let last_non_space = before.trim_end().chars().last();
    let opener_before = !comment_line && last_non_space.is_some_and(|c| lang.config().is_opener(c));
    if opener_before {
        width = base + tab_width;
    }

    let indent = make_indent(ctx.doc.indent_type(), width, tab_width);
    let mut insert = format!("\n{indent}");
    if comment_line {
        insert.push_str(&lang.config().comment.line_prefix());
    }

    // `(|)` splits into three lines with the closer at the outer indent.
    let split = opener_before
        && last_non_space
            .and_then(|c| lang.config().closer_for(c))
            .is_some_and(|closer| after.starts_with(closer));
    if split {
        insert.push('\n');
        insert.push_str(&make_indent(ctx.doc.indent_type(), base, tab_width));
    }

    ctx.begin("line_break");
    let remove_to = Position::new(end.line, end.column + stripped);
    ctx.doc.replace(start, remove_to, &insert);
    let caret_column = text::char_len(&indent)
        + if comment_line {
            text::char_len(&lang.config().comment.line_prefix())
        } else {
            0
        };
    let caret = Position::new(start.line + 1, caret_column);
    ctx.doc.set_cursor(Cursor::from_positions(caret, caret));
    ctx.finish()
}

/// The text that drives the new indent.
fn reference_line(ctx: &EditContext<'_>, line: usize, before: &str) -> String {
    if !text::is_blank(before) && !ctx.lang.is_comment_only(before) {
        return before.to_string();
    }
    for i in (0..line).rev() {
        let candidate = ctx.doc.line_text(i);
        if !text::is_blank(&candidate) && !ctx.lang.is_comment_only(&candidate) {
            return candidate;
        }
    }
    // Nothing above: keep the current indentation.
    text::leading_whitespace(before).to_string()
}

/// Whitespace of `width` cells in the document's indent style.
pub(super) fn make_indent(indent_type: IndentType, width: usize, tab_width: usize) -> String {
    match indent_type {
        IndentType::Spaces => " ".repeat(width),
        IndentType::Tabs => {
            let mut s = "\t".repeat(width / tab_width);
            s.push_str(&" ".repeat(width % tab_width));
            s
        }
    }
}
