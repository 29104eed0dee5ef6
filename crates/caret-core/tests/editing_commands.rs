use caret_core::{
    ClipboardCommand, Command, CommandExecutor, CommandResult, CursorCommand, Cursor, DeleteMode,
    EditCommand, MemoryClipboard, Motion, Position, Preferences,
};
use pretty_assertions::assert_eq;

fn insert(text: &str) -> Command {
    Command::Edit(EditCommand::Insert {
        text: text.to_string(),
    })
}

fn delete(mode: DeleteMode) -> Command {
    Command::Edit(EditCommand::Delete { mode })
}

fn select(ex: &mut CommandExecutor, al: usize, ac: usize, fl: usize, fc: usize) {
    ex.execute(Command::Cursor(CursorCommand::Select {
        anchor: Position::new(al, ac),
        focus: Position::new(fl, fc),
    }))
    .unwrap();
}

fn at(text: &str, line: usize, column: usize) -> CommandExecutor {
    let mut ex = CommandExecutor::new(text);
    ex.document_mut().select_caret(line, column);
    ex
}

// Insert

#[test]
fn test_opener_pairs_before_closer_but_not_before_word() {
    let mut ex = at(")", 0, 0);
    ex.execute(insert("[")).unwrap();
    assert_eq!(ex.document().text(), "[])");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 1));

    let mut ex = at("x", 0, 0);
    ex.execute(insert("(")).unwrap();
    assert_eq!(ex.document().text(), "(x");
}

#[test]
fn test_closer_steps_over_matching_closer() {
    let mut ex = at("()", 0, 1);
    ex.execute(insert(")")).unwrap();
    assert_eq!(ex.document().text(), "()");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 2));
}

#[test]
fn test_opener_surrounds_selection() {
    let mut ex = CommandExecutor::new("abc");
    select(&mut ex, 0, 0, 0, 3);
    ex.execute(insert("(")).unwrap();
    assert_eq!(ex.document().text(), "(abc)");
    assert_eq!(ex.document().cursor(), Cursor::new(0, 1, 0, 4));
    assert_eq!(ex.document().selected_text(), "abc");
}

#[test]
fn test_quote_pairs_on_word_boundary_only() {
    let mut ex = CommandExecutor::new("");
    ex.execute(insert("\"")).unwrap();
    assert_eq!(ex.document().text(), "\"\"");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 1));

    let mut ex = at("ab", 0, 2);
    ex.execute(insert("'")).unwrap();
    assert_eq!(ex.document().text(), "ab'");
}

#[test]
fn test_third_quote_opens_triple_string() {
    let mut ex = at("\"\"", 0, 2);
    ex.execute(insert("\"")).unwrap();
    assert_eq!(ex.document().text(), "\"\"\"\"\"\"");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 3));
}

#[test]
fn test_multi_char_insert_is_verbatim() {
    let mut ex = CommandExecutor::new("");
    ex.execute(insert("(a")).unwrap();
    assert_eq!(ex.document().text(), "(a");
}

// Delete

#[test]
fn test_backspace_removes_empty_pair() {
    let mut ex = at("()", 0, 1);
    ex.execute(delete(DeleteMode::PreviousChar)).unwrap();
    assert_eq!(ex.document().text(), "");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 0));
}

#[test]
fn test_backspace_in_space_indent_goes_to_tab_stop() {
    let mut ex = at("      x", 0, 6);
    ex.execute(delete(DeleteMode::PreviousChar)).unwrap();
    assert_eq!(ex.document().text(), "    x");
    ex.execute(delete(DeleteMode::PreviousChar)).unwrap();
    assert_eq!(ex.document().text(), "x");
}

#[test]
fn test_delete_merges_lines_and_cancels_at_edges() {
    let mut ex = at("a\nb", 1, 0);
    ex.execute(delete(DeleteMode::PreviousChar)).unwrap();
    assert_eq!(ex.document().text(), "ab");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 1));

    let mut ex = at("a", 0, 0);
    let result = ex.execute(delete(DeleteMode::PreviousChar)).unwrap();
    assert_eq!(result, CommandResult::Cancelled);
    assert!(!ex.can_undo());

    let mut ex = at("a", 0, 1);
    let result = ex.execute(delete(DeleteMode::NextChar)).unwrap();
    assert_eq!(result, CommandResult::Cancelled);
}

#[test]
fn test_delete_next_word() {
    let mut ex = at("foo bar", 0, 0);
    ex.execute(delete(DeleteMode::NextWord)).unwrap();
    assert_eq!(ex.document().text(), " bar");

    let mut ex = at("foo bar", 0, 7);
    ex.execute(delete(DeleteMode::PreviousWord)).unwrap();
    assert_eq!(ex.document().text(), "foo");
}

// Indent

#[test]
fn test_indent_caret_pads_to_next_tab_stop() {
    let mut ex = at("x", 0, 0);
    ex.execute(Command::Edit(EditCommand::Indent)).unwrap();
    assert_eq!(ex.document().text(), "    x");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 4));

    let mut ex = at("ab", 0, 1);
    ex.execute(Command::Edit(EditCommand::Indent)).unwrap();
    assert_eq!(ex.document().text(), "a   b");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 4));
}

#[test]
fn test_indent_and_unindent_lines() {
    let mut ex = CommandExecutor::new("a\nb");
    select(&mut ex, 0, 0, 1, 1);
    ex.execute(Command::Edit(EditCommand::Indent)).unwrap();
    assert_eq!(ex.document().lines(), vec!["    a", "    b"]);
    assert_eq!(ex.document().cursor(), Cursor::new(0, 4, 1, 5));

    ex.execute(Command::Edit(EditCommand::Unindent)).unwrap();
    assert_eq!(ex.document().lines(), vec!["a", "b"]);
    assert_eq!(ex.document().cursor(), Cursor::new(0, 0, 1, 1));

    let result = ex.execute(Command::Edit(EditCommand::Unindent)).unwrap();
    assert_eq!(result, CommandResult::Cancelled);
}

#[test]
fn test_unindent_snaps_unaligned_indent() {
    let mut ex = CommandExecutor::new("      x\n    y");
    select(&mut ex, 0, 6, 1, 5);
    ex.execute(Command::Edit(EditCommand::Unindent)).unwrap();
    assert_eq!(ex.document().lines(), vec!["    x", "y"]);
    assert_eq!(ex.document().cursor(), Cursor::new(0, 4, 1, 1));
}

// Comment

#[test]
fn test_comment_single_line_keeps_caret_after_text() {
    let mut ex = at("foo", 0, 3);
    ex.execute(Command::Edit(EditCommand::ToggleComment)).unwrap();
    assert_eq!(ex.document().text(), "# foo");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 5));

    ex.execute(Command::Edit(EditCommand::ToggleComment)).unwrap();
    assert_eq!(ex.document().text(), "foo");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 3));
}

#[test]
fn test_comment_aligns_to_indent_grid() {
    let mut ex = CommandExecutor::new("    a\n      b");
    ex.execute(Command::Cursor(CursorCommand::SelectAll)).unwrap();
    ex.execute(Command::Edit(EditCommand::ToggleComment)).unwrap();
    assert_eq!(ex.document().lines(), vec!["    # a", "    #   b"]);
}

#[test]
fn test_uncomment_without_space_and_blank_only_range() {
    let mut ex = at("#foo", 0, 0);
    ex.execute(Command::Edit(EditCommand::ToggleComment)).unwrap();
    assert_eq!(ex.document().text(), "foo");

    let mut ex = at("   ", 0, 0);
    let result = ex.execute(Command::Edit(EditCommand::ToggleComment)).unwrap();
    assert_eq!(result, CommandResult::Cancelled);
}

// Cursor

#[test]
fn test_vertical_moves_keep_retained_column() {
    let mut ex = at("abcdef\nab\nabcdef", 0, 5);
    let down = Command::Cursor(CursorCommand::Move {
        motion: Motion::Down,
        select: false,
    });
    ex.execute(down.clone()).unwrap();
    assert_eq!(ex.document().cursor(), Cursor::caret(1, 2));
    ex.execute(down).unwrap();
    assert_eq!(ex.document().cursor(), Cursor::caret(2, 5));
    assert!(ex.retained_columns().is_some());

    ex.execute(Command::Cursor(CursorCommand::Move {
        motion: Motion::Left,
        select: false,
    }))
    .unwrap();
    assert!(ex.retained_columns().is_none());
}

#[test]
fn test_vertical_moves_at_document_edges() {
    let mut ex = at("abc\nde", 0, 2);
    ex.execute(Command::Cursor(CursorCommand::Move {
        motion: Motion::Up,
        select: false,
    }))
    .unwrap();
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 0));

    let mut ex = at("abc\nde", 1, 0);
    ex.execute(Command::Cursor(CursorCommand::Move {
        motion: Motion::Down,
        select: false,
    }))
    .unwrap();
    assert_eq!(ex.document().cursor(), Cursor::caret(1, 2));
}

#[test]
fn test_smart_home_toggles() {
    let mut ex = at("    x", 0, 5);
    let home = Command::Cursor(CursorCommand::Move {
        motion: Motion::LineStart,
        select: false,
    });
    ex.execute(home.clone()).unwrap();
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 4));
    ex.execute(home).unwrap();
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 0));
}

#[test]
fn test_select_word_and_collapse_right() {
    let mut ex = CommandExecutor::new("foo bar");
    ex.execute(Command::Cursor(CursorCommand::SelectWord {
        at: Position::new(0, 5),
    }))
    .unwrap();
    assert_eq!(ex.document().cursor(), Cursor::new(0, 4, 0, 7));

    ex.execute(Command::Cursor(CursorCommand::Move {
        motion: Motion::Right,
        select: false,
    }))
    .unwrap();
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 7));
}

#[test]
fn test_set_cursor_clamps() {
    let mut ex = CommandExecutor::new("ab\nc");
    ex.execute(Command::Cursor(CursorCommand::SetCursor {
        line: 9,
        column: 9,
        extend: false,
    }))
    .unwrap();
    assert_eq!(ex.document().cursor(), Cursor::caret(1, 1));
}

// Expansion

#[test]
fn test_expand_to_brackets_walks_outwards() {
    let mut ex = at("f(a, (b))", 0, 6);
    let expand = Command::Cursor(CursorCommand::ExpandToBrackets);

    let mut seen = Vec::new();
    while ex.execute(expand.clone()).unwrap().is_finished() {
        seen.push(ex.document().selected_text());
    }
    assert_eq!(seen, vec!["b", "(b)", "a, (b)", "(a, (b))"]);
    assert_eq!(ex.execute(expand).unwrap(), CommandResult::Cancelled);
}

#[test]
fn test_expand_to_brackets_refines_inside_strings() {
    let mut ex = at("x = \"(a)\"", 0, 6);
    let expand = Command::Cursor(CursorCommand::ExpandToBrackets);

    let mut seen = Vec::new();
    while ex.execute(expand.clone()).unwrap().is_finished() {
        seen.push(ex.document().selected_text());
    }
    assert_eq!(seen, vec!["a", "(a)", "\"(a)\""]);
}

#[test]
fn test_expand_to_path_binds_periods() {
    let mut ex = at("call(os.path.join)", 0, 9);
    ex.execute(Command::Cursor(CursorCommand::ExpandToPath)).unwrap();
    assert_eq!(ex.document().selected_text(), "os.path.join");

    let result = ex.execute(Command::Cursor(CursorCommand::ExpandToPath)).unwrap();
    assert_eq!(result, CommandResult::Cancelled);
}

// Clipboard

#[test]
fn test_copy_selection_or_line() {
    let mut ex = CommandExecutor::new("one\ntwo");
    select(&mut ex, 0, 0, 0, 2);
    let result = ex.execute(Command::Clipboard(ClipboardCommand::Copy)).unwrap();
    assert_eq!(result, CommandResult::Text("on".to_string()));

    ex.document_mut().select_caret(1, 1);
    ex.execute(Command::Clipboard(ClipboardCommand::Copy)).unwrap();
    assert_eq!(ex.clipboard_text().unwrap(), "two\n");
}

#[test]
fn test_copy_without_line_fallback_is_cancelled() {
    let mut ex = CommandExecutor::new("one");
    ex.set_clipboard(Box::new(MemoryClipboard::with_text("keep")));
    ex.set_preferences(Preferences {
        copy_line_fallback: false,
        ..Preferences::default()
    });
    let result = ex.execute(Command::Clipboard(ClipboardCommand::Copy)).unwrap();
    assert_eq!(result, CommandResult::Cancelled);
    assert_eq!(ex.clipboard_text().unwrap(), "keep");
}

#[test]
fn test_cut_whole_line_positions_caret() {
    let mut ex = at("a\nb\nc", 1, 0);
    ex.execute(Command::Clipboard(ClipboardCommand::Cut)).unwrap();
    assert_eq!(ex.document().text(), "a\nc");
    assert_eq!(ex.document().cursor(), Cursor::caret(1, 0));
    assert_eq!(ex.clipboard_text().unwrap(), "b\n");

    let mut ex = at("a\nb", 1, 1);
    ex.execute(Command::Clipboard(ClipboardCommand::Cut)).unwrap();
    assert_eq!(ex.document().text(), "a");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 1));
}

#[test]
fn test_paste_line_goes_above_caret_line() {
    let mut ex = at("a\nb", 1, 1);
    ex.set_clipboard(Box::new(MemoryClipboard::with_text("x\n")));
    ex.execute(Command::Clipboard(ClipboardCommand::Paste)).unwrap();
    assert_eq!(ex.document().lines(), vec!["a", "x", "b"]);
    assert_eq!(ex.document().cursor(), Cursor::caret(2, 1));
}

#[test]
fn test_paste_replaces_selection_and_empty_paste_cancels() {
    let mut ex = CommandExecutor::new("abc");
    ex.set_clipboard(Box::new(MemoryClipboard::with_text("zz")));
    select(&mut ex, 0, 0, 0, 1);
    ex.execute(Command::Clipboard(ClipboardCommand::Paste)).unwrap();
    assert_eq!(ex.document().text(), "zzbc");
    assert_eq!(ex.document().cursor(), Cursor::caret(0, 2));

    let mut ex = CommandExecutor::new("abc");
    let result = ex.execute(Command::Clipboard(ClipboardCommand::Paste)).unwrap();
    assert_eq!(result, CommandResult::Cancelled);
    assert!(!ex.can_undo());
}
