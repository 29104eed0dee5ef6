use caret_core::{Command, CommandExecutor, CursorCommand, Cursor, EditCommand, Position};
use pretty_assertions::assert_eq;

fn insert(text: &str) -> Command {
    Command::Edit(EditCommand::Insert {
        text: text.to_string(),
    })
}

#[test]
fn test_auto_close_paren_in_empty_document() {
    let mut ex = CommandExecutor::new("");
    ex.execute(insert("(")).unwrap();

    assert_eq!(ex.document().text(), "()");
    assert_eq!(ex.document().cursor(), Cursor::new(0, 1, 0, 1));
}

#[test]
fn test_quote_advances_over_closing_quote() {
    let mut ex = CommandExecutor::new("\"a\"");
    ex.document_mut().select_caret(0, 2);
    ex.execute(insert("\"")).unwrap();

    assert_eq!(ex.document().text(), "\"a\"");
    assert_eq!(ex.document().cursor(), Cursor::new(0, 3, 0, 3));
    assert!(!ex.can_undo());
}

#[test]
fn test_line_break_after_block_opener_indents() {
    let mut ex = CommandExecutor::new("if x:");
    ex.document_mut().select_caret(0, 5);
    ex.execute(Command::Edit(EditCommand::LineBreak)).unwrap();

    assert_eq!(ex.document().lines(), vec!["if x:", "    "]);
    assert_eq!(ex.document().cursor().focus, Position::new(1, 4));
}

#[test]
fn test_line_break_between_brackets_splits_three_ways() {
    let mut ex = CommandExecutor::new("f()");
    ex.document_mut().select_caret(0, 2);
    ex.execute(Command::Edit(EditCommand::LineBreak)).unwrap();

    assert_eq!(ex.document().lines(), vec!["f(", "    ", ")"]);
    assert_eq!(ex.document().cursor().focus, Position::new(1, 4));
}

#[test]
fn test_comment_toggle_round_trip() {
    let mut ex = CommandExecutor::new("if x:\n    pass");
    ex.execute(Command::Cursor(CursorCommand::SelectAll)).unwrap();

    ex.execute(Command::Edit(EditCommand::ToggleComment)).unwrap();
    assert_eq!(ex.document().lines(), vec!["# if x:", "    # pass"]);

    ex.execute(Command::Edit(EditCommand::ToggleComment)).unwrap();
    assert_eq!(ex.document().lines(), vec!["if x:", "    pass"]);
}

#[test]
fn test_undo_redo_over_separator() {
    let mut ex = CommandExecutor::new("");
    for ch in ["a", "b", "."] {
        ex.execute(insert(ch)).unwrap();
    }
    assert_eq!(ex.document().text(), "ab.");

    ex.execute(Command::Edit(EditCommand::Undo)).unwrap();
    ex.execute(Command::Edit(EditCommand::Undo)).unwrap();
    assert_eq!(ex.document().text(), "a");

    ex.execute(Command::Edit(EditCommand::Redo)).unwrap();
    ex.execute(Command::Edit(EditCommand::Redo)).unwrap();
    assert_eq!(ex.document().text(), "ab.");
}
