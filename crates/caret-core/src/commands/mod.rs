//! Unified command interface.
//!
//! Every user-facing edit verb is a [`Command`]. Commands run against an [`EditContext`] that
//! borrows the pieces of editor state a verb may touch: the document, its undo stack, the
//! per-space retained column, the clipboard, language rules, preferences and (optionally) the
//! viewport used to keep the caret visible.
//!
//! A verb that cannot do anything returns [`CommandResult::Cancelled`] and leaves the
//! document, the undo stack and the clipboard untouched.
//!
//! # Example
//!
//! ```rust
//! use caret_core::{Command, CommandExecutor, EditCommand};
//!
//! let mut executor = CommandExecutor::new("");
//! executor
//!     .execute(Command::Edit(EditCommand::Insert { text: "(".to_string() }))
//!     .unwrap();
//! assert_eq!(executor.document().text(), "()");
//! ```

mod clipboard;
mod comment;
mod delete;
mod expand;
mod indent;
mod insert;
mod motion;
mod newline;

pub use motion::{Motion, RetainedColumns};

use crate::clipboard::{Clipboard, ClipboardError, MemoryClipboard};
use crate::config::Preferences;
use crate::cursor::{Cursor, Position};
use crate::document::{Document, DocumentError, DocumentId};
use crate::language::Language;
use crate::scroll::{EnsureMode, ScrollScheduler, ViewportId};
use crate::undo::{UndoStack, UndoTag};
use std::time::Instant;
use thiserror::Error;

/// Deletion granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Backspace.
    PreviousChar,
    /// Delete key.
    NextChar,
    /// Ctrl+Backspace.
    PreviousWord,
    /// Ctrl+Delete.
    NextWord,
}

/// Text editing commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Typed text. A single character gets auto-close, surround and skip-over behavior.
    Insert {
        /// Text to insert.
        text: String,
    },
    /// Replace the selection with `text` verbatim.
    Write {
        /// Text to write.
        text: String,
    },
    /// Delete the selection or a char/word next to the caret.
    Delete {
        /// What to delete when there is no selection.
        mode: DeleteMode,
    },
    /// Smart line break.
    LineBreak,
    /// Indent the caret or the selected lines.
    Indent,
    /// Unindent the selected lines.
    Unindent,
    /// Comment or uncomment the selected lines.
    ToggleComment,
    /// Undo the last step.
    Undo,
    /// Redo the last undone step.
    Redo,
}

/// Cursor & selection commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorCommand {
    /// Move the caret; with `select` the anchor stays put.
    Move {
        /// Direction and unit.
        motion: Motion,
        /// Extend the selection instead of moving the caret.
        select: bool,
    },
    /// Place the caret, as a mouse click does.
    SetCursor {
        /// Target line.
        line: usize,
        /// Target column.
        column: usize,
        /// Keep the anchor and move only the focus (shift+click, drag).
        extend: bool,
    },
    /// Set the selection explicitly.
    Select {
        /// Anchor position.
        anchor: Position,
        /// Focus position.
        focus: Position,
    },
    /// Select the whole document.
    SelectAll,
    /// Select the word at a position (double click).
    SelectWord {
        /// Clicked position.
        at: Position,
    },
    /// Select the line at a position (triple click, `LINE`).
    SelectLine {
        /// Clicked line.
        line: usize,
    },
    /// Grow the selection to the next enclosing bracket, string or comment.
    ExpandToBrackets,
    /// Grow the selection over the surrounding dotted path.
    ExpandToPath,
}

/// Clipboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardCommand {
    /// Copy the selection (or the current line).
    Copy,
    /// Cut the selection (or the current line).
    Cut,
    /// Paste the clipboard.
    Paste,
}

/// View commands
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    /// Smoothly scroll by a number of lines.
    ScrollLines {
        /// Lines to scroll (negative scrolls up).
        lines: f64,
    },
    /// Mouse wheel ticks.
    Wheel {
        /// Ticks (negative scrolls up).
        ticks: i32,
        /// Alt was held.
        alt: bool,
    },
    /// Continuous (middle-mouse drag) scroll; cancels eased scrolling.
    ScrollContinuous {
        /// Lines to move right away.
        lines: f64,
    },
    /// Jump to a line, cancelling eased scrolling.
    Jump {
        /// New top line.
        top: usize,
    },
    /// Bring the caret into view.
    EnsureCursorVisible {
        /// Positioning mode.
        mode: EnsureMode,
    },
    /// Set the tab width (in cells).
    SetTabWidth {
        /// Tab width, at least 1.
        width: usize,
    },
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Text editing commands
    Edit(EditCommand),
    /// Cursor commands
    Cursor(CursorCommand),
    /// Clipboard commands
    Clipboard(ClipboardCommand),
    /// View commands
    View(ViewCommand),
}

impl Command {
    /// Stable verb name, used for hook registration and logging.
    pub fn verb(&self) -> crate::overrides::Verb {
        use crate::overrides::Verb;
        match self {
            Command::Edit(EditCommand::Insert { .. } | EditCommand::Write { .. }) => Verb::Insert,
            Command::Edit(EditCommand::Delete { .. }) => Verb::Delete,
            Command::Edit(EditCommand::LineBreak) => Verb::LineBreak,
            Command::Edit(EditCommand::Indent) => Verb::Indent,
            Command::Edit(EditCommand::Unindent) => Verb::Unindent,
            Command::Edit(EditCommand::ToggleComment) => Verb::ToggleComment,
            Command::Edit(EditCommand::Undo) => Verb::Undo,
            Command::Edit(EditCommand::Redo) => Verb::Redo,
            Command::Cursor(CursorCommand::Move { .. }) => Verb::Move,
            Command::Cursor(CursorCommand::SelectAll) => Verb::SelectAll,
            Command::Cursor(CursorCommand::ExpandToBrackets) => Verb::ExpandToBrackets,
            Command::Cursor(CursorCommand::ExpandToPath) => Verb::ExpandToPath,
            Command::Cursor(_) => Verb::Select,
            Command::Clipboard(ClipboardCommand::Copy) => Verb::Copy,
            Command::Clipboard(ClipboardCommand::Cut) => Verb::Cut,
            Command::Clipboard(ClipboardCommand::Paste) => Verb::Paste,
            Command::View(_) => Verb::Scroll,
        }
    }
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The verb ran.
    Finished,
    /// The verb had nothing to do; no state changed.
    Cancelled,
    /// The verb ran and produced text (e.g. copy).
    Text(String),
}

impl CommandResult {
    /// Returns `true` unless the verb was cancelled.
    pub fn is_finished(&self) -> bool {
        !matches!(self, CommandResult::Cancelled)
    }
}

/// Command error type
#[derive(Debug, Error)]
pub enum CommandError {
    /// The clipboard backend failed.
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    /// A document operation failed.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// No space with this id.
    #[error("unknown space {0}")]
    UnknownSpace(u32),
    /// The space has no document attached.
    #[error("space {0} has no document")]
    NoDocument(u32),
    /// No document with this id.
    #[error("unknown document {0}")]
    UnknownDocument(DocumentId),
}

/// The state a command may read and mutate.
pub struct EditContext<'a> {
    /// Target document.
    pub doc: &'a mut Document,
    /// The document's undo history.
    pub undo: &'a mut UndoStack,
    /// Column remembered across vertical moves in this space.
    pub retained: &'a mut Option<RetainedColumns>,
    /// Clipboard backend.
    pub clipboard: &'a mut dyn Clipboard,
    /// Language rules.
    pub lang: &'a Language,
    /// Preferences.
    pub prefs: &'a Preferences,
    /// Viewport that follows the caret, if any.
    pub view: Option<(&'a mut ScrollScheduler, ViewportId)>,
    /// Time used to start scroll jobs.
    pub now: Instant,
}

impl EditContext<'_> {
    /// Snapshot for a non-typing edit.
    pub(crate) fn begin(&mut self, tag: UndoTag) {
        self.undo.update_cursor(self.doc);
        self.undo.push_undo(self.doc, tag);
    }

    /// Snapshot for typing `ch`.
    pub(crate) fn begin_typed(&mut self, tag: UndoTag, ch: char) {
        self.undo.update_cursor(self.doc);
        self.undo.push_typed(self.doc, tag, ch);
    }

    /// Close an edit: record the caret, drop the retained column, follow the caret.
    pub(crate) fn finish(&mut self) -> CommandResult {
        self.undo.end_edit(self.doc);
        *self.retained = None;
        self.ensure_cursor_visible(EnsureMode::Lazy);
        CommandResult::Finished
    }

    /// Move the caret without editing.
    pub(crate) fn move_cursor(&mut self, cursor: Cursor) -> CommandResult {
        self.doc.set_cursor(cursor);
        self.ensure_cursor_visible(EnsureMode::Lazy);
        CommandResult::Finished
    }

    pub(crate) fn caret(&self) -> Position {
        self.doc.cursor().focus
    }

    pub(crate) fn ensure_cursor_visible(&mut self, mode: EnsureMode) {
        let line = self.doc.cursor().focus.line;
        let num_lines = self.doc.num_lines();
        let threshold = self.prefs.ensure_visible_threshold;
        let now = self.now;
        if let Some((scroll, vp)) = self.view.as_mut() {
            scroll.set_num_lines(*vp, num_lines);
            scroll.ensure_visible(*vp, line, mode, threshold, now);
        }
    }
}

/// Run `command` against `ctx`.
pub fn execute(ctx: &mut EditContext<'_>, command: Command) -> Result<CommandResult, CommandError> {
    match command {
        Command::Edit(cmd) => execute_edit(ctx, cmd),
        Command::Cursor(cmd) => Ok(execute_cursor(ctx, cmd)),
        Command::Clipboard(cmd) => match cmd {
            ClipboardCommand::Copy => clipboard::copy(ctx),
            ClipboardCommand::Cut => clipboard::cut(ctx),
            ClipboardCommand::Paste => clipboard::paste(ctx),
        },
        Command::View(cmd) => Ok(execute_view(ctx, cmd)),
    }
}

fn execute_edit(ctx: &mut EditContext<'_>, cmd: EditCommand) -> Result<CommandResult, CommandError> {
    let result = match cmd {
        EditCommand::Insert { text } => insert::insert(ctx, &text),
        EditCommand::Write { text } => insert::write(ctx, &text),
        EditCommand::Delete { mode } => delete::delete(ctx, mode),
        EditCommand::LineBreak => newline::line_break(ctx),
        EditCommand::Indent => indent::indent(ctx),
        EditCommand::Unindent => indent::unindent(ctx),
        EditCommand::ToggleComment => comment::toggle_comment(ctx),
        EditCommand::Undo => {
            if ctx.undo.pop_undo(ctx.doc) {
                *ctx.retained = None;
                ctx.ensure_cursor_visible(EnsureMode::Lazy);
                CommandResult::Finished
            } else {
                CommandResult::Cancelled
            }
        }
        EditCommand::Redo => {
            if ctx.undo.pop_redo(ctx.doc) {
                *ctx.retained = None;
                ctx.ensure_cursor_visible(EnsureMode::Lazy);
                CommandResult::Finished
            } else {
                CommandResult::Cancelled
            }
        }
    };
    Ok(result)
}

fn execute_cursor(ctx: &mut EditContext<'_>, cmd: CursorCommand) -> CommandResult {
    match cmd {
        CursorCommand::Move { motion, select } => motion::move_cursor(ctx, motion, select),
        CursorCommand::SetCursor {
            line,
            column,
            extend,
        } => {
            *ctx.retained = None;
            let focus = ctx.doc.clamp(Position::new(line, column));
            let anchor = if extend {
                ctx.doc.cursor().anchor
            } else {
                focus
            };
            ctx.move_cursor(Cursor::from_positions(anchor, focus))
        }
        CursorCommand::Select { anchor, focus } => {
            *ctx.retained = None;
            ctx.move_cursor(Cursor::from_positions(anchor, focus))
        }
        CursorCommand::SelectAll => {
            let last = ctx.doc.num_lines() - 1;
            let end = Position::new(last, ctx.doc.line_len(last));
            *ctx.retained = None;
            ctx.doc.set_cursor(Cursor::from_positions(Position::new(0, 0), end));
            CommandResult::Finished
        }
        CursorCommand::SelectWord { at } => motion::select_word(ctx, at),
        CursorCommand::SelectLine { line } => motion::select_line(ctx, line),
        CursorCommand::ExpandToBrackets => expand::expand_to_brackets(ctx),
        CursorCommand::ExpandToPath => expand::expand_to_path(ctx),
    }
}

fn execute_view(ctx: &mut EditContext<'_>, cmd: ViewCommand) -> CommandResult {
    if let ViewCommand::SetTabWidth { width } = cmd {
        ctx.doc.set_tab_width(width);
        return CommandResult::Finished;
    }
    if let ViewCommand::EnsureCursorVisible { mode } = cmd {
        ctx.ensure_cursor_visible(mode);
        return CommandResult::Finished;
    }
    let duration = ctx.prefs.scroll_duration();
    let wheel = match &cmd {
        ViewCommand::Wheel { ticks, alt } => ctx.prefs.wheel_lines(*ticks, *alt),
        _ => 0.0,
    };
    let now = ctx.now;
    let num_lines = ctx.doc.num_lines();
    let Some((scroll, vp)) = ctx.view.as_mut() else {
        return CommandResult::Cancelled;
    };
    let vp = *vp;
    scroll.set_num_lines(vp, num_lines);
    match cmd {
        ViewCommand::ScrollLines { lines } => scroll.scroll(vp, lines, None, now),
        ViewCommand::Wheel { .. } => scroll.scroll(vp, wheel, Some(duration), now),
        ViewCommand::ScrollContinuous { lines } => scroll.scroll_continuous(vp, lines),
        ViewCommand::Jump { top } => scroll.jump(vp, top),
        ViewCommand::EnsureCursorVisible { .. } | ViewCommand::SetTabWidth { .. } => {}
    }
    CommandResult::Finished
}

/// Single-document command executor.
///
/// Owns a document, its undo stack, an in-memory clipboard and a scroll viewport. Hosts with
/// several documents and spaces use [`crate::Workspace`] instead.
pub struct CommandExecutor {
    doc: Document,
    undo: UndoStack,
    retained: Option<RetainedColumns>,
    clipboard: Box<dyn Clipboard>,
    lang: Language,
    prefs: Preferences,
    scroll: ScrollScheduler,
    viewport: ViewportId,
}

impl CommandExecutor {
    /// Create an executor over `text` with default language and preferences.
    pub fn new(text: &str) -> Self {
        Self::with_document(Document::from_text("untitled", text))
    }

    /// Create an executor over an existing document.
    pub fn with_document(doc: Document) -> Self {
        let mut scroll = ScrollScheduler::new();
        let viewport = scroll.add_viewport(600.0, 20.0, doc.num_lines());
        Self {
            doc,
            undo: UndoStack::new(),
            retained: None,
            clipboard: Box::new(MemoryClipboard::new()),
            lang: Language::python(),
            prefs: Preferences::default(),
            scroll,
            viewport,
        }
    }

    /// Replace the clipboard backend.
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    /// Replace the language rules.
    pub fn set_language(&mut self, lang: Language) {
        self.lang = lang;
    }

    /// Replace the preferences.
    pub fn set_preferences(&mut self, prefs: Preferences) {
        self.prefs = prefs;
    }

    /// Execute command
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        self.execute_at(command, Instant::now())
    }

    /// Execute a command with an explicit clock (for scroll jobs).
    pub fn execute_at(
        &mut self,
        command: Command,
        now: Instant,
    ) -> Result<CommandResult, CommandError> {
        let mut ctx = EditContext {
            doc: &mut self.doc,
            undo: &mut self.undo,
            retained: &mut self.retained,
            clipboard: self.clipboard.as_mut(),
            lang: &self.lang,
            prefs: &self.prefs,
            view: Some((&mut self.scroll, self.viewport)),
            now,
        };
        execute(&mut ctx, command)
    }

    /// Execute several commands, stopping at the first error.
    pub fn execute_batch(
        &mut self,
        commands: impl IntoIterator<Item = Command>,
    ) -> Result<Vec<CommandResult>, CommandError> {
        commands.into_iter().map(|c| self.execute(c)).collect()
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The document, mutably (for host-side setup such as formats).
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Current clipboard text.
    pub fn clipboard_text(&mut self) -> Result<String, CommandError> {
        Ok(self.clipboard.get()?)
    }

    /// Returns `true` if there is something to undo.
    pub fn can_undo(&self) -> bool {
        self.undo.poll_undo()
    }

    /// Returns `true` if there is something to redo.
    pub fn can_redo(&self) -> bool {
        self.undo.poll_redo()
    }

    /// Number of undo steps.
    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    /// Number of redo steps.
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    /// The scroll scheduler and the executor's viewport.
    pub fn scroll(&mut self) -> (&mut ScrollScheduler, ViewportId) {
        (&mut self.scroll, self.viewport)
    }

    /// Retained column state (for tests and UI).
    pub fn retained_columns(&self) -> Option<RetainedColumns> {
        self.retained
    }
}
