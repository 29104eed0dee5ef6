//! Single-line text entry.
//!
//! An [`Input`] is a tiny editor of its own: a string, an anchor and a focus (char columns),
//! and a private [`LinearStack`] for undo. While it has keyboard focus, [`InputHooks`] sit in
//! front of the editing verbs of its space and queue the commands for the input instead of
//! letting them reach the document.

use crate::geometry::{Point, Rect};
use crate::render::{Painter, RectStyle, TextStyle};
use caret_core::{
    Clipboard, ClipboardCommand, ClipboardError, Command, CursorCommand, DeleteMode, EditCommand,
    HookError, HookId, HookOutcome, HookScope, LinearStack, Motion, Overrides, Rgba, SpaceId,
    Undoable, Verb, text, word,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Gap between an input's left edge and its first character.
pub const TEXT_PADDING: f64 = 4.0;

/// Caret movement inside an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMotion {
    /// One grapheme left.
    Left,
    /// One grapheme right.
    Right,
    /// One word left.
    WordLeft,
    /// One word right.
    WordRight,
    /// Start of the string.
    Home,
    /// End of the string.
    End,
}

impl InputMotion {
    /// The input equivalent of an editor motion; vertical motions have none.
    pub fn from_motion(motion: Motion) -> Option<Self> {
        match motion {
            Motion::Left => Some(Self::Left),
            Motion::Right => Some(Self::Right),
            Motion::WordLeft => Some(Self::WordLeft),
            Motion::WordRight => Some(Self::WordRight),
            Motion::LineStart | Motion::DocumentStart => Some(Self::Home),
            Motion::LineEnd | Motion::DocumentEnd => Some(Self::End),
            _ => None,
        }
    }
}

/// Content and selection of an input; the part its undo stack snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    anchor: usize,
    focus: usize,
}

impl InputBuffer {
    fn len(&self) -> usize {
        text::char_len(&self.text)
    }

    fn sorted(&self) -> (usize, usize) {
        (self.anchor.min(self.focus), self.anchor.max(self.focus))
    }

    fn replace(&mut self, start: usize, end: usize, s: &str) {
        let start_b = text::char_to_byte(&self.text, start);
        let end_b = text::char_to_byte(&self.text, end);
        self.text.replace_range(start_b..end_b, s);
        let caret = start + text::char_len(s);
        self.anchor = caret;
        self.focus = caret;
    }
}

impl Undoable for InputBuffer {
    type State = String;
    type Cursor = (usize, usize);

    fn capture(&self) -> String {
        self.text.clone()
    }

    fn restore(&mut self, state: &String) {
        self.text = state.clone();
        let len = self.len();
        self.anchor = self.anchor.min(len);
        self.focus = self.focus.min(len);
    }

    fn undo_cursor(&self) -> (usize, usize) {
        (self.anchor, self.focus)
    }

    fn set_undo_cursor(&mut self, (anchor, focus): (usize, usize)) {
        let len = self.len();
        self.anchor = anchor.min(len);
        self.focus = focus.min(len);
    }

    fn has_selection(&self) -> bool {
        self.anchor != self.focus
    }

    fn char_before_anchor(&self) -> Option<char> {
        self.anchor
            .checked_sub(1)
            .and_then(|col| text::char_at(&self.text, col))
    }
}

/// Single-line text entry widget state.
#[derive(Debug, Clone)]
pub struct Input {
    buffer: InputBuffer,
    undo: LinearStack<InputBuffer>,
    hint: String,
    focused: bool,
    strict_words: bool,
    char_width: f64,
    style: TextStyle,
    hint_style: TextStyle,
    selection_style: RectStyle,
}

impl Input {
    /// An empty input showing `hint` while empty.
    pub fn new(hint: impl Into<String>) -> Self {
        let style = TextStyle::default();
        Self {
            buffer: InputBuffer::default(),
            undo: LinearStack::new(),
            hint: hint.into(),
            focused: false,
            strict_words: false,
            char_width: 8.0,
            style,
            hint_style: TextStyle {
                color: Rgba::new(0.5, 0.5, 0.5, 1.0),
                ..style
            },
            selection_style: RectStyle::filled(Rgba::new(0.3, 0.5, 0.9, 0.4)),
        }
    }

    /// Use the strict word pattern for word motions and deletion.
    pub fn with_strict_words(mut self, strict: bool) -> Self {
        self.strict_words = strict;
        self
    }

    /// Width of one character cell, for mapping clicks to columns.
    pub fn with_char_width(mut self, width: f64) -> Self {
        self.char_width = width.max(1.0);
        self
    }

    /// The string.
    pub fn text(&self) -> &str {
        &self.buffer.text
    }

    /// Placeholder shown while empty.
    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Change the placeholder.
    pub fn set_hint(&mut self, hint: impl Into<String>) {
        self.hint = hint.into();
    }

    /// Selection anchor column.
    pub fn anchor(&self) -> usize {
        self.buffer.anchor
    }

    /// Caret column.
    pub fn focus(&self) -> usize {
        self.buffer.focus
    }

    /// Selection in reading order.
    pub fn selection(&self) -> (usize, usize) {
        self.buffer.sorted()
    }

    /// Selected text.
    pub fn selected_text(&self) -> &str {
        let (start, end) = self.buffer.sorted();
        text::slice_chars(&self.buffer.text, start, end)
    }

    /// Returns `true` while the input has keyboard focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Undo history depth.
    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    /// Replace the whole string and put the caret at its end.
    ///
    /// With `reset_undo` the history is dropped; otherwise the change is undoable.
    pub fn set_string(&mut self, s: &str, reset_undo: bool) {
        let s = single_line(s);
        if reset_undo {
            self.undo.clear();
        } else {
            self.undo.push_undo(&self.buffer, "set_string");
        }
        let len = self.buffer.len();
        self.buffer.replace(0, len, &s);
        self.undo.end_edit(&self.buffer);
    }

    /// Replace the selection with `s`. Line breaks become spaces.
    pub fn write(&mut self, s: &str) -> bool {
        let s = single_line(s);
        if s.is_empty() && !self.buffer.has_selection() {
            return false;
        }
        self.undo.update_cursor(&self.buffer);
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => self.undo.push_typed(&self.buffer, "insert", ch),
            _ => self.undo.push_undo(&self.buffer, "insert"),
        }
        let (start, end) = self.buffer.sorted();
        self.buffer.replace(start, end, &s);
        self.undo.end_edit(&self.buffer);
        true
    }

    /// Delete the selection, or a char or word next to the caret.
    pub fn delete(&mut self, mode: DeleteMode) -> bool {
        let (start, end) = if self.buffer.has_selection() {
            self.buffer.sorted()
        } else {
            let line = &self.buffer.text;
            let caret = self.buffer.focus;
            match mode {
                DeleteMode::PreviousChar => (text::prev_grapheme_boundary(line, caret), caret),
                DeleteMode::NextChar => (caret, text::next_grapheme_boundary(line, caret)),
                DeleteMode::PreviousWord => {
                    (word::prev_word_boundary(line, caret, self.strict_words), caret)
                }
                DeleteMode::NextWord => {
                    (caret, word::next_word_boundary(line, caret, self.strict_words))
                }
            }
        };
        let end = end.min(self.buffer.len());
        if start >= end {
            return false;
        }
        self.undo.update_cursor(&self.buffer);
        self.undo.push_undo(&self.buffer, "delete");
        self.buffer.replace(start, end, "");
        self.undo.end_edit(&self.buffer);
        true
    }

    /// Move the caret; with `select` the anchor stays.
    ///
    /// Without `select`, Left/Right on a selection collapse it to its start/end.
    pub fn navigate(&mut self, motion: InputMotion, select: bool) -> bool {
        let before = self.buffer.undo_cursor();
        let line = &self.buffer.text;
        let caret = self.buffer.focus;
        let (start, end) = self.buffer.sorted();
        let collapse = !select && self.buffer.has_selection();
        let target = match motion {
            InputMotion::Left if collapse => start,
            InputMotion::Right if collapse => end,
            InputMotion::Left => text::prev_grapheme_boundary(line, caret),
            InputMotion::Right => text::next_grapheme_boundary(line, caret),
            InputMotion::WordLeft => word::prev_word_boundary(line, caret, self.strict_words),
            InputMotion::WordRight => word::next_word_boundary(line, caret, self.strict_words),
            InputMotion::Home => 0,
            InputMotion::End => self.buffer.len(),
        };
        self.set_cursor(target, select);
        self.buffer.undo_cursor() != before
    }

    /// Place the caret at `column`; with `select` the anchor stays.
    pub fn set_cursor(&mut self, column: usize, select: bool) {
        let column = column.min(self.buffer.len());
        self.buffer.focus = column;
        if !select {
            self.buffer.anchor = column;
        }
    }

    /// Select the whole string.
    pub fn select_all(&mut self) {
        self.buffer.anchor = 0;
        self.buffer.focus = self.buffer.len();
    }

    /// Copy the selection. Returns `false` when nothing is selected.
    pub fn copy(&self, clipboard: &mut dyn Clipboard) -> Result<bool, ClipboardError> {
        if !self.buffer.has_selection() {
            return Ok(false);
        }
        clipboard.set(self.selected_text())?;
        Ok(true)
    }

    /// Copy and delete the selection.
    pub fn cut(&mut self, clipboard: &mut dyn Clipboard) -> Result<bool, ClipboardError> {
        if !self.copy(clipboard)? {
            return Ok(false);
        }
        Ok(self.delete(DeleteMode::PreviousChar))
    }

    /// Replace the selection with the clipboard text.
    pub fn paste(&mut self, clipboard: &mut dyn Clipboard) -> Result<bool, ClipboardError> {
        let pasted = clipboard.get()?;
        if pasted.is_empty() {
            return Ok(false);
        }
        Ok(self.write(&pasted))
    }

    /// Undo one step.
    pub fn undo(&mut self) -> bool {
        self.undo.pop_undo(&mut self.buffer)
    }

    /// Redo one step.
    pub fn redo(&mut self) -> bool {
        self.undo.pop_redo(&mut self.buffer)
    }

    /// Column closest to the horizontal offset `x` from the text's left edge.
    pub fn column_at(&self, x: f64) -> usize {
        let column = (x.max(0.0) / self.char_width).round() as usize;
        column.min(self.buffer.len())
    }

    /// Column under the horizontal position `x` of an input drawn in `rect`.
    pub fn column_in(&self, rect: Rect, x: f64) -> usize {
        self.column_at(x - rect.x - TEXT_PADDING)
    }

    /// Keyboard focus arrived.
    pub fn focus_gained(&mut self) {
        self.focused = true;
    }

    /// Keyboard focus left. A selection covering the whole string collapses to the caret.
    pub fn focus_lost(&mut self) {
        self.focused = false;
        let (start, end) = self.buffer.sorted();
        if start == 0 && end == self.buffer.len() && end > 0 {
            self.buffer.anchor = self.buffer.focus;
        }
        self.undo.split();
    }

    /// Apply a redirected editor command. Returns `true` if it changed anything.
    ///
    /// Verbs with no single-line meaning (line break, indent, comment, expansion) are
    /// swallowed.
    pub fn apply(
        &mut self,
        command: &Command,
        clipboard: &mut dyn Clipboard,
    ) -> Result<bool, ClipboardError> {
        let changed = match command {
            Command::Edit(EditCommand::Insert { text } | EditCommand::Write { text }) => {
                self.write(text)
            }
            Command::Edit(EditCommand::Delete { mode }) => self.delete(*mode),
            Command::Edit(EditCommand::Undo) => self.undo(),
            Command::Edit(EditCommand::Redo) => self.redo(),
            Command::Cursor(CursorCommand::Move { motion, select }) => {
                match InputMotion::from_motion(*motion) {
                    Some(m) => self.navigate(m, *select),
                    None => false,
                }
            }
            Command::Cursor(CursorCommand::SelectAll) => {
                self.select_all();
                true
            }
            Command::Clipboard(ClipboardCommand::Copy) => self.copy(clipboard)?,
            Command::Clipboard(ClipboardCommand::Cut) => self.cut(clipboard)?,
            Command::Clipboard(ClipboardCommand::Paste) => self.paste(clipboard)?,
            _ => false,
        };
        Ok(changed)
    }

    /// Draw text (or hint), selection and caret into `rect`.
    pub fn draw(&self, rect: Rect, painter: &mut dyn Painter) {
        let pad = TEXT_PADDING;
        let baseline = rect.y + rect.h * 0.7;
        let x_of = |col: usize| rect.x + pad + col as f64 * self.char_width;
        let (start, end) = self.buffer.sorted();
        if start != end {
            let width = (end - start) as f64 * self.char_width;
            let sel = Rect::new(x_of(start), rect.y + 2.0, width, rect.h - 4.0);
            painter.rect(sel, &self.selection_style);
        }
        if self.buffer.text.is_empty() {
            painter.text(Point::new(x_of(0), baseline), &self.hint_style, &self.hint);
        } else {
            painter.text(Point::new(x_of(0), baseline), &self.style, &self.buffer.text);
        }
        if self.focused {
            let caret = Rect::new(x_of(self.buffer.focus), rect.y + 2.0, 1.0, rect.h - 4.0);
            painter.rect(caret, &RectStyle::filled(self.style.color));
        }
    }
}

fn single_line(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Commands queued for a focused input.
pub type InputQueue = Rc<RefCell<VecDeque<Command>>>;

/// Verbs a focused input takes over from the document.
const REDIRECTED_VERBS: [Verb; 15] = [
    Verb::Insert,
    Verb::Delete,
    Verb::LineBreak,
    Verb::Indent,
    Verb::Unindent,
    Verb::ToggleComment,
    Verb::Undo,
    Verb::Redo,
    Verb::Move,
    Verb::SelectAll,
    Verb::ExpandToBrackets,
    Verb::ExpandToPath,
    Verb::Copy,
    Verb::Cut,
    Verb::Paste,
];

/// Pre-hooks that divert a space's editing verbs to a focused input.
#[derive(Debug)]
pub struct InputHooks {
    space: SpaceId,
    ids: Vec<HookId>,
    queue: InputQueue,
}

impl InputHooks {
    /// Install the redirecting hooks for `space`.
    pub fn install(overrides: &mut Overrides, space: SpaceId) -> Self {
        let queue: InputQueue = Rc::default();
        let ids = REDIRECTED_VERBS
            .iter()
            .map(|verb| {
                let queue = Rc::clone(&queue);
                overrides.add_pre(*verb, HookScope::Space(space), move |ctx| {
                    queue
                        .try_borrow_mut()
                        .map_err(|err| HookError::Failed(err.to_string()))?
                        .push_back(ctx.command.clone());
                    Ok(HookOutcome::Handled)
                })
            })
            .collect();
        tracing::debug!(%space, "input hooks installed");
        Self { space, ids, queue }
    }

    /// Space the hooks guard.
    pub fn space(&self) -> SpaceId {
        self.space
    }

    /// Take the queued commands.
    pub fn drain(&self) -> Vec<Command> {
        match self.queue.try_borrow_mut() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Remove the hooks.
    pub fn remove(self, overrides: &mut Overrides) {
        for id in self.ids {
            overrides.remove(id);
        }
        tracing::debug!(space = %self.space, "input hooks removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caret_core::MemoryClipboard;

    fn input(s: &str) -> Input {
        let mut input = Input::new("hint");
        input.set_string(s, true);
        input
    }

    #[test]
    fn test_write_replaces_selection_and_flattens_lines() {
        let mut i = input("hello world");
        i.set_cursor(6, false);
        i.set_cursor(11, true);
        assert!(i.write("there\nfriend"));
        assert_eq!(i.text(), "hello there friend");
        assert_eq!(i.focus(), 18);
    }

    #[test]
    fn test_delete_modes() {
        let mut i = input("foo bar baz");
        assert!(i.delete(DeleteMode::PreviousWord));
        assert_eq!(i.text(), "foo bar");
        assert!(i.delete(DeleteMode::PreviousChar));
        assert_eq!(i.text(), "foo ba");
        i.set_cursor(0, false);
        assert!(i.delete(DeleteMode::NextWord));
        assert_eq!(i.text(), " ba");
        assert!(i.delete(DeleteMode::NextChar));
        assert_eq!(i.text(), "ba");
        i.set_cursor(2, false);
        assert!(!i.delete(DeleteMode::NextChar));
    }

    #[test]
    fn test_navigate_collapses_selection() {
        let mut i = input("abcdef");
        i.set_cursor(1, false);
        i.set_cursor(4, true);
        assert!(i.navigate(InputMotion::Left, false));
        assert_eq!((i.anchor(), i.focus()), (1, 1));
        i.navigate(InputMotion::End, true);
        assert_eq!(i.selected_text(), "bcdef");
        assert!(!i.navigate(InputMotion::End, true));
    }

    #[test]
    fn test_typing_undoes_as_one_burst() {
        let mut i = input("");
        for ch in ["a", "b", "c"] {
            i.write(ch);
        }
        assert_eq!(i.undo_depth(), 2);
        assert!(i.undo());
        assert_eq!(i.text(), "a");
        assert!(i.undo());
        assert_eq!(i.text(), "");
        assert!(!i.undo());
        assert!(i.redo());
        assert!(i.redo());
        assert_eq!(i.text(), "abc");
    }

    #[test]
    fn test_clipboard_round_trip() {
        let mut clipboard = MemoryClipboard::new();
        let mut i = input("copy me");
        assert!(!i.copy(&mut clipboard).unwrap());
        i.select_all();
        assert!(i.cut(&mut clipboard).unwrap());
        assert_eq!(i.text(), "");
        assert!(i.paste(&mut clipboard).unwrap());
        assert!(i.paste(&mut clipboard).unwrap());
        assert_eq!(i.text(), "copy mecopy me");
    }

    #[test]
    fn test_focus_lost_collapses_full_selection() {
        let mut i = input("abc");
        i.focus_gained();
        i.select_all();
        i.focus_lost();
        assert!(!i.is_focused());
        assert_eq!((i.anchor(), i.focus()), (3, 3));

        i.set_cursor(1, false);
        i.set_cursor(2, true);
        i.focus_lost();
        assert_eq!((i.anchor(), i.focus()), (1, 2));
    }

    #[test]
    fn test_set_string_keeps_history_unless_reset() {
        let mut i = input("one");
        i.set_string("two", false);
        assert!(i.undo());
        assert_eq!(i.text(), "one");
        i.set_string("three", true);
        assert!(!i.undo());
    }
}
