//! Key bindings.
//!
//! A [`Keymap`] is a flat table of `(context, action, trigger, value, modifiers, options)`
//! rows. Lookup walks the requested contexts from most to least specific and, within a
//! context, prefers the row added last, so user bindings loaded over the defaults win.
//!
//! Bindings load from TOML:
//!
//! ```toml
//! [[binding]]
//! context = "text"
//! action = "expand_to_brackets"
//! trigger = "a"
//! modifiers = { alt = true }
//! repeat = true
//! ```

use crate::events::{Key, Modifiers, UnknownKey};
use caret_core::{
    ClipboardCommand, Command, CursorCommand, DeleteMode, EditCommand, Motion, ViewCommand,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Key map errors.
#[derive(Debug, Error)]
pub enum KeymapError {
    /// The TOML did not parse.
    #[error("failed to parse key map: {0}")]
    Parse(#[from] toml::de::Error),
    /// The key map could not be serialized.
    #[error("failed to serialize key map: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where a binding applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyContext {
    /// The document text area.
    Text,
    /// Text-like widgets in general, including inputs.
    TextGeneric,
    /// Any editor space.
    ScreenEditing,
    /// Panning views.
    View2D,
    /// Anywhere in the window.
    Window,
}

/// What fires a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Trigger {
    /// A key press.
    Key(Key),
    /// Wheel towards the top of the document.
    WheelUp,
    /// Wheel towards the bottom.
    WheelDown,
    /// Primary button press.
    LeftMouse,
    /// Pointer motion.
    MouseMove,
}

impl FromStr for Trigger {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wheel_up" => Ok(Trigger::WheelUp),
            "wheel_down" => Ok(Trigger::WheelDown),
            "left_mouse" => Ok(Trigger::LeftMouse),
            "mouse_move" => Ok(Trigger::MouseMove),
            key => key.parse().map(Trigger::Key),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Key(key) => key.fmt(f),
            Trigger::WheelUp => f.write_str("wheel_up"),
            Trigger::WheelDown => f.write_str("wheel_down"),
            Trigger::LeftMouse => f.write_str("left_mouse"),
            Trigger::MouseMove => f.write_str("mouse_move"),
        }
    }
}

impl TryFrom<String> for Trigger {
    type Error = UnknownKey;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Trigger> for String {
    fn from(trigger: Trigger) -> Self {
        trigger.to_string()
    }
}

/// Bindable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
    DocumentStart,
    DocumentEnd,
    SelectAll,
    /// Insert the text the key produced.
    InsertText,
    DeletePreviousChar,
    DeleteNextChar,
    DeletePreviousWord,
    DeleteNextWord,
    LineBreak,
    Indent,
    Unindent,
    ToggleComment,
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    ExpandToBrackets,
    ExpandToPath,
    /// Scroll by the binding's value, or by the wheel ticks for wheel triggers.
    ScrollLines,
    /// Open the host's search UI.
    Search,
    /// Close the top overlay or defocus the input; passes through otherwise.
    Dismiss,
    /// Route the press through the widget hit test before the text area.
    UiMouse,
    /// Track pointer region changes.
    UiLeaveHandler,
}

impl Action {
    /// The editor command this action runs, if it maps to one.
    ///
    /// `select` extends the selection for motions; `value` feeds [`Action::ScrollLines`];
    /// `text` feeds [`Action::InsertText`].
    pub fn command(self, select: bool, value: i32, text: &str) -> Option<Command> {
        let motion = |motion| Some(Command::Cursor(CursorCommand::Move { motion, select }));
        let edit = |cmd| Some(Command::Edit(cmd));
        let delete = |mode| edit(EditCommand::Delete { mode });
        match self {
            Action::MoveLeft => motion(Motion::Left),
            Action::MoveRight => motion(Motion::Right),
            Action::MoveUp => motion(Motion::Up),
            Action::MoveDown => motion(Motion::Down),
            Action::WordLeft => motion(Motion::WordLeft),
            Action::WordRight => motion(Motion::WordRight),
            Action::LineStart => motion(Motion::LineStart),
            Action::LineEnd => motion(Motion::LineEnd),
            Action::PageUp => motion(Motion::PageUp),
            Action::PageDown => motion(Motion::PageDown),
            Action::DocumentStart => motion(Motion::DocumentStart),
            Action::DocumentEnd => motion(Motion::DocumentEnd),
            Action::SelectAll => Some(Command::Cursor(CursorCommand::SelectAll)),
            Action::InsertText if text.is_empty() => None,
            Action::InsertText => edit(EditCommand::Insert {
                text: text.to_string(),
            }),
            Action::DeletePreviousChar => delete(DeleteMode::PreviousChar),
            Action::DeleteNextChar => delete(DeleteMode::NextChar),
            Action::DeletePreviousWord => delete(DeleteMode::PreviousWord),
            Action::DeleteNextWord => delete(DeleteMode::NextWord),
            Action::LineBreak => edit(EditCommand::LineBreak),
            Action::Indent => edit(EditCommand::Indent),
            Action::Unindent => edit(EditCommand::Unindent),
            Action::ToggleComment => edit(EditCommand::ToggleComment),
            Action::Undo => edit(EditCommand::Undo),
            Action::Redo => edit(EditCommand::Redo),
            Action::Copy => Some(Command::Clipboard(ClipboardCommand::Copy)),
            Action::Cut => Some(Command::Clipboard(ClipboardCommand::Cut)),
            Action::Paste => Some(Command::Clipboard(ClipboardCommand::Paste)),
            Action::ExpandToBrackets => Some(Command::Cursor(CursorCommand::ExpandToBrackets)),
            Action::ExpandToPath => Some(Command::Cursor(CursorCommand::ExpandToPath)),
            Action::ScrollLines => Some(Command::View(ViewCommand::ScrollLines {
                lines: f64::from(value),
            })),
            Action::Search | Action::Dismiss | Action::UiMouse | Action::UiLeaveHandler => None,
        }
    }
}

/// One row of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Where it applies.
    pub context: KeyContext,
    /// What it does.
    pub action: Action,
    /// What fires it.
    pub trigger: Trigger,
    /// Action argument (lines for `scroll_lines`).
    #[serde(default)]
    pub value: i32,
    /// Required modifiers, matched exactly.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Fire on key auto-repeat too.
    #[serde(default)]
    pub repeat: bool,
    /// Motions extend the selection.
    #[serde(default)]
    pub select: bool,
}

impl Binding {
    /// A binding with no value, no modifiers and no options.
    pub const fn new(context: KeyContext, action: Action, trigger: Trigger) -> Self {
        Self {
            context,
            action,
            trigger,
            value: 0,
            modifiers: Modifiers::NONE,
            repeat: false,
            select: false,
        }
    }

    /// Require `modifiers`.
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the action argument.
    pub const fn with_value(mut self, value: i32) -> Self {
        self.value = value;
        self
    }

    /// Fire on auto-repeat.
    pub const fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Extend the selection.
    pub const fn selecting(mut self) -> Self {
        self.select = true;
        self
    }

    /// The editor command for this binding.
    pub fn command(&self, text: &str) -> Option<Command> {
        self.action.command(self.select, self.value, text)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeymapFile {
    #[serde(default)]
    binding: Vec<Binding>,
}

/// The binding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Keymap {
    /// An empty table.
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// The default table.
    pub fn with_defaults() -> Self {
        use Action as A;
        use KeyContext::{ScreenEditing, Text, TextGeneric, Window};
        use Trigger::Key as K;

        let mut bindings = vec![
            Binding::new(Text, A::ExpandToBrackets, K(Key::Char('a')))
                .with_modifiers(Modifiers::ALT)
                .repeating(),
            Binding::new(Text, A::ScrollLines, Trigger::WheelUp).with_modifiers(Modifiers::ALT),
            Binding::new(Text, A::ScrollLines, Trigger::WheelDown).with_modifiers(Modifiers::ALT),
            Binding::new(Text, A::ScrollLines, Trigger::WheelUp),
            Binding::new(Text, A::ScrollLines, Trigger::WheelDown),
            Binding::new(TextGeneric, A::Search, K(Key::Char('f'))).with_modifiers(Modifiers::CTRL),
            Binding::new(Text, A::Dismiss, K(Key::Escape)),
            Binding::new(ScreenEditing, A::UiMouse, Trigger::LeftMouse),
            Binding::new(Window, A::UiLeaveHandler, Trigger::MouseMove),
        ];

        let motions = [
            (Key::Left, Modifiers::NONE, A::MoveLeft),
            (Key::Right, Modifiers::NONE, A::MoveRight),
            (Key::Up, Modifiers::NONE, A::MoveUp),
            (Key::Down, Modifiers::NONE, A::MoveDown),
            (Key::Left, Modifiers::CTRL, A::WordLeft),
            (Key::Right, Modifiers::CTRL, A::WordRight),
            (Key::Home, Modifiers::NONE, A::LineStart),
            (Key::End, Modifiers::NONE, A::LineEnd),
            (Key::PageUp, Modifiers::NONE, A::PageUp),
            (Key::PageDown, Modifiers::NONE, A::PageDown),
            (Key::Home, Modifiers::CTRL, A::DocumentStart),
            (Key::End, Modifiers::CTRL, A::DocumentEnd),
        ];
        for (key, mods, action) in motions {
            bindings.push(Binding::new(Text, action, K(key)).with_modifiers(mods).repeating());
            bindings.push(
                Binding::new(Text, action, K(key))
                    .with_modifiers(mods.with_shift())
                    .repeating()
                    .selecting(),
            );
        }

        let edits = [
            (Key::Backspace, Modifiers::NONE, A::DeletePreviousChar, true),
            (Key::Delete, Modifiers::NONE, A::DeleteNextChar, true),
            (Key::Backspace, Modifiers::CTRL, A::DeletePreviousWord, true),
            (Key::Delete, Modifiers::CTRL, A::DeleteNextWord, true),
            (Key::Enter, Modifiers::NONE, A::LineBreak, true),
            (Key::Tab, Modifiers::NONE, A::Indent, true),
            (Key::Tab, Modifiers::SHIFT, A::Unindent, true),
            (Key::Char('/'), Modifiers::CTRL, A::ToggleComment, false),
            (Key::Char('z'), Modifiers::CTRL, A::Undo, true),
            (Key::Char('z'), Modifiers::CTRL.with_shift(), A::Redo, true),
            (Key::Char('y'), Modifiers::CTRL, A::Redo, true),
            (Key::Char('a'), Modifiers::CTRL, A::SelectAll, false),
            (Key::Char('c'), Modifiers::CTRL, A::Copy, false),
            (Key::Char('x'), Modifiers::CTRL, A::Cut, false),
            (Key::Char('v'), Modifiers::CTRL, A::Paste, false),
            (Key::Char('e'), Modifiers::ALT, A::ExpandToPath, true),
        ];
        for (key, mods, action, repeat) in edits {
            let binding = Binding::new(Text, action, K(key)).with_modifiers(mods);
            bindings.push(if repeat { binding.repeating() } else { binding });
        }
        bindings.push(
            Binding::new(Text, A::ScrollLines, K(Key::Up))
                .with_modifiers(Modifiers::CTRL)
                .with_value(-1)
                .repeating(),
        );
        bindings.push(
            Binding::new(Text, A::ScrollLines, K(Key::Down))
                .with_modifiers(Modifiers::CTRL)
                .with_value(1)
                .repeating(),
        );
        Self { bindings }
    }

    /// Parse a table from TOML (`[[binding]]` rows).
    pub fn from_toml_str(content: &str) -> Result<Self, KeymapError> {
        let file: KeymapFile = toml::from_str(content)?;
        Ok(Self {
            bindings: file.binding,
        })
    }

    /// Serialize the table to TOML.
    pub fn to_toml_string(&self) -> Result<String, KeymapError> {
        let file = KeymapFile {
            binding: self.bindings.clone(),
        };
        Ok(toml::to_string(&file)?)
    }

    /// Add the rows of a TOML table after the existing ones, so they take precedence.
    pub fn merge_toml_str(&mut self, content: &str) -> Result<usize, KeymapError> {
        let file: KeymapFile = toml::from_str(content)?;
        let added = file.binding.len();
        self.bindings.extend(file.binding);
        tracing::debug!(added, total = self.bindings.len(), "key bindings merged");
        Ok(added)
    }

    /// Add a row that takes precedence over existing ones.
    pub fn bind(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    /// Remove every row for `trigger` with `modifiers` in `context`.
    pub fn unbind(&mut self, context: KeyContext, trigger: Trigger, modifiers: Modifiers) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| {
            !(b.context == context && b.trigger == trigger && b.modifiers == modifiers)
        });
        before - self.bindings.len()
    }

    /// All rows, in insertion order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Find the binding for `trigger` with exactly `modifiers`.
    ///
    /// `contexts` is ordered most specific first. Auto-repeated presses only match rows
    /// marked `repeat`.
    pub fn lookup(
        &self,
        contexts: &[KeyContext],
        trigger: Trigger,
        modifiers: Modifiers,
        repeat: bool,
    ) -> Option<&Binding> {
        contexts.iter().find_map(|context| {
            self.bindings.iter().rev().find(|b| {
                b.context == *context
                    && b.trigger == trigger
                    && b.modifiers == modifiers
                    && (!repeat || b.repeat)
            })
        })
    }
}
