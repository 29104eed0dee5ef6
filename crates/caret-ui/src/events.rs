//! Host input events.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Alt / Option.
    pub alt: bool,
    /// Control.
    pub ctrl: bool,
    /// Shift.
    pub shift: bool,
    /// Super / Command / Windows.
    pub oskey: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        alt: false,
        ctrl: false,
        shift: false,
        oskey: false,
    };
    /// Alt alone.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
    /// Control alone.
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
    /// Shift alone.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// These modifiers plus shift.
    pub const fn with_shift(self) -> Self {
        Self {
            shift: true,
            ..self
        }
    }
}

/// A key, independent of layout-produced text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable key, lowercase.
    Char(char),
    /// Escape.
    Escape,
    /// Return.
    Enter,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Function key.
    F(u8),
}

/// Error for a key name that does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key `{0}`")]
pub struct UnknownKey(pub String);

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let key = match lower.as_str() {
            "esc" | "escape" => Key::Escape,
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            "home" => Key::Home,
            "end" => Key::End,
            "page_up" | "pageup" => Key::PageUp,
            "page_down" | "pagedown" => Key::PageDown,
            "space" => Key::Char(' '),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Key::Char(ch),
                    (Some('f'), Some(_)) => other[1..]
                        .parse()
                        .ok()
                        .filter(|n| (1..=24).contains(n))
                        .map(Key::F)
                        .ok_or_else(|| UnknownKey(s.to_string()))?,
                    _ => return Err(UnknownKey(s.to_string())),
                }
            }
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => f.write_str("space"),
            Key::Char(ch) => write!(f, "{ch}"),
            Key::Escape => f.write_str("esc"),
            Key::Enter => f.write_str("enter"),
            Key::Tab => f.write_str("tab"),
            Key::Backspace => f.write_str("backspace"),
            Key::Delete => f.write_str("delete"),
            Key::Left => f.write_str("left"),
            Key::Right => f.write_str("right"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
            Key::Home => f.write_str("home"),
            Key::End => f.write_str("end"),
            Key::PageUp => f.write_str("page_up"),
            Key::PageDown => f.write_str("page_down"),
            Key::F(n) => write!(f, "f{n}"),
        }
    }
}

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
}

/// One host event, in region coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A key went down (or auto-repeated).
    KeyPress {
        /// The key.
        key: Key,
        /// Held modifiers.
        modifiers: Modifiers,
        /// Text the key produced, if any.
        text: String,
        /// Auto-repeat.
        repeat: bool,
    },
    /// A mouse button went down.
    MousePress {
        /// The button.
        button: MouseButton,
        /// Pointer position.
        at: Point,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// A mouse button went up.
    MouseRelease {
        /// The button.
        button: MouseButton,
        /// Pointer position.
        at: Point,
    },
    /// Second press of a double click.
    DoubleClick {
        /// Pointer position.
        at: Point,
    },
    /// Third press of a triple click.
    TripleClick {
        /// Pointer position.
        at: Point,
    },
    /// The pointer moved.
    MouseMove {
        /// Pointer position.
        at: Point,
    },
    /// Wheel ticks; negative scrolls up.
    Wheel {
        /// Number of ticks.
        ticks: i32,
        /// Pointer position.
        at: Point,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// Redraw timer fired.
    Timer,
    /// The window lost focus.
    WindowDeactivate,
}

impl Event {
    /// A key press with no text and no repeat.
    pub fn key(key: Key, modifiers: Modifiers) -> Self {
        Event::KeyPress {
            key,
            modifiers,
            text: String::new(),
            repeat: false,
        }
    }

    /// A typed character.
    pub fn typed(ch: char) -> Self {
        Event::KeyPress {
            key: Key::Char(ch.to_ascii_lowercase()),
            modifiers: Modifiers::NONE,
            text: ch.to_string(),
            repeat: false,
        }
    }

    /// Pointer position of mouse events.
    pub fn position(&self) -> Option<Point> {
        match self {
            Event::MousePress { at, .. }
            | Event::MouseRelease { at, .. }
            | Event::DoubleClick { at }
            | Event::TripleClick { at }
            | Event::MouseMove { at }
            | Event::Wheel { at, .. } => Some(*at),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_parse_and_print() {
        assert_eq!("A".parse::<Key>().unwrap(), Key::Char('a'));
        assert_eq!("Esc".parse::<Key>().unwrap(), Key::Escape);
        assert_eq!("f12".parse::<Key>().unwrap(), Key::F(12));
        assert_eq!("f".parse::<Key>().unwrap(), Key::Char('f'));
        assert!("f99".parse::<Key>().is_err());
        assert!("hyper".parse::<Key>().is_err());
        for key in [Key::Char(' '), Key::PageDown, Key::F(3), Key::Char('x')] {
            assert_eq!(key.to_string().parse::<Key>().unwrap(), key);
        }
    }
}
