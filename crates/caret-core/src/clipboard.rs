//! Clipboard access.
//!
//! The system clipboard belongs to the host; the engine only sees this trait.

use thiserror::Error;

/// Errors reported by a clipboard backend.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The backend could not be reached.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// A text clipboard.
pub trait Clipboard {
    /// Current clipboard text (empty if none).
    fn get(&mut self) -> Result<String, ClipboardError>;
    /// Replace the clipboard text.
    fn set(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-process clipboard, used by tests and headless hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    text: String,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clipboard holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Current contents.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Clipboard for MemoryClipboard {
    fn get(&mut self) -> Result<String, ClipboardError> {
        Ok(self.text.clone())
    }

    fn set(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.text = text.to_string();
        Ok(())
    }
}
