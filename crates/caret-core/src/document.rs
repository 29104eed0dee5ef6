//! Document model: a rope-backed text buffer with per-column format bytes, a four-index cursor,
//! file metadata and a stable 31-bit identity.
//!
//! Columns are `char` indices. Every line carries a *format* byte string of the same length as
//! its body; each byte is the lexical class of the character in that column as reported by the
//! host lexer. Characters written by the editor get [`FALLBACK_FORMAT`] until the host re-lexes.

use crate::cursor::{Cursor, Position};
use crate::line_ending::LineEnding;
use crate::text;
use ropey::Rope;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Format byte used for columns the host has not classified.
pub const FALLBACK_FORMAT: u8 = b'q';

/// Format byte the host lexer uses for string literals.
pub const LITERAL_FORMAT: u8 = b'l';

const ID_MASK: u32 = 0x7FFF_FFFF;

/// Stable 31-bit document identity.
///
/// The id is stored on the document itself (the host persists it as a property) so undo stacks
/// kept in memory across a reload can be re-associated with the reloaded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u32);

impl DocumentId {
    /// Create an id from a raw value; the top bit is discarded.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw & ID_MASK)
    }

    /// The raw 31-bit value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a document indents with spaces or tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndentType {
    /// Indent with `tab_width` spaces per level.
    #[default]
    Spaces,
    /// Indent with one `'\t'` per level.
    Tabs,
}

impl IndentType {
    /// Guess the indent type from existing text: tabs win only if more indented lines start with
    /// a tab than with a space.
    pub fn detect_in_text(text: &str) -> Self {
        let (mut tabs, mut spaces) = (0usize, 0usize);
        for line in text.lines() {
            match line.chars().next() {
                Some('\t') => tabs += 1,
                Some(' ') => spaces += 1,
                _ => {}
            }
        }
        if tabs > spaces { Self::Tabs } else { Self::Spaces }
    }
}

/// Errors raised by documents and the document store.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Reading or writing the backing file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The document has no backing file.
    #[error("document has no path")]
    NoPath,
    /// An id was assigned twice. The registry is inconsistent.
    #[error("document id {0} is already assigned")]
    DuplicateId(DocumentId),
    /// No document with this id exists.
    #[error("unknown document {0}")]
    UnknownId(DocumentId),
}

/// One line of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line text without the trailing newline.
    pub body: String,
    /// One format byte per char of `body`.
    pub format: Vec<u8>,
}

/// Captured text and format state, used by undo steps.
///
/// Cloning a [`Rope`] shares its nodes, so snapshots of large documents are cheap.
#[derive(Debug, Clone)]
pub struct DocSnapshot {
    body: Rope,
    formats: Vec<Vec<u8>>,
}

impl DocSnapshot {
    /// The captured text.
    pub fn text(&self) -> String {
        self.body.to_string()
    }
}

impl PartialEq for DocSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body && self.formats == other.formats
    }
}

/// A text document.
#[derive(Debug, Clone)]
pub struct Document {
    id: Option<DocumentId>,
    name: String,
    body: Rope,
    formats: Vec<Vec<u8>>,
    cursor: Cursor,
    path: Option<PathBuf>,
    mtime: Option<SystemTime>,
    dirty: bool,
    indent_type: IndentType,
    tab_width: usize,
    line_ending: LineEnding,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("untitled")
    }
}

impl Document {
    /// Create an empty document (one empty line).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            body: Rope::new(),
            formats: vec![Vec::new()],
            cursor: Cursor::default(),
            path: None,
            mtime: None,
            dirty: false,
            indent_type: IndentType::Spaces,
            tab_width: 4,
            line_ending: LineEnding::Lf,
        }
    }

    /// Create a document holding `text`. The cursor starts at (0, 0).
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let mut doc = Self::new(name);
        doc.from_string(text);
        doc.dirty = false;
        doc
    }

    /// Load a document from disk. CRLF files are normalized and remembered as such.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut doc = Self::from_text(name, &raw);
        doc.line_ending = LineEnding::detect_in_text(&raw);
        doc.indent_type = IndentType::detect_in_text(&raw);
        doc.path = Some(path.to_path_buf());
        doc.mtime = file_mtime(path);
        tracing::debug!(path = %path.display(), lines = doc.num_lines(), "opened document");
        Ok(doc)
    }

    /// Write the document back to its path with its original line ending.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let path = self.path.clone().ok_or(DocumentError::NoPath)?;
        self.save_as(path)
    }

    /// Write the document to `path` and make it the document's path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let out = self.line_ending.apply_to_text(&self.text());
        std::fs::write(path, out).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.path = Some(path.to_path_buf());
        self.mtime = file_mtime(path);
        self.dirty = false;
        Ok(())
    }

    /// The document id, if one has been assigned.
    pub fn id(&self) -> Option<DocumentId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }

    /// Assign a stored id, as a host does when it deserializes a document property.
    pub fn with_stored_id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Modification time of the backing file when it was last read or written.
    pub fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    /// Returns `true` if the text changed since it was opened or saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Set or clear the dirty flag.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Indent style.
    pub fn indent_type(&self) -> IndentType {
        self.indent_type
    }

    /// Change the indent style.
    pub fn set_indent_type(&mut self, indent_type: IndentType) {
        self.indent_type = indent_type;
    }

    /// Tab width in cells (at least 1).
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Change the tab width. Zero is treated as one.
    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.tab_width = tab_width.max(1);
    }

    /// One indent level: a tab, or `tab_width` spaces.
    pub fn indent_unit(&self) -> String {
        match self.indent_type {
            IndentType::Tabs => "\t".to_string(),
            IndentType::Spaces => " ".repeat(self.tab_width),
        }
    }

    /// Line ending used on save.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Change the line ending used on save.
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    /// Number of lines (always at least 1).
    pub fn num_lines(&self) -> usize {
        self.body.len_lines()
    }

    /// Length in chars of line `i` (0 for lines past the end).
    pub fn line_len(&self, i: usize) -> usize {
        if i >= self.num_lines() {
            return 0;
        }
        let slice = self.body.line(i);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Text of line `i` without its newline. Lines past the end read as empty.
    pub fn line_text(&self, i: usize) -> String {
        if i >= self.num_lines() {
            return String::new();
        }
        let mut s = self.body.line(i).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

    /// Format bytes of line `i`, padded with [`FALLBACK_FORMAT`] to the body length.
    pub fn format_line(&self, i: usize) -> Vec<u8> {
        let len = self.line_len(i);
        let mut format = self.formats.get(i).cloned().unwrap_or_default();
        format.resize(len, FALLBACK_FORMAT);
        format
    }

    /// Body and format of line `i`.
    pub fn line(&self, i: usize) -> Line {
        Line {
            body: self.line_text(i),
            format: self.format_line(i),
        }
    }

    /// All lines as strings.
    pub fn lines(&self) -> Vec<String> {
        (0..self.num_lines()).map(|i| self.line_text(i)).collect()
    }

    /// Whole text joined with `'\n'`.
    pub fn text(&self) -> String {
        self.body.to_string()
    }

    /// Char at `pos`, or `None` at end of line.
    pub fn char_at(&self, pos: Position) -> Option<char> {
        if pos.line >= self.num_lines() || pos.column >= self.line_len(pos.line) {
            return None;
        }
        Some(self.body.char(self.body.line_to_char(pos.line) + pos.column))
    }

    /// Format byte at `pos`, or `None` at end of line.
    pub fn format_at(&self, pos: Position) -> Option<u8> {
        if pos.column >= self.line_len(pos.line) {
            return None;
        }
        Some(
            self.formats
                .get(pos.line)
                .and_then(|f| f.get(pos.column).copied())
                .unwrap_or(FALLBACK_FORMAT),
        )
    }

    /// Replace the host-provided format bytes of line `i`.
    ///
    /// Short input reads back padded with the fallback byte; extra bytes are dropped.
    pub fn set_format(&mut self, i: usize, format: &[u8]) {
        if i >= self.num_lines() {
            return;
        }
        let len = self.line_len(i);
        let mut format = format.to_vec();
        format.resize(len, FALLBACK_FORMAT);
        self.formats[i] = format;
    }

    /// Clamp a position into the document.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.num_lines() - 1);
        Position::new(line, pos.column.min(self.line_len(line)))
    }

    /// The current cursor.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Set the cursor; out-of-range indices are clamped.
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = Cursor::from_positions(self.clamp(cursor.anchor), self.clamp(cursor.focus));
    }

    /// Select from `(al, ac)` to `(fl, fc)`; indices are clamped.
    pub fn select_set(&mut self, al: usize, ac: usize, fl: usize, fc: usize) {
        self.set_cursor(Cursor::new(al, ac, fl, fc));
    }

    /// Place a caret with both ends at `(line, column)`.
    pub fn select_caret(&mut self, line: usize, column: usize) {
        self.select_set(line, column, line, column);
    }

    /// Text between two positions (in any order), lines joined with `'\n'`.
    pub fn string_from(&self, al: usize, ac: usize, fl: usize, fc: usize) -> String {
        let (start, end) = Cursor::new(al, ac, fl, fc).sorted();
        let (start, end) = (self.clamp(start), self.clamp(end));
        self.body
            .slice(self.char_index(start)..self.char_index(end))
            .to_string()
    }

    /// Format bytes between two positions, lines joined with `b'\n'`.
    pub fn format_from(&self, al: usize, ac: usize, fl: usize, fc: usize) -> Vec<u8> {
        let (start, end) = Cursor::new(al, ac, fl, fc).sorted();
        let (start, end) = (self.clamp(start), self.clamp(end));
        let mut out = Vec::new();
        for line in start.line..=end.line {
            if line > start.line {
                out.push(b'\n');
            }
            let format = self.format_line(line);
            let from = if line == start.line { start.column } else { 0 };
            let to = if line == end.line {
                end.column
            } else {
                format.len()
            };
            out.extend_from_slice(&format[from.min(to)..to]);
        }
        out
    }

    /// Text of the current selection.
    pub fn selected_text(&self) -> String {
        let (al, ac, fl, fc) = self.cursor.as_tuple();
        self.string_from(al, ac, fl, fc)
    }

    /// Replace the current selection with `s` and place the caret after the insertion.
    pub fn write(&mut self, s: &str) {
        let (start, end) = self.cursor.sorted();
        let after = self.replace(start, end, s);
        self.cursor = Cursor::from_positions(after, after);
    }

    /// Replace the range `start..end` (any order) with `s`.
    ///
    /// Returns the position right after the inserted text. The cursor is only clamped; callers
    /// place it explicitly.
    pub fn replace(&mut self, start: Position, end: Position, s: &str) -> Position {
        let (start, end) = Cursor::from_positions(start, end).sorted();
        let (start, end) = (self.clamp(start), self.clamp(end));
        let normalized;
        let s = if s.contains('\r') {
            normalized = LineEnding::normalize(s);
            normalized.as_str()
        } else {
            s
        };

        let head_format = self.format_line(start.line)[..start.column].to_vec();
        let tail_format = self.format_line(end.line)[end.column..].to_vec();

        let from = self.char_index(start);
        let to = self.char_index(end);
        if from < to {
            self.body.remove(from..to);
        }
        if !s.is_empty() {
            self.body.insert(from, s);
        }

        let inserted = text::split_lines(s);
        let mut new_formats = Vec::with_capacity(inserted.len());
        let last = inserted.len() - 1;
        for (i, piece) in inserted.iter().enumerate() {
            let mut format = if i == 0 {
                head_format.clone()
            } else {
                Vec::new()
            };
            format.extend(std::iter::repeat_n(FALLBACK_FORMAT, text::char_len(piece)));
            if i == last {
                format.extend_from_slice(&tail_format);
            }
            new_formats.push(format);
        }
        self.formats
            .splice(start.line..=end.line.min(self.formats.len() - 1), new_formats);
        // Keep formats aligned with lines if the host never set them.
        self.formats.resize(self.num_lines(), Vec::new());

        let after = if last == 0 {
            Position::new(start.line, start.column + text::char_len(s))
        } else {
            Position::new(start.line + last, text::char_len(inserted[last]))
        };
        self.dirty = true;
        let cursor = self.cursor;
        self.set_cursor(cursor);
        after
    }

    /// Insert `s` at `pos` without touching the selection. Returns the end of the insertion.
    pub fn insert_at(&mut self, pos: Position, s: &str) -> Position {
        self.replace(pos, pos, s)
    }

    /// Replace the whole body. Formats reset to the fallback and the cursor is clamped.
    pub fn from_string(&mut self, s: &str) {
        let s = LineEnding::normalize(s);
        self.body = Rope::from_str(&s);
        self.formats = vec![Vec::new(); self.num_lines()];
        self.dirty = true;
        let cursor = self.cursor;
        self.set_cursor(cursor);
    }

    /// Capture the text and format state.
    pub fn snapshot(&self) -> DocSnapshot {
        DocSnapshot {
            body: self.body.clone(),
            formats: self.formats.clone(),
        }
    }

    /// Restore a captured state. The cursor is clamped to the restored text.
    pub fn restore(&mut self, snapshot: &DocSnapshot) {
        self.body = snapshot.body.clone();
        self.formats = snapshot.formats.clone();
        self.formats.resize(self.num_lines(), Vec::new());
        self.dirty = true;
        let cursor = self.cursor;
        self.set_cursor(cursor);
    }

    fn char_index(&self, pos: Position) -> usize {
        self.body.line_to_char(pos.line) + pos.column
    }
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Result of checking a document's stored id against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStatus {
    /// The id is set and not used by any other document.
    Valid(DocumentId),
    /// No id has been assigned yet.
    Missing,
    /// The id is already used by another document (e.g. after a host duplicated it).
    Collision(DocumentId),
}

/// Tracks which document ids are in use and hands out fresh ones.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    used: BTreeSet<DocumentId>,
    next: u32,
}

impl IdRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a stored id.
    pub fn status(&self, id: Option<DocumentId>) -> IdStatus {
        match id {
            None => IdStatus::Missing,
            Some(id) if self.used.contains(&id) => IdStatus::Collision(id),
            Some(id) => IdStatus::Valid(id),
        }
    }

    /// Allocate an unused id. The id is not claimed until [`IdRegistry::claim`].
    pub fn allocate(&mut self) -> DocumentId {
        loop {
            let candidate = DocumentId::from_raw(self.next);
            self.next = (self.next + 1) & ID_MASK;
            if !self.used.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Mark `id` as used. Claiming an id twice is a registry inconsistency.
    pub fn claim(&mut self, id: DocumentId) -> Result<(), DocumentError> {
        if !self.used.insert(id) {
            return Err(DocumentError::DuplicateId(id));
        }
        Ok(())
    }

    /// Forget `id`.
    pub fn release(&mut self, id: DocumentId) {
        self.used.remove(&id);
    }

    /// Returns `true` if `id` is in use.
    pub fn contains(&self, id: DocumentId) -> bool {
        self.used.contains(&id)
    }
}

/// Owns every open document, keyed by id.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: BTreeMap<DocumentId, Document>,
    registry: IdRegistry,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, keeping its stored id when valid.
    ///
    /// Documents without an id, or whose id collides with another document, get a fresh one.
    pub fn insert(&mut self, mut doc: Document) -> Result<DocumentId, DocumentError> {
        let id = match self.registry.status(doc.id()) {
            IdStatus::Valid(id) => id,
            IdStatus::Missing => self.registry.allocate(),
            IdStatus::Collision(old) => {
                let fresh = self.registry.allocate();
                tracing::warn!(%old, %fresh, name = doc.name(), "document id collision, reassigned");
                fresh
            }
        };
        self.registry.claim(id)?;
        doc.set_id(id);
        self.documents.insert(id, doc);
        Ok(id)
    }

    /// Re-insert a document under exactly `id`.
    pub fn insert_with_id(&mut self, id: DocumentId, mut doc: Document) -> Result<(), DocumentError> {
        self.registry.claim(id)?;
        doc.set_id(id);
        self.documents.insert(id, doc);
        Ok(())
    }

    /// Remove (unlink) a document.
    pub fn remove(&mut self, id: DocumentId) -> Option<Document> {
        let doc = self.documents.remove(&id)?;
        self.registry.release(id);
        Some(doc)
    }

    /// Look up a document.
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Look up a document mutably.
    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    /// Returns `true` if the store holds `id`.
    pub fn contains(&self, id: DocumentId) -> bool {
        self.documents.contains_key(&id)
    }

    /// The set of ids currently held.
    pub fn ids(&self) -> BTreeSet<DocumentId> {
        self.documents.keys().copied().collect()
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no documents are held.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate over `(id, document)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (DocumentId, &Document)> {
        self.documents.iter().map(|(id, doc)| (*id, doc))
    }

    /// Drop every document.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.registry = IdRegistry::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_replaces_selection_and_moves_caret() {
        let mut doc = Document::from_text("t", "hello world");
        doc.select_set(0, 0, 0, 5);
        doc.write("bye");
        assert_eq!(doc.text(), "bye world");
        assert_eq!(doc.cursor(), Cursor::caret(0, 3));

        doc.write("\nx");
        assert_eq!(doc.lines(), vec!["bye", "x world"]);
        assert_eq!(doc.cursor(), Cursor::caret(1, 1));
        assert!(doc.is_dirty());
    }

    #[test]
    fn formats_follow_edits() {
        let mut doc = Document::from_text("t", "ab\ncd");
        doc.set_format(0, b"xy");
        doc.set_format(1, b"zw");
        doc.select_set(0, 1, 1, 1);
        doc.write("Q");
        assert_eq!(doc.line_text(0), "aQd");
        assert_eq!(doc.format_line(0), b"xqw".to_vec());
        assert_eq!(doc.num_lines(), 1);
    }

    #[test]
    fn short_formats_are_padded() {
        let mut doc = Document::from_text("t", "abc");
        doc.set_format(0, b"l");
        assert_eq!(doc.line(0).format, b"lqq".to_vec());
        assert_eq!(doc.format_at(Position::new(0, 0)), Some(LITERAL_FORMAT));
        assert_eq!(doc.format_at(Position::new(0, 3)), None);
    }

    #[test]
    fn cursor_setter_clamps() {
        let mut doc = Document::from_text("t", "ab\nc");
        doc.select_set(9, 9, 1, 7);
        assert_eq!(doc.cursor(), Cursor::caret(1, 1));
    }

    #[test]
    fn string_from_joins_lines() {
        let doc = Document::from_text("t", "one\ntwo\nthree");
        assert_eq!(doc.string_from(2, 2, 0, 1), "ne\ntwo\nth");
        assert_eq!(doc.format_from(0, 1, 1, 1), b"qq\nq".to_vec());
    }

    #[test]
    fn store_reassigns_colliding_ids() {
        let mut store = DocumentStore::new();
        let a = store.insert(Document::new("a")).unwrap();
        let b = store
            .insert(Document::new("b").with_stored_id(a))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(store.get(b).and_then(Document::id), Some(b));
        assert!(matches!(
            store.insert_with_id(a, Document::new("c")),
            Err(DocumentError::DuplicateId(id)) if id == a
        ));
    }

    #[test]
    fn ids_are_31_bit() {
        assert_eq!(DocumentId::from_raw(u32::MAX).get(), 0x7FFF_FFFF);
    }
}
