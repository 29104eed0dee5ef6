//! Linear undo/redo history with typing coalescing.
//!
//! [`LinearStack`] is generic over anything implementing [`Undoable`]; documents use it through
//! [`UndoStack`] and the single-line input widget in `caret-ui` has its own. Each [`Step`]
//! stores the state *before* an edit, so undo swaps that state back in and moves the state it
//! replaced onto the redo stack.
//!
//! The expected call sequence around an edit is:
//!
//! 1. [`LinearStack::update_cursor`] to record any caret movement since the last edit,
//! 2. [`LinearStack::push_undo`] or [`LinearStack::push_typed`],
//! 3. the edit itself,
//! 4. [`LinearStack::end_edit`].

use crate::cursor::Cursor;
use crate::document::{DocSnapshot, Document, DocumentError, DocumentId, DocumentStore};
use caret_lang::is_word_separator;
use std::collections::HashMap;
use std::fmt::Debug;

/// Default maximum number of steps kept per stack.
pub const DEFAULT_UNDO_LIMIT: usize = 512;

/// Label of the verb that pushed a step. A tag change always splits a typing burst.
pub type UndoTag = &'static str;

/// Something whose state a [`LinearStack`] can capture and restore.
pub trait Undoable {
    /// Captured content.
    type State: Clone + Debug;
    /// Captured caret/selection.
    type Cursor: Copy + PartialEq + Debug;

    /// Capture the current content.
    fn capture(&self) -> Self::State;
    /// Put captured content back.
    fn restore(&mut self, state: &Self::State);
    /// The current caret/selection.
    fn undo_cursor(&self) -> Self::Cursor;
    /// Move the caret/selection.
    fn set_undo_cursor(&mut self, cursor: Self::Cursor);
    /// Returns `true` if a non-empty selection exists.
    fn has_selection(&self) -> bool;
    /// The character just before the selection anchor on its line.
    fn char_before_anchor(&self) -> Option<char>;
}

/// Coalescing state of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoalesceState {
    /// Nothing pushed yet (or the stack was cleared).
    #[default]
    Fresh,
    /// The last step is a typing burst that later keystrokes may join.
    Typing,
    /// The next push starts a new step.
    Split,
}

/// One history entry.
#[derive(Debug, Clone)]
pub struct Step<S, C> {
    /// Content before the edit; `None` for an intermediate cursor step.
    pub state: Option<S>,
    /// Caret before the edit (or before the cursor move).
    pub cursor_before: C,
    /// Caret after the edit (or after the cursor move).
    pub cursor_after: C,
    /// Verb that produced the step.
    pub tag: UndoTag,
}

impl<S, C> Step<S, C> {
    /// Returns `true` if the step only records a cursor displacement.
    pub fn is_cursor_only(&self) -> bool {
        self.state.is_none()
    }
}

/// A linear undo/redo history. Pushing a content step clears redo.
#[derive(Debug, Clone)]
pub struct LinearStack<U: Undoable> {
    undo: Vec<Step<U::State, U::Cursor>>,
    redo: Vec<Step<U::State, U::Cursor>>,
    state: CoalesceState,
    last_cursor: Option<U::Cursor>,
    last_tag: Option<UndoTag>,
    limit: usize,
}

impl<U: Undoable> Default for LinearStack<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Undoable> LinearStack<U> {
    /// Create an empty stack with the default limit.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_UNDO_LIMIT)
    }

    /// Create an empty stack keeping at most `limit` steps.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            state: CoalesceState::Fresh,
            last_cursor: None,
            last_tag: None,
            limit: limit.max(1),
        }
    }

    /// Current coalescing state.
    pub fn coalesce_state(&self) -> CoalesceState {
        self.state
    }

    /// Number of undo steps.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps.
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Returns `true` if there is something to undo.
    pub fn poll_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Returns `true` if there is something to redo.
    pub fn poll_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Snapshot the target before a non-typing edit. Always starts a new step.
    pub fn push_undo(&mut self, target: &U, tag: UndoTag) {
        self.push_step(target, tag);
        self.state = CoalesceState::Split;
    }

    /// Snapshot the target before typing `ch`, joining the current burst when possible.
    ///
    /// A keystroke joins the previous step only while the stack is in [`CoalesceState::Typing`],
    /// the tag is unchanged, the caret has not moved since the last edit, there is no selection,
    /// and both `ch` and the character before the anchor are non-separators.
    pub fn push_typed(&mut self, target: &U, tag: UndoTag, ch: char) {
        let coalescible = !is_word_separator(ch)
            && !target.has_selection()
            && target
                .char_before_anchor()
                .is_some_and(|prev| !is_word_separator(prev));
        let collapse = coalescible
            && self.state == CoalesceState::Typing
            && self.last_tag == Some(tag)
            && self.last_cursor == Some(target.undo_cursor())
            && self.undo.last().is_some_and(|s| !s.is_cursor_only());

        if collapse {
            self.redo.clear();
            return;
        }
        self.push_step(target, tag);
        self.state = if coalescible {
            CoalesceState::Typing
        } else {
            CoalesceState::Split
        };
    }

    fn push_step(&mut self, target: &U, tag: UndoTag) {
        let cursor = target.undo_cursor();
        self.redo.clear();
        self.undo.push(Step {
            state: Some(target.capture()),
            cursor_before: cursor,
            cursor_after: cursor,
            tag,
        });
        self.last_tag = Some(tag);
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        if self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            self.undo.drain(..excess);
        }
    }

    /// Record the caret position after an edit.
    pub fn end_edit(&mut self, target: &U) {
        let cursor = target.undo_cursor();
        if let Some(step) = self.undo.last_mut()
            && !step.is_cursor_only()
        {
            step.cursor_after = cursor;
        }
        self.last_cursor = Some(cursor);
    }

    /// Record an intermediate cursor step if the caret moved since the last edit.
    ///
    /// Consecutive moves merge into one step. Any recorded move splits the typing burst.
    pub fn update_cursor(&mut self, target: &U) {
        let current = target.undo_cursor();
        let Some(last) = self.last_cursor else {
            return;
        };
        if last == current {
            return;
        }
        match self.undo.last_mut() {
            Some(step) if step.is_cursor_only() => step.cursor_after = current,
            _ => {
                self.undo.push(Step {
                    state: None,
                    cursor_before: last,
                    cursor_after: current,
                    tag: "cursor",
                });
                self.enforce_limit();
            }
        }
        self.last_cursor = Some(current);
        self.state = CoalesceState::Split;
    }

    /// Undo one step. Returns `false` (without side effects) when the stack is empty.
    pub fn pop_undo(&mut self, target: &mut U) -> bool {
        if self.undo.is_empty() {
            return false;
        }
        // Cursor-only steps on top are undone together with the content step below them.
        while let Some(step) = self.undo.pop() {
            let cursor = step.cursor_before;
            match step.state {
                None => {
                    target.set_undo_cursor(cursor);
                    self.redo.push(step);
                }
                Some(state) => {
                    let current = target.capture();
                    target.restore(&state);
                    target.set_undo_cursor(cursor);
                    self.redo.push(Step {
                        state: Some(current),
                        ..step
                    });
                    break;
                }
            }
        }
        self.after_jump(target);
        true
    }

    /// Redo one step. Returns `false` (without side effects) when the stack is empty.
    pub fn pop_redo(&mut self, target: &mut U) -> bool {
        let Some(step) = self.redo.pop() else {
            return false;
        };
        let cursor = step.cursor_after;
        match step.state {
            None => {
                target.set_undo_cursor(cursor);
                self.undo.push(step);
            }
            Some(state) => {
                let current = target.capture();
                target.restore(&state);
                target.set_undo_cursor(cursor);
                self.undo.push(Step {
                    state: Some(current),
                    ..step
                });
            }
        }
        while self.redo.last().is_some_and(Step::is_cursor_only) {
            if let Some(step) = self.redo.pop() {
                target.set_undo_cursor(step.cursor_after);
                self.undo.push(step);
            }
        }
        self.after_jump(target);
        true
    }

    fn after_jump(&mut self, target: &U) {
        self.state = CoalesceState::Split;
        self.last_cursor = Some(target.undo_cursor());
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.state = CoalesceState::Fresh;
        self.last_cursor = None;
        self.last_tag = None;
    }

    /// Force the next push to start a new step.
    pub fn split(&mut self) {
        if self.state == CoalesceState::Typing {
            self.state = CoalesceState::Split;
        }
    }
}

impl Undoable for Document {
    type State = DocSnapshot;
    type Cursor = Cursor;

    fn capture(&self) -> DocSnapshot {
        self.snapshot()
    }

    fn restore(&mut self, state: &DocSnapshot) {
        Document::restore(self, state);
    }

    fn undo_cursor(&self) -> Cursor {
        self.cursor()
    }

    fn set_undo_cursor(&mut self, cursor: Cursor) {
        self.set_cursor(cursor);
    }

    fn has_selection(&self) -> bool {
        self.cursor().has_selection()
    }

    fn char_before_anchor(&self) -> Option<char> {
        let anchor = self.cursor().anchor;
        let column = anchor.column.checked_sub(1)?;
        self.char_at(crate::Position::new(anchor.line, column))
    }
}

/// Undo history of a document.
pub type UndoStack = LinearStack<Document>;

#[derive(Debug, Default)]
struct UndoEntry {
    stack: UndoStack,
    last_known: Option<Document>,
}

/// One [`UndoStack`] per document id, plus the last known copy of each document so a document
/// the host removed can be recreated by [`UndoRegistry::restore_last`].
#[derive(Debug, Default)]
pub struct UndoRegistry {
    entries: HashMap<DocumentId, UndoEntry>,
    limit: Option<usize>,
}

impl UndoRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry whose stacks keep at most `limit` steps.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            limit: Some(limit),
        }
    }

    /// The stack of `id`, created on first access.
    pub fn stack_mut(&mut self, id: DocumentId) -> &mut UndoStack {
        let limit = self.limit;
        &mut self
            .entries
            .entry(id)
            .or_insert_with(|| UndoEntry {
                stack: limit.map(UndoStack::with_limit).unwrap_or_default(),
                last_known: None,
            })
            .stack
    }

    /// The stack of `id`, if one exists.
    pub fn stack(&self, id: DocumentId) -> Option<&UndoStack> {
        self.entries.get(&id).map(|e| &e.stack)
    }

    /// Returns `true` if a stack exists for `id`.
    pub fn contains(&self, id: DocumentId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Ids that have a stack.
    pub fn ids(&self) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Store a copy of `doc` for [`UndoRegistry::restore_last`].
    pub fn remember(&mut self, doc: &Document) {
        if let Some(id) = doc.id() {
            self.stack_mut(id);
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.last_known = Some(doc.clone());
            }
        }
    }

    /// Recreate document `id` in `store` from its last known copy.
    ///
    /// Returns `Ok(false)` if the document still exists or nothing was remembered.
    pub fn restore_last(
        &mut self,
        store: &mut DocumentStore,
        id: DocumentId,
    ) -> Result<bool, DocumentError> {
        if store.contains(id) {
            return Ok(false);
        }
        let Some(doc) = self.entries.get(&id).and_then(|e| e.last_known.clone()) else {
            return Ok(false);
        };
        store.insert_with_id(id, doc)?;
        tracing::debug!(%id, "restored document removed by host undo");
        Ok(true)
    }

    /// Drop the stack of an explicitly unlinked document.
    pub fn forget(&mut self, id: DocumentId) {
        self.entries.remove(&id);
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_char(doc: &mut Document, stack: &mut UndoStack, ch: char) {
        stack.update_cursor(doc);
        stack.push_typed(doc, "insert", ch);
        doc.write(&ch.to_string());
        stack.end_edit(doc);
    }

    #[test]
    fn separators_and_word_starts_split() {
        let mut doc = Document::new("t");
        let mut stack = UndoStack::new();
        for ch in ['a', 'b', '.'] {
            type_char(&mut doc, &mut stack, ch);
        }
        assert_eq!(stack.undo_depth(), 3);
        assert!(stack.pop_undo(&mut doc));
        assert!(stack.pop_undo(&mut doc));
        assert_eq!(doc.text(), "a");
        assert!(stack.pop_redo(&mut doc));
        assert!(stack.pop_redo(&mut doc));
        assert_eq!(doc.text(), "ab.");
    }

    #[test]
    fn typing_inside_a_word_coalesces() {
        let mut doc = Document::new("t");
        let mut stack = UndoStack::new();
        for ch in "hello".chars() {
            type_char(&mut doc, &mut stack, ch);
        }
        // The first letter opens the burst, the rest join it.
        assert_eq!(stack.undo_depth(), 2);
        stack.pop_undo(&mut doc);
        assert_eq!(doc.text(), "h");
    }

    #[test]
    fn cursor_motion_splits_burst() {
        let mut doc = Document::new("t");
        let mut stack = UndoStack::new();
        for ch in "ab".chars() {
            type_char(&mut doc, &mut stack, ch);
        }
        doc.select_caret(0, 1);
        type_char(&mut doc, &mut stack, 'x');
        assert_eq!(doc.text(), "axb");
        assert!(stack.pop_undo(&mut doc));
        assert_eq!(doc.text(), "ab");
        assert_eq!(doc.cursor(), Cursor::caret(0, 1));
        // The next undo walks back over the cursor move and the "b" step.
        assert!(stack.pop_undo(&mut doc));
        assert_eq!(doc.text(), "a");
    }

    #[test]
    fn empty_stack_pops_are_noops() {
        let mut doc = Document::from_text("t", "keep");
        let mut stack = UndoStack::new();
        assert!(!stack.pop_undo(&mut doc));
        assert!(!stack.pop_redo(&mut doc));
        assert_eq!(doc.text(), "keep");
    }

    #[test]
    fn limit_drops_oldest_steps() {
        let mut doc = Document::new("t");
        let mut stack = UndoStack::with_limit(2);
        for text in ["a", "b", "c"] {
            stack.push_undo(&doc, "write");
            doc.write(text);
            stack.end_edit(&doc);
        }
        assert_eq!(stack.undo_depth(), 2);
        while stack.pop_undo(&mut doc) {}
        assert_eq!(doc.text(), "a");
    }

    #[test]
    fn restore_last_recreates_removed_document() {
        let mut store = DocumentStore::new();
        let mut registry = UndoRegistry::new();
        let id = store.insert(Document::from_text("t", "body")).unwrap();
        registry.remember(store.get(id).unwrap());
        store.remove(id);
        assert!(registry.restore_last(&mut store, id).unwrap());
        assert_eq!(store.get(id).map(Document::text), Some("body".to_string()));
        assert!(!registry.restore_last(&mut store, id).unwrap());
    }
}
