//! Documents, spaces and the command path that ties them together.
//!
//! A *space* is one editor surface: it shows at most one document through one scroll
//! viewport and keeps its own retained column. [`Workspace`] owns all documents, their undo
//! stacks, the spaces, the scroll scheduler, the hook table and the plugins, and routes every
//! command through the hooks. Nothing here is global; dropping the workspace (or calling
//! [`Workspace::shutdown`]) purges all of it.

use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::commands::{self, ClipboardCommand, Command, CommandError, CommandResult, EditContext};
use crate::commands::RetainedColumns;
use crate::config::{ConfigError, Preferences};
use crate::document::{Document, DocumentError, DocumentId, DocumentStore};
use crate::language::Language;
use crate::overrides::{HookContext, HookOutcome, Overrides, SyncReport, UndoSync};
use crate::plugins::{Plugin, PluginError, PluginManager};
use crate::scroll::{ScrollScheduler, ViewportId};
use crate::undo::{UndoRegistry, UndoStack};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

/// Default viewport height in pixels for new spaces.
pub const DEFAULT_VIEW_HEIGHT: f64 = 600.0;
/// Default line height in pixels for new spaces.
pub const DEFAULT_LINE_HEIGHT: f64 = 20.0;

/// Identifies an editor space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpaceId(u32);

impl SpaceId {
    /// Wrap a raw id.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw id value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "space#{}", self.0)
    }
}

/// Per-space state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceState {
    /// Active document.
    pub document: Option<DocumentId>,
    /// Scroll viewport.
    pub viewport: Option<ViewportId>,
    /// Column remembered across vertical moves.
    pub retained: Option<RetainedColumns>,
}

/// Workspace management errors.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A document operation failed.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// Preferences were rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A plugin could not be registered.
    #[error(transparent)]
    Plugin(#[from] PluginError),
    /// No space with this id.
    #[error("unknown {0}")]
    UnknownSpace(SpaceId),
    /// No document with this id.
    #[error("unknown document {0}")]
    UnknownDocument(DocumentId),
}

/// Every document and space of one editor instance.
pub struct Workspace {
    documents: DocumentStore,
    undo: UndoRegistry,
    spaces: BTreeMap<SpaceId, SpaceState>,
    next_space: u32,
    scroll: ScrollScheduler,
    overrides: Overrides,
    plugins: PluginManager,
    clipboard: Box<dyn Clipboard>,
    lang: Language,
    prefs: Preferences,
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("documents", &self.documents.len())
            .field("spaces", &self.spaces)
            .field("overrides", &self.overrides)
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Create an empty workspace with default preferences and an in-memory clipboard.
    pub fn new() -> Self {
        Self {
            documents: DocumentStore::new(),
            undo: UndoRegistry::new(),
            spaces: BTreeMap::new(),
            next_space: 0,
            scroll: ScrollScheduler::new(),
            overrides: Overrides::new(),
            plugins: PluginManager::new(),
            clipboard: Box::new(MemoryClipboard::new()),
            lang: Language::python(),
            prefs: Preferences::default(),
        }
    }

    /// Create a workspace with validated preferences.
    pub fn with_preferences(prefs: Preferences) -> Result<Self, WorkspaceError> {
        let mut workspace = Self::new();
        workspace.set_preferences(prefs)?;
        Ok(workspace)
    }

    // Documents

    /// Add a document; returns its (possibly reassigned) id.
    pub fn add_document(&mut self, doc: Document) -> Result<DocumentId, WorkspaceError> {
        let id = self.documents.insert(doc)?;
        if let Some(doc) = self.documents.get(id) {
            self.undo.remember(doc);
        }
        Ok(id)
    }

    /// Open a file as a new document.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<DocumentId, WorkspaceError> {
        let doc = Document::open(path)?;
        self.add_document(doc)
    }

    /// Destroy a document, its history, and detach it from every space.
    pub fn unlink(&mut self, id: DocumentId) -> Option<Document> {
        let doc = self.documents.remove(id)?;
        self.undo.forget(id);
        for state in self.spaces.values_mut() {
            if state.document == Some(id) {
                state.document = None;
                state.retained = None;
            }
        }
        tracing::debug!(%id, "document unlinked");
        Some(doc)
    }

    /// All documents.
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Look up a document.
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Look up a document mutably (host-side changes such as formats).
    pub fn document_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(id)
    }

    /// Undo history of a document.
    pub fn undo_stack(&self, id: DocumentId) -> Option<&UndoStack> {
        self.undo.stack(id)
    }

    // Spaces

    /// Create a space with a default-sized viewport.
    pub fn add_space(&mut self) -> SpaceId {
        let id = SpaceId(self.next_space);
        self.next_space += 1;
        let viewport = self
            .scroll
            .add_viewport(DEFAULT_VIEW_HEIGHT, DEFAULT_LINE_HEIGHT, 1);
        self.spaces.insert(
            id,
            SpaceState {
                viewport: Some(viewport),
                ..SpaceState::default()
            },
        );
        id
    }

    /// Remove a space with its viewport and its space-scoped hooks.
    pub fn remove_space(&mut self, space: SpaceId) -> bool {
        let Some(state) = self.spaces.remove(&space) else {
            return false;
        };
        if let Some(viewport) = state.viewport {
            self.scroll.remove_viewport(viewport);
        }
        self.overrides.remove_space(space);
        true
    }

    /// Show `id` in `space`.
    pub fn attach(&mut self, space: SpaceId, id: DocumentId) -> Result<(), WorkspaceError> {
        let num_lines = self
            .documents
            .get(id)
            .ok_or(WorkspaceError::UnknownDocument(id))?
            .num_lines();
        let state = self
            .spaces
            .get_mut(&space)
            .ok_or(WorkspaceError::UnknownSpace(space))?;
        state.document = Some(id);
        state.retained = None;
        if let Some(viewport) = state.viewport {
            self.scroll.set_num_lines(viewport, num_lines);
        }
        Ok(())
    }

    /// Active document of `space`.
    pub fn active_document(&self, space: SpaceId) -> Option<DocumentId> {
        self.spaces.get(&space).and_then(|s| s.document)
    }

    /// State of `space`.
    pub fn space(&self, space: SpaceId) -> Option<&SpaceState> {
        self.spaces.get(&space)
    }

    /// All spaces, in id order.
    pub fn spaces(&self) -> impl Iterator<Item = (SpaceId, &SpaceState)> {
        self.spaces.iter().map(|(id, state)| (*id, state))
    }

    /// Resize the viewport of `space`.
    pub fn set_view_metrics(
        &mut self,
        space: SpaceId,
        height_px: f64,
        line_height: f64,
    ) -> Result<(), WorkspaceError> {
        let viewport = self
            .spaces
            .get(&space)
            .and_then(|s| s.viewport)
            .ok_or(WorkspaceError::UnknownSpace(space))?;
        self.scroll.set_metrics(viewport, height_px, line_height);
        Ok(())
    }

    // Shared services

    /// The scroll scheduler.
    pub fn scroll(&self) -> &ScrollScheduler {
        &self.scroll
    }

    /// The scroll scheduler, mutably.
    pub fn scroll_mut(&mut self) -> &mut ScrollScheduler {
        &mut self.scroll
    }

    /// Advance scroll animations. Returns `true` while any are running.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.scroll.tick(now)
    }

    /// The hook table.
    pub fn overrides_mut(&mut self) -> &mut Overrides {
        &mut self.overrides
    }

    /// Current preferences.
    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Validate and apply preferences, switching plugins to match.
    pub fn set_preferences(&mut self, prefs: Preferences) -> Result<(), WorkspaceError> {
        prefs.validate()?;
        self.prefs = prefs;
        self.plugins.apply(&self.prefs, &mut self.overrides);
        Ok(())
    }

    /// Language rules.
    pub fn language(&self) -> &Language {
        &self.lang
    }

    /// Replace the language rules.
    pub fn set_language(&mut self, lang: Language) {
        self.lang = lang;
    }

    /// Replace the clipboard backend.
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    /// Clipboard backend.
    pub fn clipboard_mut(&mut self) -> &mut dyn Clipboard {
        self.clipboard.as_mut()
    }

    /// Register a plugin and switch it according to the current preferences.
    ///
    /// A plugin that fails to enable stays registered with a failed status.
    pub fn register_plugin(&mut self, plugin: Box<dyn Plugin>) -> Result<(), WorkspaceError> {
        let name = plugin.name().to_string();
        self.plugins.register(plugin)?;
        if self.prefs.plugin_enabled(&name) {
            // Recorded as a failed status on error.
            let _ = self.plugins.set_enabled(&name, true, &mut self.overrides);
        }
        Ok(())
    }

    /// Enable or disable a plugin and record the choice in the preferences.
    pub fn set_plugin_enabled(&mut self, name: &str, enabled: bool) -> Result<(), WorkspaceError> {
        self.prefs.set_plugin_enabled(name, enabled);
        self.plugins.set_enabled(name, enabled, &mut self.overrides)?;
        Ok(())
    }

    /// Plugin statuses.
    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    // Commands

    /// Run `command` in `space`.
    pub fn execute(&mut self, space: SpaceId, command: Command) -> Result<CommandResult, CommandError> {
        self.execute_at(space, command, Instant::now())
    }

    /// Run `command` in `space` with an explicit clock.
    ///
    /// Pre-hooks may handle the verb, in which case the default behavior and the post-hooks
    /// are skipped and the result is [`CommandResult::Finished`].
    pub fn execute_at(
        &mut self,
        space: SpaceId,
        command: Command,
        now: Instant,
    ) -> Result<CommandResult, CommandError> {
        let state = *self
            .spaces
            .get(&space)
            .ok_or(CommandError::UnknownSpace(space.get()))?;
        let id = state.document.ok_or(CommandError::NoDocument(space.get()))?;
        if !self.documents.contains(id) {
            return Err(CommandError::UnknownDocument(id));
        }
        let verb = command.verb();

        let pre = HookContext {
            space,
            verb,
            command: &command,
            document: self.documents.get(id),
            result: None,
        };
        if self.overrides.run_pre(&pre) == HookOutcome::Handled {
            return Ok(CommandResult::Finished);
        }

        let edits = matches!(
            command,
            Command::Edit(_) | Command::Clipboard(ClipboardCommand::Cut | ClipboardCommand::Paste)
        );
        let result = {
            let Self {
                documents,
                undo,
                spaces,
                scroll,
                clipboard,
                lang,
                prefs,
                ..
            } = self;
            let doc = documents
                .get_mut(id)
                .ok_or(CommandError::UnknownDocument(id))?;
            let state = spaces
                .get_mut(&space)
                .ok_or(CommandError::UnknownSpace(space.get()))?;
            let view = state.viewport.map(move |vp| (scroll, vp));
            let mut ctx = EditContext {
                doc,
                undo: undo.stack_mut(id),
                retained: &mut state.retained,
                clipboard: clipboard.as_mut(),
                lang,
                prefs,
                view,
                now,
            };
            commands::execute(&mut ctx, command.clone())?
        };
        tracing::trace!(%space, %verb, ?result, "command executed");

        if edits
            && result.is_finished()
            && let Some(doc) = self.documents.get(id)
        {
            self.undo.remember(doc);
        }

        let post = HookContext {
            space,
            verb,
            command: &command,
            document: self.documents.get(id),
            result: Some(&result),
        };
        self.overrides.run_post(&post);
        Ok(result)
    }

    /// Run a host undo/redo step and reverse its document-lifetime side effects.
    ///
    /// `step` gets the document store and the space table, as a host would see them. Documents
    /// it creates are removed again, documents it destroys are restored from their last known
    /// copy, and every space gets its previous document back.
    pub fn host_step<F>(&mut self, step: F) -> Result<SyncReport, WorkspaceError>
    where
        F: FnOnce(&mut DocumentStore, &mut BTreeMap<SpaceId, SpaceState>),
    {
        let sync = UndoSync::capture(&self.documents, &self.spaces);
        step(&mut self.documents, &mut self.spaces);
        let report = sync.reconcile(&mut self.documents, &mut self.undo, &mut self.spaces)?;
        for space in &report.reassigned {
            if let Some(state) = self.spaces.get(space)
                && let (Some(viewport), Some(id)) = (state.viewport, state.document)
                && let Some(doc) = self.documents.get(id)
            {
                self.scroll.set_num_lines(viewport, doc.num_lines());
            }
        }
        Ok(report)
    }

    /// Tear everything down: plugins, hooks, spaces, scroll jobs, histories and documents.
    pub fn shutdown(&mut self) {
        self.plugins.disable_all(&mut self.overrides);
        self.overrides.clear();
        self.spaces.clear();
        self.scroll.clear();
        self.undo.clear();
        self.documents.clear();
        tracing::debug!("workspace shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::EditCommand;
    use crate::overrides::{HookScope, Verb};

    fn insert(text: &str) -> Command {
        Command::Edit(EditCommand::Insert {
            text: text.to_string(),
        })
    }

    #[test]
    fn spaces_without_documents_reject_commands() {
        let mut ws = Workspace::new();
        let space = ws.add_space();
        assert!(matches!(
            ws.execute(space, insert("a")),
            Err(CommandError::NoDocument(_))
        ));
        assert!(matches!(
            ws.execute(SpaceId::from_raw(99), insert("a")),
            Err(CommandError::UnknownSpace(99))
        ));
    }

    #[test]
    fn handled_pre_hook_skips_the_default() {
        let mut ws = Workspace::new();
        let space = ws.add_space();
        let id = ws.add_document(Document::new("t")).unwrap();
        ws.attach(space, id).unwrap();
        ws.overrides_mut()
            .add_pre(Verb::Insert, HookScope::Space(space), |_| Ok(HookOutcome::Handled));

        assert_eq!(ws.execute(space, insert("x")).unwrap(), CommandResult::Finished);
        assert_eq!(ws.document(id).unwrap().text(), "");

        assert!(ws.remove_space(space));
        assert!(!ws.remove_space(space));
    }

    #[test]
    fn unlink_detaches_the_document() {
        let mut ws = Workspace::new();
        let space = ws.add_space();
        let id = ws.add_document(Document::from_text("t", "abc")).unwrap();
        ws.attach(space, id).unwrap();
        assert!(ws.unlink(id).is_some());
        assert_eq!(ws.active_document(space), None);
        assert!(ws.undo_stack(id).is_none());
    }
}
