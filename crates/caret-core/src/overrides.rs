//! Verb interception and undo synchronisation.
//!
//! Every command runs as *pre-hooks → default → post-hooks*. Pre-hooks run newest first and
//! may claim the verb by returning [`HookOutcome::Handled`], which skips the default and the
//! post-hooks. Post-hooks run in registration order. A hook that fails is logged and treated
//! as [`HookOutcome::Continue`]: a broken plugin must not take the editor down with it.
//!
//! [`UndoSync`] implements the protocol applied around a *host* undo/redo step, which may
//! create or destroy documents as a side effect. Document lifetime is never part of undo, so
//! the sync reverses those side effects afterwards.

use crate::commands::{Command, CommandResult};
use crate::document::{Document, DocumentError, DocumentId, DocumentStore};
use crate::undo::UndoRegistry;
use crate::workspace::{SpaceId, SpaceState};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Stable name of an interceptable verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    /// Typing and verbatim writes.
    Insert,
    /// Backspace / delete.
    Delete,
    /// Line break.
    LineBreak,
    /// Indent.
    Indent,
    /// Unindent.
    Unindent,
    /// Comment toggle.
    ToggleComment,
    /// Undo.
    Undo,
    /// Redo.
    Redo,
    /// Caret movement.
    Move,
    /// Clicks and explicit selections.
    Select,
    /// Select all.
    SelectAll,
    /// Expand to brackets.
    ExpandToBrackets,
    /// Expand to path.
    ExpandToPath,
    /// Copy.
    Copy,
    /// Cut.
    Cut,
    /// Paste.
    Paste,
    /// Scrolling and other view changes.
    Scroll,
}

impl Verb {
    /// Snake-case name, as used in key-binding tables.
    pub fn name(self) -> &'static str {
        match self {
            Verb::Insert => "insert",
            Verb::Delete => "delete",
            Verb::LineBreak => "line_break",
            Verb::Indent => "indent",
            Verb::Unindent => "unindent",
            Verb::ToggleComment => "toggle_comment",
            Verb::Undo => "undo",
            Verb::Redo => "redo",
            Verb::Move => "move",
            Verb::Select => "select",
            Verb::SelectAll => "select_all",
            Verb::ExpandToBrackets => "expand_to_brackets",
            Verb::ExpandToPath => "expand_to_path",
            Verb::Copy => "copy",
            Verb::Cut => "cut",
            Verb::Paste => "paste",
            Verb::Scroll => "scroll",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a hook applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookScope {
    /// Every space.
    Global,
    /// One space only.
    Space(SpaceId),
}

impl HookScope {
    fn covers(self, space: SpaceId) -> bool {
        match self {
            HookScope::Global => true,
            HookScope::Space(s) => s == space,
        }
    }
}

/// What a hook decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// Let the verb proceed.
    Continue,
    /// The hook took care of the verb (pre-hooks only).
    Handled,
}

/// A hook failure. Logged by the dispatcher, never propagated.
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook reported a failure.
    #[error("hook failed: {0}")]
    Failed(String),
}

/// What a hook sees.
#[derive(Debug)]
pub struct HookContext<'a> {
    /// Space the verb runs in.
    pub space: SpaceId,
    /// The verb.
    pub verb: Verb,
    /// The full command.
    pub command: &'a Command,
    /// The space's document, if any.
    pub document: Option<&'a Document>,
    /// Result of the default behavior (post-hooks only).
    pub result: Option<&'a CommandResult>,
}

/// Boxed hook callback.
pub type HookFn = Box<dyn FnMut(&HookContext<'_>) -> Result<HookOutcome, HookError>>;

/// Handle returned on registration, used to remove the hook again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

struct Registered {
    id: HookId,
    scope: HookScope,
    verb: Option<Verb>,
    hook: HookFn,
}

impl Registered {
    fn matches(&self, ctx: &HookContext<'_>) -> bool {
        self.scope.covers(ctx.space) && self.verb.is_none_or(|v| v == ctx.verb)
    }
}

/// The hook table.
#[derive(Default)]
pub struct Overrides {
    pre: Vec<Registered>,
    post: Vec<Registered>,
    next_id: u64,
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("pre", &self.pre.len())
            .field("post", &self.post.len())
            .finish()
    }
}

impl Overrides {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> HookId {
        self.next_id += 1;
        HookId(self.next_id)
    }

    /// Register a pre-hook for one verb.
    pub fn add_pre<F>(&mut self, verb: Verb, scope: HookScope, hook: F) -> HookId
    where
        F: FnMut(&HookContext<'_>) -> Result<HookOutcome, HookError> + 'static,
    {
        self.register_pre(Some(verb), scope, Box::new(hook))
    }

    /// Register a pre-hook that sees every verb.
    pub fn add_pre_any<F>(&mut self, scope: HookScope, hook: F) -> HookId
    where
        F: FnMut(&HookContext<'_>) -> Result<HookOutcome, HookError> + 'static,
    {
        self.register_pre(None, scope, Box::new(hook))
    }

    /// Register a post-hook for one verb. Its outcome is ignored.
    pub fn add_post<F>(&mut self, verb: Verb, scope: HookScope, hook: F) -> HookId
    where
        F: FnMut(&HookContext<'_>) -> Result<HookOutcome, HookError> + 'static,
    {
        let id = self.next_id();
        self.post.push(Registered {
            id,
            scope,
            verb: Some(verb),
            hook: Box::new(hook),
        });
        id
    }

    fn register_pre(&mut self, verb: Option<Verb>, scope: HookScope, hook: HookFn) -> HookId {
        let id = self.next_id();
        self.pre.push(Registered {
            id,
            scope,
            verb,
            hook,
        });
        id
    }

    /// Remove a hook. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: HookId) -> bool {
        let before = self.pre.len() + self.post.len();
        self.pre.retain(|r| r.id != id);
        self.post.retain(|r| r.id != id);
        before != self.pre.len() + self.post.len()
    }

    /// Remove every hook scoped to `space`.
    pub fn remove_space(&mut self, space: SpaceId) {
        let scope = HookScope::Space(space);
        self.pre.retain(|r| r.scope != scope);
        self.post.retain(|r| r.scope != scope);
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.pre.len() + self.post.len()
    }

    /// Returns `true` if no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every hook.
    pub fn clear(&mut self) {
        self.pre.clear();
        self.post.clear();
    }

    /// Run the pre-hooks for `ctx`, newest first, until one handles the verb.
    pub fn run_pre(&mut self, ctx: &HookContext<'_>) -> HookOutcome {
        for registered in self.pre.iter_mut().rev() {
            if !registered.matches(ctx) {
                continue;
            }
            match (registered.hook)(ctx) {
                Ok(HookOutcome::Handled) => {
                    tracing::trace!(verb = %ctx.verb, hook = registered.id.0, "verb handled by pre-hook");
                    return HookOutcome::Handled;
                }
                Ok(HookOutcome::Continue) => {}
                Err(err) => {
                    tracing::warn!(verb = %ctx.verb, hook = registered.id.0, error = %err, "pre-hook failed");
                }
            }
        }
        HookOutcome::Continue
    }

    /// Run the post-hooks for `ctx` in registration order.
    pub fn run_post(&mut self, ctx: &HookContext<'_>) {
        for registered in self.post.iter_mut() {
            if !registered.matches(ctx) {
                continue;
            }
            if let Err(err) = (registered.hook)(ctx) {
                tracing::warn!(verb = %ctx.verb, hook = registered.id.0, error = %err, "post-hook failed");
            }
        }
    }
}

/// What [`UndoSync::reconcile`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Documents the host step created, now removed again.
    pub removed: Vec<DocumentId>,
    /// Documents the host step destroyed, now restored.
    pub restored: Vec<DocumentId>,
    /// Spaces whose active document was put back.
    pub reassigned: Vec<SpaceId>,
}

impl SyncReport {
    /// Returns `true` if nothing needed reconciling.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.restored.is_empty() && self.reassigned.is_empty()
    }
}

/// State captured before a host undo/redo step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoSync {
    ids: BTreeSet<DocumentId>,
    active: BTreeMap<SpaceId, Option<DocumentId>>,
}

impl UndoSync {
    /// Snapshot the document ids and each space's active document.
    pub fn capture(documents: &DocumentStore, spaces: &BTreeMap<SpaceId, SpaceState>) -> Self {
        Self {
            ids: documents.ids(),
            active: spaces
                .iter()
                .map(|(id, state)| (*id, state.document))
                .collect(),
        }
    }

    /// Undo the document-lifetime side effects of the host step.
    pub fn reconcile(
        self,
        documents: &mut DocumentStore,
        undo: &mut UndoRegistry,
        spaces: &mut BTreeMap<SpaceId, SpaceState>,
    ) -> Result<SyncReport, DocumentError> {
        let mut report = SyncReport::default();

        for id in documents.ids().difference(&self.ids) {
            documents.remove(*id);
            report.removed.push(*id);
        }
        for id in &self.ids {
            if documents.contains(*id) {
                continue;
            }
            if undo.restore_last(documents, *id)? {
                report.restored.push(*id);
            } else {
                tracing::warn!(%id, "document removed by host step has no stored copy");
            }
        }
        for (space, active) in self.active {
            if let Some(state) = spaces.get_mut(&space)
                && state.document != active
            {
                state.document = active;
                state.retained = None;
                report.reassigned.push(space);
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                removed = report.removed.len(),
                restored = report.restored.len(),
                reassigned = report.reassigned.len(),
                "reconciled host undo step"
            );
        }
        Ok(report)
    }
}
