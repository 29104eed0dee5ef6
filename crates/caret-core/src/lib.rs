#![warn(missing_docs)]
//! Caret Core - Headless Editing Engine for Code Editors
//!
//! # Overview
//!
//! `caret-core` holds the behavior-in-the-small of a code editor, independent of any host UI:
//! documents with line/column cursors and per-column format bytes, linear undo with typing
//! coalescing, a streaming bracket/string/comment scanner, a smooth-scroll scheduler and the
//! editing verbs built on top of them. A host feeds it commands and draws what it reports.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Workspace (spaces, hooks, plugins, sync)   │  ← Host-facing API
//! ├─────────────────────────────────────────────┤
//! │  Commands (insert, delete, indent, ...)     │  ← Edit verbs
//! ├─────────────────────────────────────────────┤
//! │  Undo stacks     │  Scroll scheduler        │  ← History / view
//! ├─────────────────────────────────────────────┤
//! │  Bracket scanner │  Language rules          │  ← Lexical help
//! ├─────────────────────────────────────────────┤
//! │  Document (Rope + formats + cursor)         │  ← Text storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use caret_core::{Command, CommandExecutor, EditCommand, Position};
//!
//! let mut executor = CommandExecutor::new("if x:");
//! executor.document_mut().select_caret(0, 5);
//! executor.execute(Command::Edit(EditCommand::LineBreak)).unwrap();
//!
//! assert_eq!(executor.document().lines(), vec!["if x:", "    "]);
//! assert_eq!(executor.document().cursor().focus, Position::new(1, 4));
//! ```
//!
//! Several documents shown in several editor spaces go through a [`Workspace`]:
//!
//! ```rust
//! use caret_core::{Command, Document, EditCommand, Workspace};
//!
//! let mut ws = Workspace::new();
//! let space = ws.add_space();
//! let doc = ws.add_document(Document::new("scratch")).unwrap();
//! ws.attach(space, doc).unwrap();
//! ws.execute(space, Command::Edit(EditCommand::Insert { text: "[".into() })).unwrap();
//! assert_eq!(ws.document(doc).unwrap().text(), "[]");
//! ```
//!
//! # Module Description
//!
//! - [`document`] - Document model, id registry and document store
//! - [`bracket`] - Streaming bracket / string / comment scanner
//! - [`undo`] - Linear undo stacks and the per-document registry
//! - [`scroll`] - Smooth-scroll scheduler
//! - [`commands`] - Unified command interface
//! - [`overrides`] - Verb hooks and host undo synchronisation
//! - [`workspace`] - Documents, spaces and command routing
//! - [`config`] - Preferences
//! - [`plugins`] - Optional features switched by preferences

pub mod bracket;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod cursor;
pub mod document;
pub mod language;
pub mod layout;
pub mod line_ending;
pub mod overrides;
pub mod plugins;
pub mod scroll;
pub mod text;
pub mod undo;
pub mod word;
pub mod workspace;

pub use bracket::{BracketScanner, Region, RegionKind, scan};
pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use commands::{
    ClipboardCommand, Command, CommandError, CommandExecutor, CommandResult, CursorCommand,
    DeleteMode, EditCommand, EditContext, Motion, RetainedColumns, ViewCommand,
};
pub use config::{ConfigError, PluginPrefs, Preferences, Rgba, TripleClick};
pub use cursor::{Cursor, Position};
pub use document::{
    DocSnapshot, Document, DocumentError, DocumentId, DocumentStore, IdRegistry, IdStatus,
    IndentType, Line,
};
pub use language::Language;
pub use line_ending::LineEnding;
pub use overrides::{
    HookContext, HookError, HookId, HookOutcome, HookScope, Overrides, SyncReport, UndoSync, Verb,
};
pub use plugins::{Plugin, PluginError, PluginManager, PluginStatus};
pub use scroll::{ClampState, EnsureMode, ScrollScheduler, ViewportId};
pub use undo::{CoalesceState, LinearStack, Step, UndoRegistry, UndoStack, Undoable};
pub use workspace::{SpaceId, SpaceState, Workspace, WorkspaceError};
