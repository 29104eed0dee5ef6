#![warn(missing_docs)]
//! Caret UI - Widgets and Event Routing for `caret-core`
//!
//! # Overview
//!
//! `caret-ui` puts a rectangle-based widget layer between a host window and a
//! [`caret_core::Workspace`]. It owns no graphics API: widgets draw through the three
//! primitives of [`Painter`], and hosts translate their native events into [`Event`]s.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Frontend (regions, modal drags, key map)   │  ← Host-facing API
//! ├─────────────────────────────────────────────┤
//! │  Dispatcher (hover, press, focus stack)     │  ← Pointer routing
//! ├─────────────────────────────────────────────┤
//! │  Scrollbar │ Resizers │ Input │ List/Text   │  ← Widget behavior
//! ├─────────────────────────────────────────────┤
//! │  WidgetTree (arena + hit test)              │  ← Structure
//! ├─────────────────────────────────────────────┤
//! │  Geometry │ Painter / DrawList              │  ← Primitives
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use caret_core::{Document, Workspace};
//! use caret_ui::{Event, EventOutcome, Frontend, Rect, RegionStyle};
//! use std::time::Instant;
//!
//! let mut ws = Workspace::new();
//! let space = ws.add_space();
//! let doc = ws.add_document(Document::new("scratch")).unwrap();
//! ws.attach(space, doc).unwrap();
//!
//! let mut ui = Frontend::new(ws);
//! ui.add_region(space, Rect::new(0.0, 0.0, 640.0, 480.0), RegionStyle::default())
//!     .unwrap();
//! let outcome = ui.handle_event(space, Event::typed('('), Instant::now()).unwrap();
//!
//! assert_eq!(outcome, EventOutcome::Handled);
//! assert_eq!(ui.workspace().document(doc).unwrap().text(), "()");
//! ```
//!
//! # Module Description
//!
//! - [`geometry`] - Points and rectangles
//! - [`render`] - Drawing primitives and the recording painter
//! - [`widget`] - Widget kinds and the widget tree
//! - [`dispatcher`] - Hover tracking, activation and focus stacks
//! - [`scrollbar`] - Thumb geometry, page jumps and thumb drags
//! - [`resize`] - Edge and corner resizing
//! - [`textdraw`] - Cached scrollable text, list and text views
//! - [`input`] - Single-line input widget and its redirect hooks
//! - [`events`] - Host input events
//! - [`keymap`] - Key binding table
//! - [`frontend`] - Event routing for a workspace

pub mod dispatcher;
pub mod events;
pub mod frontend;
pub mod geometry;
pub mod input;
pub mod keymap;
pub mod render;
pub mod resize;
pub mod scrollbar;
pub mod textdraw;
pub mod widget;

pub use dispatcher::{Activation, Dispatcher, HoverChange, Press};
pub use events::{Event, Key, Modifiers, MouseButton, UnknownKey};
pub use frontend::{DragSelect, EventOutcome, Frontend, Modal, RegionStyle};
pub use geometry::{Point, Rect};
pub use input::{Input, InputBuffer, InputHooks, InputMotion};
pub use keymap::{Action, Binding, KeyContext, Keymap, KeymapError, Trigger};
pub use render::{DrawCommand, DrawList, Painter, RectStyle, SurfaceId, TextStyle};
pub use resize::{ResizeDrag, ResizeLimits, ResizeMode};
pub use scrollbar::ThumbDrag;
pub use textdraw::{CacheKey, ListView, TextDraw, TextView};
pub use widget::{CursorKind, Edge, UiError, Widget, WidgetId, WidgetKind, WidgetTree};
