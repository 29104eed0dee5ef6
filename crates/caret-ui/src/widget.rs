//! Widget tree.
//!
//! Widgets live in an arena owned by the tree; a parent lists its children by id and each
//! child keeps the id of its parent. Dropping the tree (it belongs to one editor surface) drops
//! every widget in it. Rectangles are in region coordinates, not relative to the parent.

use crate::geometry::{Point, Rect};
use crate::input::Input;
use crate::render::{Painter, RectStyle};
use crate::textdraw::{ListView, TextView};
use caret_core::{SpaceId, ViewportId};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

new_key_type! {
    /// Identifies a widget within its tree.
    pub struct WidgetId;
}

/// UI errors.
#[derive(Debug, Error)]
pub enum UiError {
    /// No widget with this id in the tree.
    #[error("unknown widget {0:?}")]
    UnknownWidget(WidgetId),
    /// Linking `widget` under `parent` would make the widget its own ancestor.
    #[error("widget {widget:?} cannot be placed under its descendant {parent:?}")]
    Cycle {
        /// The widget being moved.
        widget: WidgetId,
        /// The requested parent.
        parent: WidgetId,
    },
    /// The root cannot be removed or moved.
    #[error("the root widget cannot be removed or moved")]
    RootRemoval,
    /// The widget exists but is not of the expected kind.
    #[error("widget {widget:?} is not a {expected}")]
    WrongKind {
        /// The widget.
        widget: WidgetId,
        /// Kind the caller needed.
        expected: &'static str,
    },
    /// No region is registered for this space.
    #[error("no region for {0}")]
    UnknownSpace(SpaceId),
    /// A workspace command failed.
    #[error(transparent)]
    Command(#[from] caret_core::CommandError),
    /// A workspace operation failed.
    #[error(transparent)]
    Workspace(#[from] caret_core::WorkspaceError),
    /// The clipboard failed.
    #[error(transparent)]
    Clipboard(#[from] caret_core::ClipboardError),
}

/// Pointer shape requested while a widget is hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorKind {
    /// The host's default arrow.
    #[default]
    Default,
    /// Text I-beam.
    Text,
    /// Clickable.
    Pointer,
    /// Draggable.
    Grab,
    /// Horizontal resize.
    ResizeHorizontal,
    /// Vertical resize.
    ResizeVertical,
    /// Diagonal resize.
    ResizeDiagonal,
}

/// Side of a widget an [`WidgetKind::EdgeResizer`] drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Left side.
    Left,
    /// Right side.
    Right,
    /// Top side.
    Top,
    /// Bottom side.
    Bottom,
}

impl Edge {
    /// Returns `true` for left and right.
    pub fn is_vertical(self) -> bool {
        matches!(self, Edge::Left | Edge::Right)
    }
}

/// What a widget is and the state that goes with it.
#[derive(Debug)]
pub enum WidgetKind {
    /// A plain container or decoration.
    Panel,
    /// The document text area of a space; presses fall through to text handling.
    TextArea,
    /// A scrollbar gutter. Pressing it pages the viewport.
    Scrollbar {
        /// Viewport it scrolls.
        viewport: ViewportId,
        /// Its thumb, once created.
        thumb: Option<WidgetId>,
    },
    /// A scrollbar thumb. Dragging it maps pointer movement to a view ratio.
    Thumb {
        /// Viewport it scrolls.
        viewport: ViewportId,
    },
    /// Resizes one side of `target`.
    EdgeResizer {
        /// Side being dragged.
        edge: Edge,
        /// Widget being resized.
        target: WidgetId,
    },
    /// Resizes the bottom-right corner of `target`.
    BoxResizer {
        /// Widget being resized.
        target: WidgetId,
    },
    /// A scrollable list with hover and selection overlays.
    ListView(ListView),
    /// Read-only multi-line text.
    TextView(TextView),
    /// Single-line text entry.
    Input(Box<Input>),
}

impl WidgetKind {
    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::Panel => "panel",
            WidgetKind::TextArea => "text area",
            WidgetKind::Scrollbar { .. } => "scrollbar",
            WidgetKind::Thumb { .. } => "thumb",
            WidgetKind::EdgeResizer { .. } => "edge resizer",
            WidgetKind::BoxResizer { .. } => "box resizer",
            WidgetKind::ListView(_) => "list view",
            WidgetKind::TextView(_) => "text view",
            WidgetKind::Input(_) => "input",
        }
    }
}

/// One node of the tree.
#[derive(Debug)]
pub struct Widget {
    /// Bounds in region coordinates.
    pub rect: Rect,
    /// Normal look.
    pub style: RectStyle,
    /// Look while hovered; falls back to `style`.
    pub hover_style: Option<RectStyle>,
    /// Pointer shape while hovered.
    pub cursor: CursorKind,
    /// Report hits on this widget without descending into its children.
    pub hit_block: bool,
    /// Hidden widgets are neither drawn nor hit.
    pub visible: bool,
    /// Space the widget belongs to, for per-space instances.
    pub space: Option<SpaceId>,
    /// Kind and kind-specific state.
    pub kind: WidgetKind,
    hovered: bool,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
}

impl Widget {
    /// A visible widget with a transparent style.
    pub fn new(kind: WidgetKind, rect: Rect) -> Self {
        let cursor = match &kind {
            WidgetKind::TextArea | WidgetKind::Input(_) => CursorKind::Text,
            WidgetKind::Thumb { .. } => CursorKind::Grab,
            WidgetKind::EdgeResizer { edge, .. } if edge.is_vertical() => {
                CursorKind::ResizeHorizontal
            }
            WidgetKind::EdgeResizer { .. } => CursorKind::ResizeVertical,
            WidgetKind::BoxResizer { .. } => CursorKind::ResizeDiagonal,
            WidgetKind::ListView(_) => CursorKind::Pointer,
            _ => CursorKind::Default,
        };
        Self {
            rect,
            style: RectStyle::default(),
            hover_style: None,
            cursor,
            hit_block: false,
            visible: true,
            space: None,
            kind,
            hovered: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the normal style.
    pub fn with_style(mut self, style: RectStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the hovered style.
    pub fn with_hover_style(mut self, style: RectStyle) -> Self {
        self.hover_style = Some(style);
        self
    }

    /// Set the pointer shape.
    pub fn with_cursor(mut self, cursor: CursorKind) -> Self {
        self.cursor = cursor;
        self
    }

    /// Make the widget a hit block.
    pub fn hit_block(mut self) -> Self {
        self.hit_block = true;
        self
    }

    /// Bind the widget to a space.
    pub fn for_space(mut self, space: SpaceId) -> Self {
        self.space = Some(space);
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Parent id (`None` for the root).
    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    /// Child ids, in drawing order.
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    /// Returns `true` while the pointer is over the widget.
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Pointer entered.
    pub fn on_enter(&mut self) {
        self.hovered = true;
    }

    /// Pointer left.
    pub fn on_leave(&mut self) {
        self.hovered = false;
        if let WidgetKind::ListView(list) = &mut self.kind {
            list.set_hover(None);
        }
    }

    /// Pointer moved while over the widget.
    pub fn on_hover(&mut self, at: Point) {
        let rect = self.rect;
        if let WidgetKind::ListView(list) = &mut self.kind {
            list.hover_at(rect, at);
        }
    }

    /// The input state, if this is an input.
    pub fn as_input(&self) -> Option<&Input> {
        match &self.kind {
            WidgetKind::Input(input) => Some(input.as_ref()),
            _ => None,
        }
    }

    /// The input state, mutably.
    pub fn as_input_mut(&mut self) -> Option<&mut Input> {
        match &mut self.kind {
            WidgetKind::Input(input) => Some(input.as_mut()),
            _ => None,
        }
    }

    fn draw(&mut self, painter: &mut dyn Painter) {
        let style = match self.hover_style {
            Some(hover) if self.hovered => hover,
            _ => self.style,
        };
        painter.rect(self.rect, &style);
        let rect = self.rect;
        match &mut self.kind {
            WidgetKind::ListView(list) => list.draw(rect, painter),
            WidgetKind::TextView(view) => view.draw(rect, painter),
            WidgetKind::Input(input) => input.draw(rect, painter),
            _ => {}
        }
    }
}

/// Arena of widgets rooted at one region.
#[derive(Debug)]
pub struct WidgetTree {
    nodes: SlotMap<WidgetId, Widget>,
    root: WidgetId,
}

impl WidgetTree {
    /// Create a tree whose root panel covers `region`.
    pub fn new(region: Rect) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Widget::new(WidgetKind::Panel, region));
        Self { nodes, root }
    }

    /// The root panel.
    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// Number of widgets, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root exists for the tree's lifetime.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if `id` is in the tree.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a widget.
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.nodes.get(id)
    }

    /// Look up a widget mutably.
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.nodes.get_mut(id)
    }

    /// Look up a widget or fail with [`UiError::UnknownWidget`].
    pub fn widget(&self, id: WidgetId) -> Result<&Widget, UiError> {
        self.nodes.get(id).ok_or(UiError::UnknownWidget(id))
    }

    /// Look up a widget mutably or fail with [`UiError::UnknownWidget`].
    pub fn widget_mut(&mut self, id: WidgetId) -> Result<&mut Widget, UiError> {
        self.nodes.get_mut(id).ok_or(UiError::UnknownWidget(id))
    }

    /// The input widget `id`.
    pub fn input_mut(&mut self, id: WidgetId) -> Result<&mut Input, UiError> {
        self.widget_mut(id)?
            .as_input_mut()
            .ok_or(UiError::WrongKind {
                widget: id,
                expected: "input",
            })
    }

    /// Add `widget` as the last (topmost) child of `parent`.
    pub fn insert(&mut self, parent: WidgetId, mut widget: Widget) -> Result<WidgetId, UiError> {
        if !self.nodes.contains_key(parent) {
            return Err(UiError::UnknownWidget(parent));
        }
        widget.parent = Some(parent);
        widget.children.clear();
        let id = self.nodes.insert(widget);
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    /// Remove `id` and everything below it.
    pub fn remove(&mut self, id: WidgetId) -> Result<Widget, UiError> {
        if id == self.root {
            return Err(UiError::RootRemoval);
        }
        let parent = self.widget(id)?.parent;
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        let mut below = self.descendants(id);
        below.retain(|d| *d != id);
        for d in below {
            self.nodes.remove(d);
        }
        self.nodes.remove(id).ok_or(UiError::UnknownWidget(id))
    }

    /// Move `id` under `parent`, as its topmost child.
    pub fn reparent(&mut self, id: WidgetId, parent: WidgetId) -> Result<(), UiError> {
        if id == self.root {
            return Err(UiError::RootRemoval);
        }
        self.widget(id)?;
        self.widget(parent)?;
        if self.ancestors(parent).any(|a| a == id) {
            return Err(UiError::Cycle { widget: id, parent });
        }
        if let Some(old) = self.nodes[id].parent
            && let Some(old) = self.nodes.get_mut(old)
        {
            old.children.retain(|c| *c != id);
        }
        self.nodes[id].parent = Some(parent);
        self.nodes[parent].children.push(id);
        Ok(())
    }

    /// `id` followed by its parent, grandparent and so on up to the root.
    pub fn ancestors(&self, id: WidgetId) -> impl Iterator<Item = WidgetId> + '_ {
        let steps = self.nodes.len();
        std::iter::successors(self.nodes.contains_key(id).then_some(id), move |cur| {
            self.nodes.get(*cur).and_then(|w| w.parent)
        })
        .take(steps)
    }

    /// `id` and every widget below it, parents before children.
    pub fn descendants(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(widget) = self.nodes.get(cur) else {
                continue;
            };
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(cur);
            stack.extend(widget.children.iter().rev());
        }
        out
    }

    /// Check that parent and child links agree and that every widget reaches the root.
    pub fn validate(&self) -> Result<(), UiError> {
        for (id, widget) in &self.nodes {
            for child in &widget.children {
                let linked = self.nodes.get(*child).and_then(|c| c.parent);
                if linked != Some(id) {
                    return Err(UiError::UnknownWidget(*child));
                }
            }
            if self.ancestors(id).last() != Some(self.root) {
                let parent = widget.parent.unwrap_or(self.root);
                return Err(UiError::Cycle { widget: id, parent });
            }
        }
        Ok(())
    }

    /// The deepest visible widget under `at`, searching topmost children first.
    ///
    /// A hit block is returned as soon as it is hit. `None` means `at` is outside the root.
    pub fn hit_test(&self, at: Point) -> Option<WidgetId> {
        self.hit_from(self.root, at, 0)
    }

    fn hit_from(&self, id: WidgetId, at: Point, depth: usize) -> Option<WidgetId> {
        let widget = self.nodes.get(id)?;
        if !widget.visible || !widget.rect.contains(at) || depth > self.nodes.len() {
            return None;
        }
        if widget.hit_block {
            return Some(id);
        }
        widget
            .children
            .iter()
            .rev()
            .find_map(|child| self.hit_from(*child, at, depth + 1))
            .or(Some(id))
    }

    /// Draw every visible widget, parents under children.
    pub fn draw(&mut self, painter: &mut dyn Painter) {
        self.draw_from(self.root, painter);
    }

    fn draw_from(&mut self, id: WidgetId, painter: &mut dyn Painter) {
        let children = match self.nodes.get_mut(id) {
            Some(widget) if widget.visible => {
                widget.draw(painter);
                widget.children.clone()
            }
            _ => return,
        };
        for child in children {
            self.draw_from(child, painter);
        }
    }
}
