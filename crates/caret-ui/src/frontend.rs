//! Event routing between a host window and a [`Workspace`].
//!
//! Each space shown on screen gets a region: a widget tree whose root covers the region, a
//! text area, a scrollbar with its thumb, and a dispatcher. [`Frontend::handle_event`] routes
//! pointer events through the hit test first and falls back to the text area; key presses go
//! through the key map to workspace commands, or to the focused input.
//!
//! Drags are modal. While one runs, pointer moves and timer ticks go to it alone, and it ends
//! on button release, on Esc (which cancels it) or when the window is deactivated.

use crate::dispatcher::{Activation, Dispatcher};
use crate::events::{Event, Key, Modifiers, MouseButton};
use crate::geometry::{Point, Rect};
use crate::input::InputHooks;
use crate::keymap::{Action, KeyContext, Keymap, Trigger};
use crate::render::{Painter, RectStyle};
use crate::resize::{ResizeDrag, ResizeLimits};
use crate::scrollbar::{self, ThumbDrag};
use crate::widget::{CursorKind, UiError, Widget, WidgetId, WidgetKind, WidgetTree};
use caret_core::layout::column_for_visual_x;
use caret_core::text::{char_at, is_word_char};
use caret_core::{
    Command, CommandError, CursorCommand, Document, Position, Rgba, SpaceId, TripleClick,
    ViewCommand, ViewportId, Workspace, word,
};
use std::collections::BTreeMap;
use std::time::Instant;

/// Contexts consulted for keys aimed at document text, most specific first.
const TEXT_CONTEXTS: &[KeyContext] = &[
    KeyContext::Text,
    KeyContext::TextGeneric,
    KeyContext::ScreenEditing,
    KeyContext::Window,
];

/// Contexts consulted while an input has focus.
const INPUT_CONTEXTS: &[KeyContext] = &[
    KeyContext::TextGeneric,
    KeyContext::Text,
    KeyContext::Window,
];

/// Smallest size a resize can shrink a widget to.
const MIN_RESIZE: f64 = 40.0;

/// Text metrics and chrome sizes of a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStyle {
    /// Height of one text line.
    pub line_height: f64,
    /// Width of one character cell.
    pub char_width: f64,
    /// Width of the scrollbar strip on the right.
    pub scrollbar_width: f64,
    /// Space left of column 0 (line numbers and the like).
    pub gutter: f64,
}

impl Default for RegionStyle {
    fn default() -> Self {
        Self {
            line_height: 20.0,
            char_width: 8.0,
            scrollbar_width: 12.0,
            gutter: 0.0,
        }
    }
}

/// What became of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The frontend consumed it.
    Handled,
    /// The host should process it.
    PassThrough,
    /// A bound action the host implements (search and the like).
    Host(Action),
}

/// A text drag selection.
///
/// `init_range` is what the initial click selected: a caret, or a word for a double-click
/// drag. The selection always covers it and grows towards the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSelect {
    init_range: (Position, Position),
    init_focus: Position,
    words: bool,
    last: Point,
}

impl DragSelect {
    /// Start from the selection `(anchor, focus)` made by the press at `at`.
    pub fn new(anchor: Position, focus: Position, words: bool, at: Point) -> Self {
        Self {
            init_range: (anchor.min(focus), anchor.max(focus)),
            init_focus: focus,
            words,
            last: at,
        }
    }

    /// Range selected by the initial press.
    pub fn init_range(&self) -> (Position, Position) {
        self.init_range
    }

    /// Last pointer position seen.
    pub fn last(&self) -> Point {
        self.last
    }

    /// `(anchor, focus)` with the pointer over `pos`.
    pub fn modal_select(&self, pos: Position) -> (Position, Position) {
        let (start, end) = self.init_range;
        if pos < start {
            (end, pos)
        } else if pos > end {
            (start, pos)
        } else if self.init_focus == start {
            (end, start)
        } else {
            (start, end)
        }
    }

    /// Like [`modal_select`](Self::modal_select), but a word drag extends the focus to the
    /// edge of the word under the pointer.
    pub fn modal_snap_select(&self, doc: &Document, pos: Position) -> (Position, Position) {
        let (anchor, focus) = self.modal_select(pos);
        if !self.words || (focus >= self.init_range.0 && focus <= self.init_range.1) {
            return (anchor, focus);
        }
        let line = doc.line_text(focus.line);
        let col = focus.column;
        let inside_word = col > 0
            && char_at(&line, col - 1).is_some_and(is_word_char)
            && char_at(&line, col).is_some_and(is_word_char);
        if !inside_word {
            return (anchor, focus);
        }
        let snapped = if focus > self.init_range.1 {
            word::next_word_boundary(&line, col, true)
        } else {
            word::prev_word_boundary(&line, col, true)
        };
        (anchor, Position::new(focus.line, snapped))
    }
}

/// The drag currently in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modal {
    /// Scrollbar thumb drag.
    ThumbDrag(ThumbDrag),
    /// Widget resize.
    Resize(ResizeDrag),
    /// Text selection drag.
    DragSelect(DragSelect),
    /// Middle-button panning.
    Pan {
        /// Pointer height at the last move.
        last_y: f64,
    },
}

#[derive(Debug)]
struct Region {
    bounds: Rect,
    style: RegionStyle,
    tree: WidgetTree,
    dispatcher: Dispatcher,
    text_area: WidgetId,
    scrollbar: WidgetId,
    viewport: ViewportId,
    input_hooks: Option<InputHooks>,
    overlays: Vec<WidgetId>,
}

impl Region {
    fn text_rect(&self) -> Rect {
        self.tree
            .get(self.text_area)
            .map_or(self.bounds, |w| w.rect)
    }

    /// Install or remove the input hooks to match the focus stack.
    fn sync_input_hooks(&mut self, workspace: &mut Workspace, space: SpaceId) {
        match (self.dispatcher.focused(), self.input_hooks.take()) {
            (Some(_), None) => {
                self.input_hooks = Some(InputHooks::install(workspace.overrides_mut(), space));
            }
            (None, Some(hooks)) => hooks.remove(workspace.overrides_mut()),
            (_, hooks) => self.input_hooks = hooks,
        }
    }

    /// Apply the commands the hooks diverted to the focused input.
    fn flush_input(&mut self, workspace: &mut Workspace) -> Result<usize, UiError> {
        let Some(hooks) = &self.input_hooks else {
            return Ok(0);
        };
        let queued = hooks.drain();
        let Some(id) = self.dispatcher.focused() else {
            return Ok(0);
        };
        let input = self.tree.input_mut(id)?;
        for command in &queued {
            input.apply(command, workspace.clipboard_mut())?;
        }
        Ok(queued.len())
    }

    fn remove_widget(&mut self, id: WidgetId) -> Result<(), UiError> {
        let gone = self.tree.descendants(id);
        self.tree.remove(id)?;
        for widget in gone {
            self.dispatcher.forget(widget);
            self.overlays.retain(|o| *o != widget);
        }
        Ok(())
    }
}

/// Routes host events for every space shown on screen.
#[derive(Debug)]
pub struct Frontend {
    workspace: Workspace,
    regions: BTreeMap<SpaceId, Region>,
    keymap: Keymap,
    modal: Option<(SpaceId, Modal)>,
    hovered_region: Option<SpaceId>,
}

impl Frontend {
    /// Wrap `workspace` with the default key map.
    pub fn new(workspace: Workspace) -> Self {
        Self::with_keymap(workspace, Keymap::default())
    }

    /// Wrap `workspace` with `keymap`.
    pub fn with_keymap(workspace: Workspace, keymap: Keymap) -> Self {
        Self {
            workspace,
            regions: BTreeMap::new(),
            keymap,
            modal: None,
            hovered_region: None,
        }
    }

    /// The workspace.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// The workspace, mutably.
    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    /// The key map.
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// The key map, mutably.
    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// The drag in progress.
    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref().map(|(_, modal)| modal)
    }

    // Regions

    /// Show `space` in `bounds`.
    pub fn add_region(
        &mut self,
        space: SpaceId,
        bounds: Rect,
        style: RegionStyle,
    ) -> Result<(), UiError> {
        let viewport = self
            .workspace
            .space(space)
            .and_then(|s| s.viewport)
            .ok_or(UiError::UnknownSpace(space))?;
        let thumb_color = self.workspace.preferences().scrollbar_thumb_color;

        let mut tree = WidgetTree::new(bounds);
        let root = tree.root();
        let bar_w = style.scrollbar_width.min(bounds.w);
        let text_rect = Rect::new(bounds.x, bounds.y, bounds.w - bar_w, bounds.h);
        let bar_rect = Rect::new(bounds.right() - bar_w, bounds.y, bar_w, bounds.h);

        let text_area = tree.insert(
            root,
            Widget::new(WidgetKind::TextArea, text_rect).for_space(space),
        )?;
        let scrollbar = tree.insert(
            root,
            Widget::new(
                WidgetKind::Scrollbar {
                    viewport,
                    thumb: None,
                },
                bar_rect,
            )
            .with_style(RectStyle::filled(Rgba::new(0.0, 0.0, 0.0, 0.15)))
            .for_space(space),
        )?;
        let thumb = tree.insert(
            scrollbar,
            Widget::new(WidgetKind::Thumb { viewport }, bar_rect)
                .with_style(RectStyle::filled(thumb_color).rounded(bar_w / 2.0))
                .for_space(space),
        )?;
        if let WidgetKind::Scrollbar { thumb: slot, .. } = &mut tree.widget_mut(scrollbar)?.kind {
            *slot = Some(thumb);
        }

        self.workspace
            .set_view_metrics(space, text_rect.h, style.line_height)?;
        scrollbar::sync_thumb(&mut tree, scrollbar, self.workspace.scroll())?;
        tracing::debug!(%space, ?bounds, "region added");

        if let Some(old) = self.regions.insert(
            space,
            Region {
                bounds,
                style,
                tree,
                dispatcher: Dispatcher::new(),
                text_area,
                scrollbar,
                viewport,
                input_hooks: None,
                overlays: Vec::new(),
            },
        ) && let Some(hooks) = old.input_hooks
        {
            hooks.remove(self.workspace.overrides_mut());
        }
        Ok(())
    }

    /// Stop showing `space`.
    pub fn remove_region(&mut self, space: SpaceId) -> bool {
        let Some(region) = self.regions.remove(&space) else {
            return false;
        };
        if let Some(hooks) = region.input_hooks {
            hooks.remove(self.workspace.overrides_mut());
        }
        if self.modal.is_some_and(|(s, _)| s == space) {
            self.modal = None;
        }
        if self.hovered_region == Some(space) {
            self.hovered_region = None;
        }
        true
    }

    fn region(&self, space: SpaceId) -> Result<&Region, UiError> {
        self.regions.get(&space).ok_or(UiError::UnknownSpace(space))
    }

    fn region_mut(&mut self, space: SpaceId) -> Result<&mut Region, UiError> {
        self.regions
            .get_mut(&space)
            .ok_or(UiError::UnknownSpace(space))
    }

    /// Widget tree of `space`.
    pub fn tree(&self, space: SpaceId) -> Result<&WidgetTree, UiError> {
        Ok(&self.region(space)?.tree)
    }

    /// Widget tree of `space`, mutably.
    pub fn tree_mut(&mut self, space: SpaceId) -> Result<&mut WidgetTree, UiError> {
        Ok(&mut self.region_mut(space)?.tree)
    }

    /// Add `widget` under `parent` (the region root when `None`).
    pub fn add_widget(
        &mut self,
        space: SpaceId,
        parent: Option<WidgetId>,
        widget: Widget,
    ) -> Result<WidgetId, UiError> {
        let region = self.region_mut(space)?;
        let parent = parent.unwrap_or_else(|| region.tree.root());
        region.tree.insert(parent, widget.for_space(space))
    }

    /// Remove a widget and its subtree.
    pub fn remove_widget(&mut self, space: SpaceId, id: WidgetId) -> Result<(), UiError> {
        let Self {
            workspace, regions, ..
        } = self;
        let region = regions.get_mut(&space).ok_or(UiError::UnknownSpace(space))?;
        region.remove_widget(id)?;
        region.sync_input_hooks(workspace, space);
        Ok(())
    }

    /// Add `widget` on top of everything as an overlay. Esc dismisses overlays, newest first.
    pub fn show_overlay(&mut self, space: SpaceId, widget: Widget) -> Result<WidgetId, UiError> {
        let id = self.add_widget(space, None, widget)?;
        self.region_mut(space)?.overlays.push(id);
        Ok(id)
    }

    /// Remove the newest overlay of `space`.
    pub fn dismiss_overlay(&mut self, space: SpaceId) -> Result<Option<WidgetId>, UiError> {
        let Self {
            workspace, regions, ..
        } = self;
        let region = regions.get_mut(&space).ok_or(UiError::UnknownSpace(space))?;
        let Some(id) = region.overlays.pop() else {
            return Ok(None);
        };
        region.remove_widget(id)?;
        region.sync_input_hooks(workspace, space);
        Ok(Some(id))
    }

    /// Overlays of `space`, oldest first.
    pub fn overlays(&self, space: SpaceId) -> Result<&[WidgetId], UiError> {
        Ok(&self.region(space)?.overlays)
    }

    /// Give keyboard focus to the input `id`.
    pub fn focus_input(&mut self, space: SpaceId, id: WidgetId) -> Result<(), UiError> {
        let Self {
            workspace, regions, ..
        } = self;
        let region = regions.get_mut(&space).ok_or(UiError::UnknownSpace(space))?;
        region.dispatcher.clear_focus(&mut region.tree);
        region.dispatcher.push_focus(&mut region.tree, id)?;
        region.sync_input_hooks(workspace, space);
        Ok(())
    }

    /// Input holding keyboard focus in `space`.
    pub fn focused_input(&self, space: SpaceId) -> Option<WidgetId> {
        self.regions.get(&space)?.dispatcher.focused()
    }

    /// Pointer shape the host should show over `space`.
    pub fn cursor(&self, space: SpaceId) -> CursorKind {
        self.regions
            .get(&space)
            .map_or(CursorKind::Default, |r| r.dispatcher.cursor())
    }

    /// Returns `true` while the host should keep its redraw timer running.
    pub fn needs_timer(&self) -> bool {
        self.workspace.scroll().is_animating()
            || matches!(self.modal, Some((_, Modal::DragSelect(_))))
    }

    /// Document position under `at`, clamped to the document.
    pub fn position_at(&self, space: SpaceId, at: Point) -> Option<Position> {
        let region = self.regions.get(&space)?;
        let doc = self
            .workspace
            .active_document(space)
            .and_then(|id| self.workspace.document(id))?;
        let rect = region.text_rect();
        let style = region.style;
        let top = self.workspace.scroll().position(region.viewport);
        let line_f = top + (at.y - rect.y) / style.line_height.max(1.0);
        let last = doc.num_lines().saturating_sub(1);
        let line = (line_f.floor().max(0.0) as usize).min(last);
        let cells = ((at.x - rect.x - style.gutter) / style.char_width.max(1.0) + 0.5)
            .floor()
            .max(0.0) as usize;
        let column = column_for_visual_x(&doc.line_text(line), cells, doc.tab_width());
        Some(Position::new(line, column))
    }

    /// Draw the widgets of `space`.
    pub fn draw(&mut self, space: SpaceId, painter: &mut dyn Painter) -> Result<(), UiError> {
        let Self {
            workspace, regions, ..
        } = self;
        let region = regions.get_mut(&space).ok_or(UiError::UnknownSpace(space))?;
        scrollbar::sync_thumb(&mut region.tree, region.scrollbar, workspace.scroll())?;
        region.tree.draw(painter);
        Ok(())
    }

    // Events

    /// Route one host event aimed at `space`.
    pub fn handle_event(
        &mut self,
        space: SpaceId,
        event: Event,
        now: Instant,
    ) -> Result<EventOutcome, UiError> {
        match event {
            Event::KeyPress {
                key,
                modifiers,
                text,
                repeat,
            } => self.key_press(space, key, modifiers, &text, repeat, now),
            Event::MousePress {
                button,
                at,
                modifiers,
            } => self.mouse_press(space, button, at, modifiers, now),
            Event::MouseRelease { .. } => {
                if self.end_modal(false)? {
                    Ok(EventOutcome::Handled)
                } else {
                    Ok(EventOutcome::PassThrough)
                }
            }
            Event::DoubleClick { at } => self.multi_click(space, at, 2, now),
            Event::TripleClick { at } => self.multi_click(space, at, 3, now),
            Event::MouseMove { at } => self.mouse_move(space, at, now),
            Event::Wheel {
                ticks,
                at,
                modifiers,
            } => self.wheel(space, ticks, at, modifiers, now),
            Event::Timer => self.timer(now),
            Event::WindowDeactivate => {
                self.end_modal(false)?;
                Ok(EventOutcome::Handled)
            }
        }
    }

    fn key_press(
        &mut self,
        space: SpaceId,
        key: Key,
        modifiers: Modifiers,
        text: &str,
        repeat: bool,
        now: Instant,
    ) -> Result<EventOutcome, UiError> {
        let focused = self.region(space)?.dispatcher.focused().is_some();
        let contexts = if focused { INPUT_CONTEXTS } else { TEXT_CONTEXTS };
        let binding = self
            .keymap
            .lookup(contexts, Trigger::Key(key), modifiers, repeat)
            .copied();

        if key == Key::Escape || binding.is_some_and(|b| b.action == Action::Dismiss) {
            return self.dismiss(space);
        }

        let command = match binding {
            Some(b) if b.action == Action::Search => return Ok(EventOutcome::Host(Action::Search)),
            Some(b) => b.command(text),
            None if !text.is_empty() && !modifiers.ctrl && !modifiers.oskey => {
                Action::InsertText.command(false, 0, text)
            }
            None => None,
        };
        match command {
            Some(command) => self.execute_command(space, command, now),
            None => Ok(EventOutcome::PassThrough),
        }
    }

    /// Esc: cancel a drag, else close the newest overlay, else defocus the input.
    fn dismiss(&mut self, space: SpaceId) -> Result<EventOutcome, UiError> {
        if self.end_modal(true)? {
            return Ok(EventOutcome::Handled);
        }
        if self.dismiss_overlay(space)?.is_some() {
            return Ok(EventOutcome::Handled);
        }
        let Self {
            workspace, regions, ..
        } = self;
        let region = regions.get_mut(&space).ok_or(UiError::UnknownSpace(space))?;
        if region.dispatcher.clear_focus(&mut region.tree).is_empty() {
            return Ok(EventOutcome::PassThrough);
        }
        region.sync_input_hooks(workspace, space);
        Ok(EventOutcome::Handled)
    }

    /// Run `command` in `space`, then hand anything the input hooks diverted to the input.
    fn execute_command(
        &mut self,
        space: SpaceId,
        command: Command,
        now: Instant,
    ) -> Result<EventOutcome, UiError> {
        let Self {
            workspace, regions, ..
        } = self;
        let region = regions.get_mut(&space).ok_or(UiError::UnknownSpace(space))?;
        match workspace.execute_at(space, command.clone(), now) {
            Ok(result) => tracing::trace!(%space, ?result, "key command"),
            Err(CommandError::NoDocument(_)) => {
                // Hooks never run without a document; feed the input directly.
                let Some(id) = region.dispatcher.focused() else {
                    return Ok(EventOutcome::PassThrough);
                };
                region
                    .tree
                    .input_mut(id)?
                    .apply(&command, workspace.clipboard_mut())?;
                return Ok(EventOutcome::Handled);
            }
            Err(err) => return Err(err.into()),
        }
        region.flush_input(workspace)?;
        scrollbar::sync_thumb(&mut region.tree, region.scrollbar, workspace.scroll())?;
        Ok(EventOutcome::Handled)
    }

    fn mouse_press(
        &mut self,
        space: SpaceId,
        button: MouseButton,
        at: Point,
        modifiers: Modifiers,
        now: Instant,
    ) -> Result<EventOutcome, UiError> {
        match button {
            MouseButton::Left => {}
            MouseButton::Middle => {
                if !self.region(space)?.text_rect().contains(at) {
                    return Ok(EventOutcome::PassThrough);
                }
                self.end_modal(false)?;
                self.modal = Some((space, Modal::Pan { last_y: at.y }));
                return Ok(EventOutcome::Handled);
            }
            MouseButton::Right => return Ok(EventOutcome::PassThrough),
        }
        let ui_mouse = self
            .keymap
            .lookup(TEXT_CONTEXTS, Trigger::LeftMouse, Modifiers::NONE, false)
            .is_some_and(|b| b.action == Action::UiMouse);
        if !ui_mouse {
            return Ok(EventOutcome::PassThrough);
        }
        self.end_modal(false)?;

        let Self {
            workspace, regions, ..
        } = self;
        let region = regions.get_mut(&space).ok_or(UiError::UnknownSpace(space))?;
        let press = region.dispatcher.press(&mut region.tree, at);
        region.sync_input_hooks(workspace, space);
        let bounds = region.bounds;

        match press.activation {
            Activation::PageJump {
                viewport,
                direction,
            } => {
                scrollbar::page_jump(workspace.scroll_mut(), viewport, direction, now);
            }
            Activation::ThumbDrag { thumb } => {
                let drag = ThumbDrag::start(&region.tree, thumb, at)?;
                self.modal = Some((space, Modal::ThumbDrag(drag)));
            }
            Activation::Resize { target, mode, .. } => {
                let limits = ResizeLimits::new(MIN_RESIZE, MIN_RESIZE, bounds);
                let drag = ResizeDrag::start(&region.tree, target, mode, at, limits)?;
                self.modal = Some((space, Modal::Resize(drag)));
            }
            Activation::Text { at } => return self.text_press(space, at, modifiers.shift, now),
            Activation::PassThrough => return Ok(EventOutcome::PassThrough),
            Activation::ListSelect { .. } | Activation::FocusInput { .. } | Activation::None => {}
        }
        Ok(EventOutcome::Handled)
    }

    fn text_press(
        &mut self,
        space: SpaceId,
        at: Point,
        extend: bool,
        now: Instant,
    ) -> Result<EventOutcome, UiError> {
        let Some(pos) = self.position_at(space, at) else {
            return Ok(EventOutcome::PassThrough);
        };
        let set = Command::Cursor(CursorCommand::SetCursor {
            line: pos.line,
            column: pos.column,
            extend,
        });
        self.execute_command(space, set, now)?;
        self.start_drag_select(space, at, false);
        Ok(EventOutcome::Handled)
    }

    fn start_drag_select(&mut self, space: SpaceId, at: Point, words: bool) {
        let Some(doc) = self
            .workspace
            .active_document(space)
            .and_then(|id| self.workspace.document(id))
        else {
            return;
        };
        let cursor = doc.cursor();
        let drag = DragSelect::new(cursor.anchor, cursor.focus, words, at);
        self.modal = Some((space, Modal::DragSelect(drag)));
    }

    fn multi_click(
        &mut self,
        space: SpaceId,
        at: Point,
        clicks: u8,
        now: Instant,
    ) -> Result<EventOutcome, UiError> {
        let region = self.region(space)?;
        if region.tree.hit_test(at) != Some(region.text_area) {
            return Ok(EventOutcome::PassThrough);
        }
        let Some(pos) = self.position_at(space, at) else {
            return Ok(EventOutcome::PassThrough);
        };
        self.end_modal(false)?;
        let command = match (clicks, self.workspace.preferences().triple_click) {
            (2, _) => CursorCommand::SelectWord { at: pos },
            (_, TripleClick::Line) => CursorCommand::SelectLine { line: pos.line },
            (_, TripleClick::Path) => {
                let set = CursorCommand::SetCursor {
                    line: pos.line,
                    column: pos.column,
                    extend: false,
                };
                self.execute_command(space, Command::Cursor(set), now)?;
                CursorCommand::ExpandToPath
            }
        };
        self.execute_command(space, Command::Cursor(command), now)?;
        if clicks == 2 {
            self.start_drag_select(space, at, true);
        }
        Ok(EventOutcome::Handled)
    }

    fn mouse_move(&mut self, space: SpaceId, at: Point, now: Instant) -> Result<EventOutcome, UiError> {
        if let Some((modal_space, modal)) = self.modal {
            return self.modal_move(modal_space, modal, at, now);
        }

        // Pointer changed region: the old one gets its leave first.
        if self.hovered_region != Some(space) {
            if let Some(old) = self.hovered_region
                && let Some(region) = self.regions.get_mut(&old)
            {
                region.dispatcher.leave(&mut region.tree);
            }
            self.hovered_region = Some(space);
        }
        let tracks = self
            .keymap
            .lookup(TEXT_CONTEXTS, Trigger::MouseMove, Modifiers::NONE, false)
            .is_some_and(|b| b.action == Action::UiLeaveHandler);
        if !tracks {
            return Ok(EventOutcome::PassThrough);
        }
        let region = self.region_mut(space)?;
        region.dispatcher.mouse_move(&mut region.tree, at);
        Ok(EventOutcome::Handled)
    }

    fn modal_move(
        &mut self,
        space: SpaceId,
        modal: Modal,
        at: Point,
        now: Instant,
    ) -> Result<EventOutcome, UiError> {
        match modal {
            Modal::ThumbDrag(drag) => {
                drag.on_move(self.workspace.scroll_mut(), at);
                let Self {
                    workspace, regions, ..
                } = self;
                let region = regions.get_mut(&space).ok_or(UiError::UnknownSpace(space))?;
                scrollbar::sync_thumb(&mut region.tree, region.scrollbar, workspace.scroll())?;
            }
            Modal::Resize(drag) => {
                drag.on_move(&mut self.region_mut(space)?.tree, at)?;
            }
            Modal::DragSelect(mut drag) => {
                drag.last = at;
                self.modal = Some((space, Modal::DragSelect(drag)));
                self.drag_select_to(space, &drag, at, now)?;
            }
            Modal::Pan { last_y } => {
                let line_height = self.region(space)?.style.line_height.max(1.0);
                let lines = (last_y - at.y) / line_height;
                self.modal = Some((space, Modal::Pan { last_y: at.y }));
                let command = Command::View(ViewCommand::ScrollContinuous { lines });
                self.execute_command(space, command, now)?;
            }
        }
        Ok(EventOutcome::Handled)
    }

    fn drag_select_to(
        &mut self,
        space: SpaceId,
        drag: &DragSelect,
        at: Point,
        now: Instant,
    ) -> Result<(), UiError> {
        let Some(pos) = self.position_at(space, at) else {
            return Ok(());
        };
        let Some(doc) = self
            .workspace
            .active_document(space)
            .and_then(|id| self.workspace.document(id))
        else {
            return Ok(());
        };
        let (anchor, focus) = drag.modal_snap_select(doc, pos);
        let command = Command::Cursor(CursorCommand::Select { anchor, focus });
        self.execute_command(space, command, now)?;
        Ok(())
    }

    /// End the running drag. With `cancel`, undo what it did where that makes sense.
    fn end_modal(&mut self, cancel: bool) -> Result<bool, UiError> {
        let Some((space, modal)) = self.modal.take() else {
            return Ok(false);
        };
        match modal {
            Modal::Resize(drag) => {
                let tree = &mut self.region_mut(space)?.tree;
                if cancel {
                    drag.cancel(tree)?;
                } else {
                    drag.finish(tree)?;
                }
            }
            Modal::DragSelect(drag) if cancel => {
                let (start, end) = drag.init_range();
                let (anchor, focus) = if drag.init_focus == start {
                    (end, start)
                } else {
                    (start, end)
                };
                let command = Command::Cursor(CursorCommand::Select { anchor, focus });
                self.execute_command(space, command, Instant::now())?;
            }
            Modal::ThumbDrag(_) | Modal::DragSelect(_) | Modal::Pan { .. } => {}
        }
        tracing::debug!(%space, cancel, "modal ended");
        Ok(true)
    }

    fn wheel(
        &mut self,
        space: SpaceId,
        ticks: i32,
        at: Point,
        modifiers: Modifiers,
        now: Instant,
    ) -> Result<EventOutcome, UiError> {
        if ticks == 0 {
            return Ok(EventOutcome::Handled);
        }
        let lines_per_tick = f64::from(self.workspace.preferences().num_scroll_lines);
        let region = self.region_mut(space)?;

        // Scrollable widgets take the wheel before the document does.
        if let Some(id) = region.tree.hit_test(at)
            && let Ok(widget) = region.tree.widget_mut(id)
        {
            let height = widget.rect.h;
            let text = match &mut widget.kind {
                WidgetKind::ListView(list) => Some(list.text_mut()),
                WidgetKind::TextView(view) => Some(view.text_mut()),
                _ => None,
            };
            if let Some(text) = text {
                text.scroll_by(f64::from(ticks) * lines_per_tick, height);
                return Ok(EventOutcome::Handled);
            }
        }

        let trigger = if ticks < 0 {
            Trigger::WheelUp
        } else {
            Trigger::WheelDown
        };
        let Some(binding) = self
            .keymap
            .lookup(TEXT_CONTEXTS, trigger, modifiers, false)
            .copied()
        else {
            return Ok(EventOutcome::PassThrough);
        };
        let command = match binding.action {
            Action::ScrollLines => Command::View(ViewCommand::Wheel {
                ticks,
                alt: modifiers.alt,
            }),
            _ => match binding.command("") {
                Some(command) => command,
                None => return Ok(EventOutcome::Host(binding.action)),
            },
        };
        self.execute_command(space, command, now)
    }

    fn timer(&mut self, now: Instant) -> Result<EventOutcome, UiError> {
        self.workspace.tick(now);

        // Keep selecting while the pointer rests above or below the text.
        if let Some((space, Modal::DragSelect(drag))) = self.modal {
            let region = self.region(space)?;
            let rect = region.text_rect();
            let viewport = region.viewport;
            let at = drag.last();
            let lines = if at.y < rect.y {
                -1.0
            } else if at.y >= rect.bottom() {
                1.0
            } else {
                0.0
            };
            if lines != 0.0 {
                self.workspace.scroll_mut().scroll_continuous(viewport, lines);
                self.drag_select_to(space, &drag, at, now)?;
            }
        }

        let Self {
            workspace, regions, ..
        } = self;
        for region in regions.values_mut() {
            scrollbar::sync_thumb(&mut region.tree, region.scrollbar, workspace.scroll())?;
        }
        Ok(EventOutcome::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(anchor: (usize, usize), focus: (usize, usize), words: bool) -> DragSelect {
        DragSelect::new(
            Position::new(anchor.0, anchor.1),
            Position::new(focus.0, focus.1),
            words,
            Point::default(),
        )
    }

    #[test]
    fn test_modal_select_keeps_initial_range() {
        let d = drag((0, 6), (0, 10), true);
        let p = Position::new;
        assert_eq!(d.modal_select(p(0, 12)), (p(0, 6), p(0, 12)));
        assert_eq!(d.modal_select(p(0, 2)), (p(0, 10), p(0, 2)));
        assert_eq!(d.modal_select(p(0, 8)), (p(0, 6), p(0, 10)));
    }

    #[test]
    fn test_modal_snap_select_extends_to_word_edges() {
        let doc = Document::from_text("t", "alpha beta gamma");
        let d = drag((0, 6), (0, 10), true);
        let p = Position::new;
        assert_eq!(d.modal_snap_select(&doc, p(0, 13)), (p(0, 6), p(0, 16)));
        assert_eq!(d.modal_snap_select(&doc, p(0, 2)), (p(0, 10), p(0, 0)));
        assert_eq!(d.modal_snap_select(&doc, p(0, 11)), (p(0, 6), p(0, 11)));

        let plain = drag((0, 6), (0, 6), false);
        assert_eq!(plain.modal_snap_select(&doc, p(0, 13)), (p(0, 6), p(0, 13)));
    }
}
