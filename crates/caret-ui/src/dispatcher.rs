//! Pointer routing and keyboard focus for one region.
//!
//! The dispatcher remembers which widget is under the pointer and which inputs hold focus.
//! It turns pointer moves into enter/leave notifications and presses into an [`Activation`]
//! the frontend carries out (a page jump, a drag, a focus change and so on).

use crate::geometry::Point;
use crate::resize::ResizeMode;
use crate::widget::{CursorKind, UiError, WidgetId, WidgetKind, WidgetTree};
use caret_core::ViewportId;

/// Hover change produced by a pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverChange {
    /// Widget the pointer left.
    pub left: Option<WidgetId>,
    /// Widget the pointer entered.
    pub entered: Option<WidgetId>,
    /// Pointer shape the host should show now.
    pub cursor: CursorKind,
}

/// What a press on a widget asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// Page the viewport up (`-1`) or down (`1`).
    PageJump {
        /// Viewport to page.
        viewport: ViewportId,
        /// Direction of the jump.
        direction: i32,
    },
    /// Start dragging a scrollbar thumb.
    ThumbDrag {
        /// The thumb.
        thumb: WidgetId,
    },
    /// Start resizing `target`.
    Resize {
        /// Handle that was pressed.
        handle: WidgetId,
        /// Widget being resized.
        target: WidgetId,
        /// Edge or corner.
        mode: ResizeMode,
    },
    /// A list row was selected (or the selection cleared).
    ListSelect {
        /// The list.
        list: WidgetId,
        /// The selected row.
        row: Option<usize>,
    },
    /// An input took keyboard focus with the caret at `column`.
    FocusInput {
        /// The input.
        input: WidgetId,
        /// Caret column.
        column: usize,
    },
    /// The press landed on document text.
    Text {
        /// Where.
        at: Point,
    },
    /// The press hit a widget that does nothing with it.
    None,
    /// The press is outside the region.
    PassThrough,
}

/// Result of a press.
#[derive(Debug, Clone, PartialEq)]
pub struct Press {
    /// Widget under the pointer.
    pub hit: Option<WidgetId>,
    /// What the widget asked for.
    pub activation: Activation,
    /// Inputs that lost focus because of the press.
    pub defocused: Vec<WidgetId>,
}

/// Hover and focus state of one region.
#[derive(Debug, Default)]
pub struct Dispatcher {
    hovered: Option<WidgetId>,
    cursor: CursorKind,
    focus: Vec<WidgetId>,
}

impl Dispatcher {
    /// A dispatcher with nothing hovered or focused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Widget under the pointer.
    pub fn hovered(&self) -> Option<WidgetId> {
        self.hovered
    }

    /// Pointer shape last reported.
    pub fn cursor(&self) -> CursorKind {
        self.cursor
    }

    /// Track the pointer at `at`. Returns the change when the hovered widget differs.
    pub fn mouse_move(&mut self, tree: &mut WidgetTree, at: Point) -> Option<HoverChange> {
        let hit = tree.hit_test(at);
        if let Some(id) = hit
            && let Some(widget) = tree.get_mut(id)
        {
            widget.on_hover(at);
        }
        self.hover(tree, hit)
    }

    /// The pointer left the region.
    pub fn leave(&mut self, tree: &mut WidgetTree) -> Option<HoverChange> {
        self.hover(tree, None)
    }

    fn hover(&mut self, tree: &mut WidgetTree, hit: Option<WidgetId>) -> Option<HoverChange> {
        if hit == self.hovered {
            return None;
        }
        let left = self.hovered.take();
        if let Some(widget) = left.and_then(|id| tree.get_mut(id)) {
            widget.on_leave();
        }
        self.cursor = match hit.and_then(|id| tree.get_mut(id)) {
            Some(widget) => {
                widget.on_enter();
                widget.cursor
            }
            None => CursorKind::Default,
        };
        self.hovered = hit;
        tracing::trace!(?left, entered = ?hit, cursor = ?self.cursor, "hover changed");
        Some(HoverChange {
            left,
            entered: hit,
            cursor: self.cursor,
        })
    }

    /// Activate the widget under `at`.
    ///
    /// Pressing anywhere but a focused input clears the focus stack.
    pub fn press(&mut self, tree: &mut WidgetTree, at: Point) -> Press {
        let Some(hit) = tree.hit_test(at) else {
            let defocused = self.clear_focus(tree);
            return Press {
                hit: None,
                activation: Activation::PassThrough,
                defocused,
            };
        };
        let activation = activate(tree, hit, at);
        let keeps_focus = matches!(activation, Activation::FocusInput { input, .. } if self.focus.contains(&input));
        let mut defocused = Vec::new();
        if !keeps_focus {
            defocused = self.clear_focus(tree);
            if let Activation::FocusInput { input, .. } = activation
                && let Err(err) = self.push_focus(tree, input)
            {
                tracing::warn!(%err, "cannot focus input");
            }
        }
        tracing::debug!(?hit, ?activation, "press");
        Press {
            hit: Some(hit),
            activation,
            defocused,
        }
    }

    /// Give keyboard focus to the input `id`.
    pub fn push_focus(&mut self, tree: &mut WidgetTree, id: WidgetId) -> Result<(), UiError> {
        tree.input_mut(id)?.focus_gained();
        self.focus.retain(|f| *f != id);
        self.focus.push(id);
        Ok(())
    }

    /// Take focus from the most recently focused input.
    pub fn pop_focus(&mut self, tree: &mut WidgetTree) -> Option<WidgetId> {
        let id = self.focus.pop()?;
        if let Ok(input) = tree.input_mut(id) {
            input.focus_lost();
        }
        Some(id)
    }

    /// Input holding keyboard focus.
    pub fn focused(&self) -> Option<WidgetId> {
        self.focus.last().copied()
    }

    /// Take focus from every input. Returns them, most recent first.
    pub fn clear_focus(&mut self, tree: &mut WidgetTree) -> Vec<WidgetId> {
        let mut out = Vec::with_capacity(self.focus.len());
        while let Some(id) = self.pop_focus(tree) {
            out.push(id);
        }
        out
    }

    /// Drop any reference to a removed widget.
    pub fn forget(&mut self, id: WidgetId) {
        self.focus.retain(|f| *f != id);
        if self.hovered == Some(id) {
            self.hovered = None;
            self.cursor = CursorKind::Default;
        }
    }
}

fn activate(tree: &mut WidgetTree, id: WidgetId, at: Point) -> Activation {
    let thumb_rect = match tree.get(id).map(|w| &w.kind) {
        Some(WidgetKind::Scrollbar { thumb: Some(thumb), .. }) => tree.get(*thumb).map(|t| t.rect),
        _ => None,
    };
    let Some(widget) = tree.get_mut(id) else {
        return Activation::None;
    };
    let rect = widget.rect;
    match &mut widget.kind {
        WidgetKind::Panel | WidgetKind::TextView(_) => Activation::None,
        WidgetKind::TextArea => Activation::Text { at },
        WidgetKind::Scrollbar { viewport, .. } => {
            let above = match thumb_rect {
                Some(thumb) => at.y < thumb.y,
                None => at.y < rect.y + rect.h / 2.0,
            };
            Activation::PageJump {
                viewport: *viewport,
                direction: if above { -1 } else { 1 },
            }
        }
        WidgetKind::Thumb { .. } => Activation::ThumbDrag { thumb: id },
        WidgetKind::EdgeResizer { edge, target } => Activation::Resize {
            handle: id,
            target: *target,
            mode: ResizeMode::Edge(*edge),
        },
        WidgetKind::BoxResizer { target } => Activation::Resize {
            handle: id,
            target: *target,
            mode: ResizeMode::Corner,
        },
        WidgetKind::ListView(list) => {
            let row = list.text().line_at(rect, at.y);
            list.select(row);
            Activation::ListSelect { list: id, row }
        }
        WidgetKind::Input(input) => {
            let column = input.column_in(rect, at.x);
            input.set_cursor(column, false);
            Activation::FocusInput { input: id, column }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::input::Input;
    use crate::widget::Widget;

    fn tree_with_input() -> (WidgetTree, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new(Rect::new(0.0, 0.0, 200.0, 100.0));
        let root = tree.root();
        let text = tree
            .insert(root, Widget::new(WidgetKind::TextArea, Rect::new(0.0, 0.0, 200.0, 80.0)))
            .unwrap();
        let input = Widget::new(
            WidgetKind::Input(Box::new(Input::new("find"))),
            Rect::new(0.0, 80.0, 200.0, 20.0),
        );
        let input = tree.insert(root, input).unwrap();
        (tree, text, input)
    }

    #[test]
    fn test_mouse_move_reports_enter_and_leave() {
        let (mut tree, text, input) = tree_with_input();
        let mut d = Dispatcher::new();

        let change = d.mouse_move(&mut tree, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(change.entered, Some(text));
        assert_eq!(change.cursor, CursorKind::Text);
        assert!(d.mouse_move(&mut tree, Point::new(20.0, 20.0)).is_none());

        let change = d.mouse_move(&mut tree, Point::new(10.0, 90.0)).unwrap();
        assert_eq!((change.left, change.entered), (Some(text), Some(input)));
        assert!(!tree.widget(text).unwrap().is_hovered());
        assert!(tree.widget(input).unwrap().is_hovered());

        let change = d.leave(&mut tree).unwrap();
        assert_eq!(change.cursor, CursorKind::Default);
    }

    #[test]
    fn test_press_focuses_input_and_pressing_elsewhere_clears() {
        let (mut tree, _, input) = tree_with_input();
        let mut d = Dispatcher::new();

        let press = d.press(&mut tree, Point::new(10.0, 90.0));
        assert!(matches!(press.activation, Activation::FocusInput { .. }));
        assert_eq!(d.focused(), Some(input));
        assert!(tree.widget(input).unwrap().as_input().unwrap().is_focused());

        let again = d.press(&mut tree, Point::new(30.0, 90.0));
        assert!(again.defocused.is_empty());

        let press = d.press(&mut tree, Point::new(10.0, 10.0));
        assert!(matches!(press.activation, Activation::Text { .. }));
        assert_eq!(press.defocused, vec![input]);
        assert_eq!(d.focused(), None);
        assert!(!tree.widget(input).unwrap().as_input().unwrap().is_focused());
    }

    #[test]
    fn test_press_outside_region_passes_through() {
        let (mut tree, _, _) = tree_with_input();
        let mut d = Dispatcher::new();
        let press = d.press(&mut tree, Point::new(500.0, 500.0));
        assert_eq!(press.activation, Activation::PassThrough);
        assert_eq!(press.hit, None);
    }

    #[test]
    fn test_push_focus_rejects_non_inputs() {
        let (mut tree, text, _) = tree_with_input();
        let mut d = Dispatcher::new();
        assert!(matches!(
            d.push_focus(&mut tree, text),
            Err(UiError::WrongKind { .. })
        ));
        assert_eq!(d.focused(), None);
    }
}
