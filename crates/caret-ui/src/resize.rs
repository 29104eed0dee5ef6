//! Edge and corner resizing of a widget.
//!
//! A press on an [`EdgeResizer`](crate::WidgetKind::EdgeResizer) or
//! [`BoxResizer`](crate::WidgetKind::BoxResizer) starts a [`ResizeDrag`]. Each pointer move
//! recomputes the target's rect from the rect it had at press time, so the result never
//! drifts, and moves the resize handles along with it.

use crate::geometry::{Point, Rect};
use crate::widget::{Edge, UiError, WidgetId, WidgetKind, WidgetTree};

/// Thickness of a resize handle in pixels.
pub const HANDLE_THICKNESS: f64 = 6.0;

/// Which part of the target a drag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// One side.
    Edge(Edge),
    /// The bottom-right corner.
    Corner,
}

/// Bounds a resize may not cross.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeLimits {
    /// Smallest width.
    pub min_w: f64,
    /// Smallest height.
    pub min_h: f64,
    /// The region the target must stay inside.
    pub region: Rect,
}

impl ResizeLimits {
    /// Limits with the given minimum size inside `region`.
    pub fn new(min_w: f64, min_h: f64, region: Rect) -> Self {
        Self {
            min_w,
            min_h,
            region,
        }
    }
}

/// Never panics on an inverted range; the lower bound wins.
fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi.max(lo))
}

/// New bounds of `start` after the pointer moved by `(dx, dy)`.
pub fn resized(start: Rect, mode: ResizeMode, dx: f64, dy: f64, limits: &ResizeLimits) -> Rect {
    let region = limits.region;
    let mut rect = start;
    let right = |rect: &mut Rect| {
        rect.w = clamp(start.w + dx, limits.min_w, region.right() - start.x);
    };
    let bottom = |rect: &mut Rect| {
        rect.h = clamp(start.h + dy, limits.min_h, region.bottom() - start.y);
    };
    match mode {
        ResizeMode::Edge(Edge::Right) => right(&mut rect),
        ResizeMode::Edge(Edge::Bottom) => bottom(&mut rect),
        ResizeMode::Edge(Edge::Left) => {
            let x = clamp(start.x + dx, region.x, start.right() - limits.min_w);
            rect.x = x;
            rect.w = start.right() - x;
        }
        ResizeMode::Edge(Edge::Top) => {
            let y = clamp(start.y + dy, region.y, start.bottom() - limits.min_h);
            rect.y = y;
            rect.h = start.bottom() - y;
        }
        ResizeMode::Corner => {
            right(&mut rect);
            bottom(&mut rect);
        }
    }
    rect
}

/// Where the handle for `mode` sits on `target`.
pub fn handle_rect(target: Rect, mode: ResizeMode) -> Rect {
    let t = HANDLE_THICKNESS;
    match mode {
        ResizeMode::Edge(Edge::Left) => Rect::new(target.x - t / 2.0, target.y, t, target.h),
        ResizeMode::Edge(Edge::Right) => Rect::new(target.right() - t / 2.0, target.y, t, target.h),
        ResizeMode::Edge(Edge::Top) => Rect::new(target.x, target.y - t / 2.0, target.w, t),
        ResizeMode::Edge(Edge::Bottom) => {
            Rect::new(target.x, target.bottom() - t / 2.0, target.w, t)
        }
        ResizeMode::Corner => Rect::new(target.right() - t, target.bottom() - t, 2.0 * t, 2.0 * t),
    }
}

/// Move every resize handle of `target` onto its new bounds.
pub fn place_handles(tree: &mut WidgetTree, target: WidgetId) -> Result<(), UiError> {
    let rect = tree.widget(target)?.rect;
    for id in tree.descendants(tree.root()) {
        let Some(widget) = tree.get_mut(id) else {
            continue;
        };
        let mode = match widget.kind {
            WidgetKind::EdgeResizer { edge, target: t } if t == target => ResizeMode::Edge(edge),
            WidgetKind::BoxResizer { target: t } if t == target => ResizeMode::Corner,
            _ => continue,
        };
        widget.rect = handle_rect(rect, mode);
    }
    Ok(())
}

/// A resize in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDrag {
    target: WidgetId,
    mode: ResizeMode,
    origin: Point,
    start: Rect,
    limits: ResizeLimits,
}

impl ResizeDrag {
    /// Begin resizing `target` from the press at `at`.
    pub fn start(
        tree: &WidgetTree,
        target: WidgetId,
        mode: ResizeMode,
        at: Point,
        limits: ResizeLimits,
    ) -> Result<Self, UiError> {
        let start = tree.widget(target)?.rect;
        tracing::debug!(?target, ?mode, "resize started");
        Ok(Self {
            target,
            mode,
            origin: at,
            start,
            limits,
        })
    }

    /// Widget being resized.
    pub fn target(&self) -> WidgetId {
        self.target
    }

    /// Apply the pointer position `at`. Returns the target's new bounds.
    pub fn on_move(&self, tree: &mut WidgetTree, at: Point) -> Result<Rect, UiError> {
        let rect = resized(
            self.start,
            self.mode,
            at.x - self.origin.x,
            at.y - self.origin.y,
            &self.limits,
        );
        tree.widget_mut(self.target)?.rect = rect;
        place_handles(tree, self.target)?;
        Ok(rect)
    }

    /// End the drag, keeping the current bounds.
    pub fn finish(self, tree: &WidgetTree) -> Result<Rect, UiError> {
        let rect = tree.widget(self.target)?.rect;
        tracing::debug!(target = ?self.target, ?rect, "resize finished");
        Ok(rect)
    }

    /// End the drag, putting the original bounds back.
    pub fn cancel(self, tree: &mut WidgetTree) -> Result<(), UiError> {
        tree.widget_mut(self.target)?.rect = self.start;
        place_handles(tree, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Widget;

    fn limits() -> ResizeLimits {
        ResizeLimits::new(50.0, 30.0, Rect::new(0.0, 0.0, 400.0, 300.0))
    }

    #[test]
    fn test_right_edge_clamps_to_min_and_region() {
        let start = Rect::new(100.0, 100.0, 100.0, 100.0);
        let mode = ResizeMode::Edge(Edge::Right);
        assert_eq!(resized(start, mode, 20.0, 0.0, &limits()).w, 120.0);
        assert_eq!(resized(start, mode, -90.0, 0.0, &limits()).w, 50.0);
        assert_eq!(resized(start, mode, 500.0, 0.0, &limits()).w, 300.0);
    }

    #[test]
    fn test_left_and_top_edges_keep_far_side() {
        let start = Rect::new(100.0, 100.0, 100.0, 100.0);
        let left = resized(start, ResizeMode::Edge(Edge::Left), -150.0, 0.0, &limits());
        assert_eq!(left, Rect::new(0.0, 100.0, 200.0, 100.0));
        let left = resized(start, ResizeMode::Edge(Edge::Left), 80.0, 0.0, &limits());
        assert_eq!(left, Rect::new(150.0, 100.0, 50.0, 100.0));
        let top = resized(start, ResizeMode::Edge(Edge::Top), 0.0, 90.0, &limits());
        assert_eq!(top, Rect::new(100.0, 170.0, 100.0, 30.0));
    }

    #[test]
    fn test_inverted_range_does_not_panic() {
        let tiny = ResizeLimits::new(500.0, 500.0, Rect::new(0.0, 0.0, 100.0, 100.0));
        let rect = resized(Rect::new(0.0, 0.0, 50.0, 50.0), ResizeMode::Corner, 10.0, 10.0, &tiny);
        assert_eq!((rect.w, rect.h), (500.0, 500.0));
    }

    #[test]
    fn test_drag_moves_handles() {
        let mut tree = WidgetTree::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        let root = tree.root();
        let target = tree
            .insert(root, Widget::new(WidgetKind::Panel, Rect::new(100.0, 100.0, 100.0, 100.0)))
            .unwrap();
        let edge = Edge::Right;
        let handle_at = handle_rect(Rect::new(100.0, 100.0, 100.0, 100.0), ResizeMode::Edge(edge));
        let handle = tree
            .insert(root, Widget::new(WidgetKind::EdgeResizer { edge, target }, handle_at))
            .unwrap();

        let drag = ResizeDrag::start(&tree, target, ResizeMode::Edge(edge), Point::new(200.0, 150.0), limits())
            .unwrap();
        let rect = drag.on_move(&mut tree, Point::new(240.0, 170.0)).unwrap();
        assert_eq!(rect, Rect::new(100.0, 100.0, 140.0, 100.0));
        assert_eq!(tree.widget(handle).unwrap().rect.x, 237.0);

        drag.cancel(&mut tree).unwrap();
        assert_eq!(tree.widget(target).unwrap().rect.w, 100.0);
        assert_eq!(tree.widget(handle).unwrap().rect.x, 197.0);
    }
}
