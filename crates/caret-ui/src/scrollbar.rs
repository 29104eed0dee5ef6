//! Scrollbar gutter and thumb.
//!
//! The thumb's height is the visible share of the document and its offset the scroll
//! position's share of the scrollable range. Dragging maps the pointer back to a view ratio
//! (`(y - grab - track.y) / (track.h - thumb.h)`) and jumps the viewport there.

use crate::geometry::{Point, Rect};
use crate::widget::{UiError, WidgetId, WidgetKind, WidgetTree};
use caret_core::{ScrollScheduler, ViewportId};
use std::time::Instant;

/// Thumbs never get shorter than this.
pub const MIN_THUMB_HEIGHT: f64 = 16.0;

/// Bounds of the thumb inside `track`.
///
/// `position` and `max_top` are in lines; `visible` is the number of lines the view shows.
pub fn thumb_rect(track: Rect, position: f64, max_top: f64, visible: f64) -> Rect {
    let total = max_top + visible;
    let share = if total > 0.0 { (visible / total).min(1.0) } else { 1.0 };
    let height = (track.h * share).max(MIN_THUMB_HEIGHT).min(track.h);
    let ratio = if max_top > 0.0 {
        (position / max_top).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Rect::new(track.x, track.y + (track.h - height) * ratio, track.w, height)
}

/// Fit the thumb of `scrollbar` to its viewport's current position.
pub fn sync_thumb(
    tree: &mut WidgetTree,
    scrollbar: WidgetId,
    scroll: &ScrollScheduler,
) -> Result<(), UiError> {
    let bar = tree.widget(scrollbar)?;
    let WidgetKind::Scrollbar { viewport, thumb } = bar.kind else {
        return Err(UiError::WrongKind {
            widget: scrollbar,
            expected: "scrollbar",
        });
    };
    let track = bar.rect;
    let Some(thumb) = thumb else {
        return Ok(());
    };
    let rect = thumb_rect(
        track,
        scroll.position(viewport),
        scroll.max_top(viewport),
        scroll.visible_lines(viewport),
    );
    tree.widget_mut(thumb)?.rect = rect;
    Ok(())
}

/// Scroll one page towards `direction` (negative: up). Returns the lines scheduled.
pub fn page_jump(
    scroll: &mut ScrollScheduler,
    viewport: ViewportId,
    direction: i32,
    now: Instant,
) -> f64 {
    let page = (scroll.visible_lines(viewport) - 1.0).max(1.0).floor();
    let lines = page * f64::from(direction.signum());
    scroll.scroll(viewport, lines, None, now);
    lines
}

/// A thumb drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbDrag {
    viewport: ViewportId,
    grab_offset: f64,
    track: Rect,
    thumb_height: f64,
}

impl ThumbDrag {
    /// Begin dragging `thumb` from the press at `at`.
    pub fn start(tree: &WidgetTree, thumb: WidgetId, at: Point) -> Result<Self, UiError> {
        let widget = tree.widget(thumb)?;
        let WidgetKind::Thumb { viewport } = widget.kind else {
            return Err(UiError::WrongKind {
                widget: thumb,
                expected: "thumb",
            });
        };
        let track = match widget.parent() {
            Some(parent) => tree.widget(parent)?.rect,
            None => widget.rect,
        };
        Ok(Self {
            viewport,
            grab_offset: at.y - widget.rect.y,
            track,
            thumb_height: widget.rect.h,
        })
    }

    /// Viewport being scrolled.
    pub fn viewport(&self) -> ViewportId {
        self.viewport
    }

    /// View ratio for the pointer at vertical position `y`.
    pub fn ratio_at(&self, y: f64) -> f64 {
        let free = self.track.h - self.thumb_height;
        if free <= 0.0 {
            return 0.0;
        }
        ((y - self.grab_offset - self.track.y) / free).clamp(0.0, 1.0)
    }

    /// Apply the pointer position `at`. Returns the ratio jumped to.
    pub fn on_move(&self, scroll: &mut ScrollScheduler, at: Point) -> f64 {
        let ratio = self.ratio_at(at.y);
        scroll.set_view_ratio(self.viewport, ratio);
        ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumb_rect_tracks_position() {
        let track = Rect::new(0.0, 0.0, 10.0, 200.0);
        let top = thumb_rect(track, 0.0, 75.0, 25.0);
        assert_eq!(top, Rect::new(0.0, 0.0, 10.0, 50.0));
        let bottom = thumb_rect(track, 75.0, 75.0, 25.0);
        assert_eq!(bottom.y, 150.0);
        let short = thumb_rect(track, 0.0, 0.0, 25.0);
        assert_eq!(short.h, 200.0);
        let huge = thumb_rect(track, 0.0, 100_000.0, 25.0);
        assert_eq!(huge.h, MIN_THUMB_HEIGHT);
    }

    #[test]
    fn test_ratio_at_accounts_for_grab_offset() {
        let drag = ThumbDrag {
            viewport: ScrollScheduler::new().add_viewport(100.0, 10.0, 40),
            grab_offset: 10.0,
            track: Rect::new(0.0, 0.0, 10.0, 200.0),
            thumb_height: 50.0,
        };
        assert_eq!(drag.ratio_at(10.0), 0.0);
        assert_eq!(drag.ratio_at(85.0), 0.5);
        assert_eq!(drag.ratio_at(500.0), 1.0);
    }
}
