//! Smooth-scroll scheduler.
//!
//! Scrolling is cooperative and single-threaded: the host calls [`ScrollScheduler::tick`] from
//! its redraw callback and keeps a redraw timer alive while [`ScrollScheduler::is_animating`]
//! returns `true`. Each viewport may have several jobs at once; every job contributes an eased
//! share of its line count and the shares are summed into the viewport position.
//!
//! A viewport position is `top` (integer line) plus `offset_px` (sub-line pixel offset). Both
//! are derived from one float each tick, so a frame never shows the integer part applied
//! without its fractional part.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Lines of margin kept between a line and the viewport edge by [`ScrollScheduler::ensure_visible`].
pub const DEFAULT_VISIBLE_THRESHOLD: usize = 2;

/// Smoothstep easing, `3t² − 2t³`, with `t` clamped to `[0, 1]`.
pub fn ease(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Animation progress between 0.0 and 1.0.
pub fn progress(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

/// Animation duration derived from scroll distance in lines.
pub fn duration_for_distance(lines: f64) -> Duration {
    let distance = lines.abs();
    if distance <= 3.0 {
        Duration::from_millis(150)
    } else if distance <= 20.0 {
        Duration::from_millis(250)
    } else {
        Duration::from_millis(350)
    }
}

/// Identifies one scrolled viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewportId(u32);

impl ViewportId {
    /// Raw id value.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Which end of the document the last tick ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClampState {
    /// Not clamped.
    #[default]
    None,
    /// Stopped at the first line while scrolling up.
    Top,
    /// Stopped at the last scroll position while scrolling down.
    Bottom,
}

/// How [`ScrollScheduler::ensure_visible`] positions the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnsureMode {
    /// Scroll the minimum distance that brings the line inside the safe area.
    #[default]
    Lazy,
    /// Scroll so the line sits in the middle of the view.
    Center,
}

#[derive(Debug, Clone)]
struct ScrollJob {
    start: Instant,
    duration: Duration,
    lines: f64,
    applied: f64,
    finished: bool,
}

impl ScrollJob {
    fn remaining(&self) -> f64 {
        self.lines - self.applied
    }
}

#[derive(Debug, Clone)]
struct Viewport {
    top: usize,
    offset_px: f64,
    line_height: f64,
    height_px: f64,
    num_lines: usize,
    clamp: ClampState,
    jobs: Vec<ScrollJob>,
}

impl Viewport {
    fn position(&self) -> f64 {
        self.top as f64 + self.offset_px / self.line_height
    }

    fn visible_lines(&self) -> f64 {
        self.height_px / self.line_height
    }

    fn max_top(&self) -> f64 {
        (self.num_lines as f64 - self.visible_lines()).max(0.0)
    }

    fn set_position(&mut self, pos: f64) {
        let pos = pos.clamp(0.0, self.max_top());
        let top = pos.floor();
        self.top = top as usize;
        self.offset_px = (pos - top) * self.line_height;
    }

    fn pending_lines(&self) -> f64 {
        self.jobs.iter().map(ScrollJob::remaining).sum()
    }
}

/// Owns the scroll state of every viewport. See the module docs.
#[derive(Debug, Default)]
pub struct ScrollScheduler {
    viewports: BTreeMap<ViewportId, Viewport>,
    next_id: u32,
}

impl ScrollScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a viewport of `height_px` pixels showing a document of `num_lines` lines.
    pub fn add_viewport(&mut self, height_px: f64, line_height: f64, num_lines: usize) -> ViewportId {
        let id = ViewportId(self.next_id);
        self.next_id += 1;
        self.viewports.insert(
            id,
            Viewport {
                top: 0,
                offset_px: 0.0,
                line_height: line_height.max(1.0),
                height_px: height_px.max(0.0),
                num_lines,
                clamp: ClampState::None,
                jobs: Vec::new(),
            },
        );
        id
    }

    /// Forget a viewport and its jobs.
    pub fn remove_viewport(&mut self, id: ViewportId) {
        self.viewports.remove(&id);
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: ViewportId) -> bool {
        self.viewports.contains_key(&id)
    }

    /// Update view height and line height (e.g. after a resize or zoom).
    pub fn set_metrics(&mut self, id: ViewportId, height_px: f64, line_height: f64) {
        if let Some(vp) = self.viewports.get_mut(&id) {
            let pos = vp.position();
            vp.height_px = height_px.max(0.0);
            vp.line_height = line_height.max(1.0);
            vp.set_position(pos);
        }
    }

    /// Update the document line count.
    pub fn set_num_lines(&mut self, id: ViewportId, num_lines: usize) {
        if let Some(vp) = self.viewports.get_mut(&id) {
            let pos = vp.position();
            vp.num_lines = num_lines;
            vp.set_position(pos);
        }
    }

    /// First visible line.
    pub fn top(&self, id: ViewportId) -> usize {
        self.viewports.get(&id).map_or(0, |vp| vp.top)
    }

    /// Sub-line pixel offset, rounded for drawing.
    pub fn offset_px(&self, id: ViewportId) -> i32 {
        self.viewports
            .get(&id)
            .map_or(0, |vp| vp.offset_px.round() as i32)
    }

    /// Fractional position in lines (`top + offset_px / line_height`).
    pub fn position(&self, id: ViewportId) -> f64 {
        self.viewports.get(&id).map_or(0.0, Viewport::position)
    }

    /// Largest allowed position in lines.
    pub fn max_top(&self, id: ViewportId) -> f64 {
        self.viewports.get(&id).map_or(0.0, Viewport::max_top)
    }

    /// Number of lines that fit in the view (fractional).
    pub fn visible_lines(&self, id: ViewportId) -> f64 {
        self.viewports.get(&id).map_or(0.0, Viewport::visible_lines)
    }

    /// Clamp state after the last tick.
    pub fn clamp_state(&self, id: ViewportId) -> ClampState {
        self.viewports.get(&id).map_or(ClampState::None, |vp| vp.clamp)
    }

    /// Number of active jobs on a viewport.
    pub fn job_count(&self, id: ViewportId) -> usize {
        self.viewports.get(&id).map_or(0, |vp| vp.jobs.len())
    }

    /// Returns `true` while any viewport has jobs; the host keeps its redraw timer alive.
    pub fn is_animating(&self) -> bool {
        self.viewports.values().any(|vp| !vp.jobs.is_empty())
    }

    /// Queue an eased scroll of `lines` (may be fractional or negative).
    ///
    /// Without an explicit duration one is derived from the distance.
    pub fn scroll(&mut self, id: ViewportId, lines: f64, duration: Option<Duration>, now: Instant) {
        if lines == 0.0 || !lines.is_finite() {
            return;
        }
        let Some(vp) = self.viewports.get_mut(&id) else {
            return;
        };
        vp.jobs.push(ScrollJob {
            start: now,
            duration: duration.unwrap_or_else(|| duration_for_distance(lines)),
            lines,
            applied: 0.0,
            finished: false,
        });
    }

    /// Move by `lines` immediately, as during a continuous middle-mouse drag. Eased jobs are
    /// discarded.
    pub fn scroll_continuous(&mut self, id: ViewportId, lines: f64) {
        if let Some(vp) = self.viewports.get_mut(&id) {
            vp.jobs.clear();
            let pos = vp.position() + lines;
            vp.set_position(pos);
        }
    }

    /// Set the top line directly, discarding eased jobs.
    pub fn jump(&mut self, id: ViewportId, top: usize) {
        if let Some(vp) = self.viewports.get_mut(&id) {
            vp.jobs.clear();
            vp.clamp = ClampState::None;
            vp.set_position(top as f64);
        }
    }

    /// Jump to `ratio` (0..=1) of the scrollable range.
    pub fn set_view_ratio(&mut self, id: ViewportId, ratio: f64) {
        if let Some(vp) = self.viewports.get_mut(&id) {
            vp.jobs.clear();
            let pos = ratio.clamp(0.0, 1.0) * vp.max_top();
            vp.set_position(pos);
        }
    }

    /// Advance every viewport to `now`. Returns `true` while any jobs remain.
    pub fn tick(&mut self, now: Instant) -> bool {
        for (id, vp) in self.viewports.iter_mut() {
            if vp.jobs.is_empty() {
                continue;
            }
            let mut delta = 0.0;
            for job in vp.jobs.iter_mut() {
                let t = progress(now.saturating_duration_since(job.start), job.duration);
                let target = job.lines * ease(t);
                delta += target - job.applied;
                job.applied = target;
                if t >= 1.0 {
                    job.finished = true;
                }
            }

            let max_top = vp.max_top();
            let dest = vp.position() + delta;
            vp.clamp = if dest < 0.0 {
                ClampState::Top
            } else if dest > max_top {
                ClampState::Bottom
            } else {
                ClampState::None
            };
            vp.set_position(dest);

            // Jobs still pushing into the wall are done.
            match vp.clamp {
                ClampState::Top => vp.jobs.iter_mut().filter(|j| j.lines < 0.0).for_each(|j| j.finished = true),
                ClampState::Bottom => vp.jobs.iter_mut().filter(|j| j.lines > 0.0).for_each(|j| j.finished = true),
                ClampState::None => {}
            }

            let before = vp.jobs.len();
            vp.jobs.retain(|j| !j.finished);
            if before != vp.jobs.len() {
                tracing::trace!(viewport = id.0, retired = before - vp.jobs.len(), clamp = ?vp.clamp, "scroll jobs retired");
            }
            if vp.jobs.is_empty() {
                snap_to_line(vp);
            }
        }
        self.is_animating()
    }

    /// Queue the scroll needed to bring `line` into view.
    ///
    /// The view is judged at its destination, counting the unapplied part of running jobs.
    /// Returns the number of lines scheduled, or `None` if the line is already visible.
    pub fn ensure_visible(
        &mut self,
        id: ViewportId,
        line: usize,
        mode: EnsureMode,
        threshold: usize,
        now: Instant,
    ) -> Option<f64> {
        let vp = self.viewports.get(&id)?;
        let projected = (vp.position() + vp.pending_lines()).clamp(0.0, vp.max_top());
        let visible = vp.visible_lines();
        let line_f = line as f64;
        let margin = (threshold as f64).min(((visible - 1.0) / 2.0).floor().max(0.0));

        let above = line_f < projected + margin;
        let below = line_f + 1.0 > projected + visible - margin;
        if !above && !below {
            return None;
        }
        let target = match mode {
            EnsureMode::Lazy if above => line_f - margin,
            EnsureMode::Lazy => line_f + 1.0 + margin - visible,
            EnsureMode::Center => line_f + 0.5 - visible / 2.0,
        };
        let delta = target.clamp(0.0, vp.max_top()) - projected;
        if delta.abs() < 1e-6 {
            return None;
        }
        self.scroll(id, delta, None, now);
        Some(delta)
    }

    /// Drop every viewport.
    pub fn clear(&mut self) {
        self.viewports.clear();
    }
}

/// Snap a viewport that just stopped moving onto a whole line.
fn snap_to_line(vp: &mut Viewport) {
    if vp.offset_px == 0.0 || vp.clamp == ClampState::Bottom {
        return;
    }
    let snapped = if vp.offset_px >= vp.line_height / 2.0 {
        vp.top as f64 + 1.0
    } else {
        vp.top as f64
    };
    vp.set_position(snapped);
}
