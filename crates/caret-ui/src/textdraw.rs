//! Scrollable text drawn through a cached off-screen surface.
//!
//! [`TextDraw`] keeps a fractional `top` line and re-records its surface only when the
//! [`CacheKey`] changes: the sub-line pixel offset, the content, the line height or the size.
//! Scrolling by whole lines while the content is unchanged still changes the key, since the
//! offset is measured from line zero.

use crate::geometry::{Point, Rect};
use crate::render::{DrawList, Painter, RectStyle, SurfaceId, TextStyle};
use caret_core::Rgba;

/// What the cached surface was recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// `top * line_height`, rounded to whole pixels.
    pub line_offset_px: i64,
    /// Bumped on every content change.
    pub content_id: u64,
    /// Line height bits.
    pub line_height: u64,
    /// Surface width and height in whole pixels.
    pub size: (u32, u32),
}

/// Scrollable lines of text.
#[derive(Debug, Clone)]
pub struct TextDraw {
    lines: Vec<String>,
    content_id: u64,
    top: f64,
    line_height: f64,
    padding: f64,
    style: TextStyle,
    surface: SurfaceId,
    cache: DrawList,
    key: Option<CacheKey>,
    redraws: usize,
}

impl TextDraw {
    /// Empty text drawn into `surface`.
    pub fn new(surface: SurfaceId, line_height: f64) -> Self {
        Self {
            lines: Vec::new(),
            content_id: 0,
            top: 0.0,
            line_height: line_height.max(1.0),
            padding: 4.0,
            style: TextStyle::default(),
            surface,
            cache: DrawList::new(),
            key: None,
            redraws: 0,
        }
    }

    /// Replace the content.
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.content_id += 1;
    }

    /// The content.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// First visible line (fractional).
    pub fn top(&self) -> f64 {
        self.top
    }

    /// Line height in pixels.
    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    /// Change the line height (zoom).
    pub fn set_line_height(&mut self, line_height: f64) {
        self.line_height = line_height.max(1.0);
    }

    /// Text style.
    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
        self.key = None;
    }

    /// Largest `top` for a view `height` pixels tall.
    pub fn max_top(&self, height: f64) -> f64 {
        (self.lines.len() as f64 - height / self.line_height).max(0.0)
    }

    /// Set `top`, clamped to `[0, max_top]`.
    pub fn set_top(&mut self, top: f64, height: f64) {
        self.top = top.clamp(0.0, self.max_top(height));
    }

    /// Scroll by `lines`.
    pub fn scroll_by(&mut self, lines: f64, height: f64) {
        self.set_top(self.top + lines, height);
    }

    /// Fraction of the scrollable range that `n` lines represent.
    pub fn lines_to_view(&self, n: f64, height: f64) -> f64 {
        let range = self.lines.len() as f64 * self.line_height - height;
        if range <= 0.0 {
            return 0.0;
        }
        n * self.line_height / range
    }

    /// Scroll to `ratio` of the scrollable range.
    pub fn set_view(&mut self, ratio: f64, height: f64) {
        self.top = ratio.clamp(0.0, 1.0) * self.max_top(height);
    }

    /// Line under the vertical position `y`.
    pub fn line_at(&self, rect: Rect, y: f64) -> Option<usize> {
        if y < rect.y || y >= rect.bottom() {
            return None;
        }
        let line = (self.top + (y - rect.y) / self.line_height).floor();
        (line >= 0.0 && (line as usize) < self.lines.len()).then_some(line as usize)
    }

    /// Bounds of line `i` in `rect`'s coordinates.
    pub fn row_rect(&self, rect: Rect, i: usize) -> Rect {
        let y = rect.y + (i as f64 - self.top) * self.line_height;
        Rect::new(rect.x, y, rect.w, self.line_height)
    }

    /// Cache key for drawing into `rect`.
    pub fn cache_key(&self, rect: Rect) -> CacheKey {
        CacheKey {
            line_offset_px: (self.top * self.line_height).round() as i64,
            content_id: self.content_id,
            line_height: self.line_height.to_bits(),
            size: (rect.w.max(0.0).round() as u32, rect.h.max(0.0).round() as u32),
        }
    }

    /// How many times the surface was re-recorded.
    pub fn redraws(&self) -> usize {
        self.redraws
    }

    /// The recorded surface content, in surface coordinates.
    pub fn surface_contents(&self) -> &DrawList {
        &self.cache
    }

    /// Draw into `rect`, re-recording the surface only when its key changed.
    ///
    /// Returns `true` if the surface was re-recorded.
    pub fn draw(&mut self, rect: Rect, painter: &mut dyn Painter) -> bool {
        let key = self.cache_key(rect);
        let stale = self.key != Some(key);
        if stale {
            self.record(rect);
            self.key = Some(key);
            self.redraws += 1;
        }
        painter.textured_rect(rect, self.surface);
        stale
    }

    fn record(&mut self, rect: Rect) {
        self.cache.clear();
        let first = self.top.floor().max(0.0) as usize;
        let visible = (rect.h / self.line_height).ceil() as usize + 1;
        let baseline = self.line_height * 0.8;
        for (i, line) in self.lines.iter().enumerate().skip(first).take(visible) {
            let y = (i as f64 - self.top) * self.line_height + baseline;
            self.cache.text(Point::new(self.padding, y), &self.style, line);
        }
    }
}

/// A list of rows with a hover overlay and a selection overlay.
#[derive(Debug, Clone)]
pub struct ListView {
    text: TextDraw,
    hover: Option<usize>,
    selected: Option<usize>,
    hover_style: RectStyle,
    selection_style: RectStyle,
}

impl ListView {
    /// An empty list drawn into `surface`.
    pub fn new(surface: SurfaceId, line_height: f64) -> Self {
        Self {
            text: TextDraw::new(surface, line_height),
            hover: None,
            selected: None,
            hover_style: RectStyle::filled(Rgba::new(1.0, 1.0, 1.0, 0.08)).rounded(3.0),
            selection_style: RectStyle::filled(Rgba::new(0.3, 0.5, 0.9, 0.35)).rounded(3.0),
        }
    }

    /// Replace the rows. Hover and selection are dropped when they fall off the end.
    pub fn set_items(&mut self, items: Vec<String>) {
        self.text.set_lines(items);
        let len = self.text.num_lines();
        self.hover = self.hover.filter(|i| *i < len);
        self.selected = self.selected.filter(|i| *i < len);
    }

    /// The rows.
    pub fn items(&self) -> &[String] {
        self.text.lines()
    }

    /// Scroll state.
    pub fn text(&self) -> &TextDraw {
        &self.text
    }

    /// Scroll state, mutably.
    pub fn text_mut(&mut self) -> &mut TextDraw {
        &mut self.text
    }

    /// Row under the pointer.
    pub fn hover(&self) -> Option<usize> {
        self.hover
    }

    /// Set the hovered row.
    pub fn set_hover(&mut self, row: Option<usize>) {
        self.hover = row;
    }

    /// Track the pointer at `at` inside `rect`.
    pub fn hover_at(&mut self, rect: Rect, at: Point) {
        self.hover = self.text.line_at(rect, at.y);
    }

    /// Selected row.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select `row` (ignored past the end).
    pub fn select(&mut self, row: Option<usize>) {
        self.selected = row.filter(|i| *i < self.text.num_lines());
    }

    /// Selected row's text.
    pub fn selected_item(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.text.lines().get(i))
            .map(String::as_str)
    }

    /// Overlay styles.
    pub fn set_overlay_styles(&mut self, hover: RectStyle, selection: RectStyle) {
        self.hover_style = hover;
        self.selection_style = selection;
    }

    /// Draw rows, then the hover and selection overlays on top.
    pub fn draw(&mut self, rect: Rect, painter: &mut dyn Painter) {
        self.text.draw(rect, painter);
        if let Some(row) = self.hover
            && self.selected != Some(row)
            && let Some(r) = self.text.row_rect(rect, row).intersect(&rect)
        {
            painter.rect(r, &self.hover_style);
        }
        if let Some(row) = self.selected
            && let Some(r) = self.text.row_rect(rect, row).intersect(&rect)
        {
            painter.rect(r, &self.selection_style);
        }
    }
}

/// Read-only multi-line text.
#[derive(Debug, Clone)]
pub struct TextView {
    text: TextDraw,
}

impl TextView {
    /// An empty view drawn into `surface`.
    pub fn new(surface: SurfaceId, line_height: f64) -> Self {
        Self {
            text: TextDraw::new(surface, line_height),
        }
    }

    /// Replace the text; lines split on `'\n'`.
    pub fn set_text(&mut self, text: &str) {
        self.text
            .set_lines(caret_core::text::split_lines(text).into_iter().map(String::from).collect());
    }

    /// Scroll state.
    pub fn text(&self) -> &TextDraw {
        &self.text
    }

    /// Scroll state, mutably.
    pub fn text_mut(&mut self) -> &mut TextDraw {
        &mut self.text
    }

    /// Draw into `rect`.
    pub fn draw(&mut self, rect: Rect, painter: &mut dyn Painter) {
        self.text.draw(rect, painter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("row {i}")).collect()
    }

    #[test]
    fn test_surface_is_recorded_only_on_key_change() {
        let mut text = TextDraw::new(SurfaceId(1), 20.0);
        text.set_lines(numbered(10));
        let rect = Rect::new(0.0, 0.0, 100.0, 60.0);
        let mut out = DrawList::new();

        assert!(text.draw(rect, &mut out));
        assert!(!text.draw(rect, &mut out));
        assert_eq!(text.redraws(), 1);
        assert_eq!(out.len(), 2);

        text.scroll_by(0.5, rect.h);
        assert!(text.draw(rect, &mut out));
        text.set_lines(numbered(10));
        assert!(text.draw(rect, &mut out));
        assert!(text.draw(Rect::new(0.0, 0.0, 100.0, 80.0), &mut out));
        assert_eq!(text.redraws(), 4);
    }

    #[test]
    fn test_recorded_rows_follow_top() {
        let mut text = TextDraw::new(SurfaceId(1), 20.0);
        text.set_lines(numbered(10));
        text.set_top(2.0, 40.0);
        text.draw(Rect::new(0.0, 0.0, 100.0, 40.0), &mut DrawList::new());
        let rows: Vec<&str> = text.surface_contents().texts().collect();
        assert_eq!(rows, vec!["row 2", "row 3", "row 4"]);
    }

    #[test]
    fn test_view_ratio_round_trip() {
        let mut text = TextDraw::new(SurfaceId(1), 10.0);
        text.set_lines(numbered(30));
        // 30 lines of 10px in a 100px view: 200px of scroll range.
        assert_eq!(text.lines_to_view(5.0, 100.0), 0.25);
        text.set_view(0.5, 100.0);
        assert_eq!(text.top(), 10.0);
        text.set_view(2.0, 100.0);
        assert_eq!(text.top(), 20.0);
    }

    #[test]
    fn test_list_hover_and_selection() {
        let mut list = ListView::new(SurfaceId(2), 20.0);
        list.set_items(numbered(3));
        let rect = Rect::new(0.0, 100.0, 80.0, 100.0);

        list.hover_at(rect, Point::new(5.0, 125.0));
        assert_eq!(list.hover(), Some(1));
        list.hover_at(rect, Point::new(5.0, 175.0));
        assert_eq!(list.hover(), None);

        list.select(Some(2));
        assert_eq!(list.selected_item(), Some("row 2"));
        list.select(Some(7));
        assert_eq!(list.selected(), None);

        list.set_hover(Some(0));
        list.select(Some(1));
        let mut out = DrawList::new();
        list.draw(rect, &mut out);
        // Surface plus two overlays.
        assert_eq!(out.len(), 3);
    }
}
