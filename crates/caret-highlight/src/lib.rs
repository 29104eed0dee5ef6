#![warn(missing_docs)]
//! `caret-highlight` - Occurrence highlighting for `caret-core`.
//!
//! When the selection covers part of a single line, every other occurrence of the selected
//! text is marked: rectangles around the matches on visible lines, and short marks in the
//! scrollbar for matches anywhere in the document.
//!
//! Matching works on character columns and never crosses a line break. Each line contributes
//! at most [`MAX_MATCHES_PER_LINE`] matches so that a pathological line (say, a minified file
//! and a one-character needle) cannot stall a redraw.
//!
//! ```rust
//! use caret_core::Document;
//! use caret_highlight::{HighlightOptions, selection_needle};
//!
//! let mut doc = Document::from_text("scratch", "foo = foo + 1");
//! doc.select_set(0, 0, 0, 3);
//! assert_eq!(selection_needle(&doc, &HighlightOptions::default()).as_deref(), Some("foo"));
//! ```

mod plugin;

pub use plugin::{OccurrenceHighlighter, OccurrencePlugin, PLUGIN_NAME};

use caret_core::layout::visual_x_for_column;
use caret_core::{Document, Preferences};
use regex::{Regex, RegexBuilder};
use std::ops::Range;
use thiserror::Error;

/// Upper bound on matches reported for one line.
pub const MAX_MATCHES_PER_LINE: usize = 1000;

/// Smallest scrollbar mark height in pixels.
const MIN_MARK_HEIGHT: f64 = 2.0;

/// Highlighting errors.
#[derive(Debug, Error)]
pub enum HighlightError {
    /// The escaped needle did not compile (e.g. it exceeds the regex size limit).
    #[error("cannot build matcher: {0}")]
    Regex(#[from] regex::Error),
}

/// Matching options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightOptions {
    /// Match case.
    pub case_sensitive: bool,
    /// Minimum selection length in characters.
    pub min_len: usize,
    /// Matches kept per line.
    pub max_per_line: usize,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            min_len: 2,
            max_per_line: MAX_MATCHES_PER_LINE,
        }
    }
}

impl From<&Preferences> for HighlightOptions {
    fn from(prefs: &Preferences) -> Self {
        Self {
            case_sensitive: prefs.case_sensitive,
            min_len: prefs.min_str_len,
            max_per_line: MAX_MATCHES_PER_LINE,
        }
    }
}

/// One match, as a half-open character range on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// Line index.
    pub line: usize,
    /// Inclusive start column.
    pub start: usize,
    /// Exclusive end column.
    pub end: usize,
}

/// Where the text area and the scrollbar are, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGeometry {
    /// First visible line.
    pub top: usize,
    /// Sub-line scroll offset.
    pub offset_px: f64,
    /// Line height.
    pub line_height: f64,
    /// Text area height.
    pub height_px: f64,
    /// Width of one character cell.
    pub char_width: f64,
    /// Left edge of column 0.
    pub text_x: f64,
    /// Scrollbar track height.
    pub track_height: f64,
}

impl ViewGeometry {
    /// Lines intersecting the text area, clamped to `num_lines`.
    pub fn visible_lines(&self, num_lines: usize) -> Range<usize> {
        let line_height = self.line_height.max(1.0);
        let count = ((self.height_px + self.offset_px) / line_height).ceil().max(0.0) as usize;
        let start = self.top.min(num_lines);
        start..(self.top + count + 1).min(num_lines)
    }
}

/// A rectangle around a match, relative to the text area's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// A mark in the scrollbar for a line that has matches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarMark {
    /// Line the mark stands for.
    pub line: usize,
    /// Top edge within the track.
    pub y: f64,
    /// Height.
    pub height: f64,
}

/// Everything a host needs to draw one frame of occurrence highlights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlights {
    /// The text being matched.
    pub needle: String,
    /// Rectangles on visible lines.
    pub rects: Vec<HighlightRect>,
    /// Scrollbar marks, one per line with matches.
    pub marks: Vec<ScrollbarMark>,
    /// Matches found in the whole document (after the per-line cap).
    pub total: usize,
}

/// The text to highlight for the document's current selection, if any.
///
/// Whitespace-only selections never trigger, whatever their length. Anything else must be at
/// least `min_len` characters, including one-letter identifiers.
pub fn selection_needle(doc: &Document, options: &HighlightOptions) -> Option<String> {
    let cursor = doc.cursor();
    if !cursor.has_selection() || !cursor.is_single_line() {
        return None;
    }
    let text = doc.selected_text();
    if text.trim().is_empty() {
        return None;
    }
    if text.chars().count() < options.min_len.max(1) {
        return None;
    }
    Some(text)
}

/// Compiled needle.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    max_per_line: usize,
}

impl Matcher {
    /// Build a matcher for the literal `needle`.
    pub fn new(needle: &str, options: &HighlightOptions) -> Result<Self, HighlightError> {
        let regex = RegexBuilder::new(&regex::escape(needle))
            .case_insensitive(!options.case_sensitive)
            .build()?;
        Ok(Self {
            regex,
            max_per_line: options.max_per_line,
        })
    }

    /// Non-overlapping matches in `line` as character ranges, at most `max_per_line`.
    pub fn find_in_line(&self, line: &str) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        let mut last_byte = 0;
        let mut last_col = 0;
        for m in self.regex.find_iter(line).take(self.max_per_line) {
            let start = last_col + line[last_byte..m.start()].chars().count();
            let end = start + m.as_str().chars().count();
            out.push(start..end);
            last_byte = m.end();
            last_col = end;
        }
        out
    }

    /// Matches on `lines` of `doc`.
    pub fn occurrences(&self, doc: &Document, lines: Range<usize>) -> Vec<Occurrence> {
        let end = lines.end.min(doc.num_lines());
        (lines.start..end)
            .flat_map(|line| {
                self.find_in_line(&doc.line_text(line))
                    .into_iter()
                    .map(move |r| Occurrence {
                        line,
                        start: r.start,
                        end: r.end,
                    })
            })
            .collect()
    }
}

/// Highlights for `needle` in `doc` as seen through `geom`.
pub fn highlights_for(
    doc: &Document,
    needle: &str,
    options: &HighlightOptions,
    geom: &ViewGeometry,
) -> Result<Highlights, HighlightError> {
    let matcher = Matcher::new(needle, options)?;
    let num_lines = doc.num_lines();
    let tab_width = doc.tab_width();
    let visible = geom.visible_lines(num_lines);

    let mut rects = Vec::new();
    let mut marks = Vec::new();
    let mut total = 0;
    let mark_height = (geom.track_height / num_lines.max(1) as f64).max(MIN_MARK_HEIGHT);

    for line in 0..num_lines {
        let text = doc.line_text(line);
        let found = matcher.find_in_line(&text);
        if found.is_empty() {
            continue;
        }
        total += found.len();
        marks.push(ScrollbarMark {
            line,
            y: line as f64 / num_lines as f64 * geom.track_height,
            height: mark_height,
        });
        if !visible.contains(&line) {
            continue;
        }
        let y = (line - geom.top) as f64 * geom.line_height - geom.offset_px;
        for range in found {
            let x0 = visual_x_for_column(&text, range.start, tab_width) as f64;
            let x1 = visual_x_for_column(&text, range.end, tab_width) as f64;
            rects.push(HighlightRect {
                x: geom.text_x + x0 * geom.char_width,
                y,
                width: (x1 - x0) * geom.char_width,
                height: geom.line_height,
            });
        }
    }

    tracing::trace!(needle, total, rects = rects.len(), "occurrences highlighted");
    Ok(Highlights {
        needle: needle.to_string(),
        rects,
        marks,
        total,
    })
}

/// Highlights for the document's current selection, or `None` when the selection does not
/// trigger highlighting.
pub fn compute(
    doc: &Document,
    options: &HighlightOptions,
    geom: &ViewGeometry,
) -> Result<Option<Highlights>, HighlightError> {
    match selection_needle(doc, options) {
        Some(needle) => highlights_for(doc, &needle, options, geom).map(Some),
        None => Ok(None),
    }
}
