//! Streaming bracket / string / comment scanner.
//!
//! [`BracketScanner`] makes one pass over the text, line by line, and yields a [`Region`] every
//! time a bracket pair closes, a string literal ends or a line comment starts. Regions come out
//! in closing order, so for nested brackets the innermost pair is yielded first.
//!
//! The scanner never fails: malformed input simply produces fewer regions. In *lenient* mode an
//! unterminated single-quoted string is treated as ending at end of line, which keeps the
//! results useful while the user is still typing; *strict* mode drops the rest of that line.

use crate::cursor::Position;
use std::collections::VecDeque;
use std::iter::FusedIterator;

/// Kind of a scanned region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// A matched `()`, `[]` or `{}` pair.
    Parens,
    /// A `'...'` or `"..."` literal on one line.
    SingleString,
    /// A `'''...'''` or `"""..."""` literal, possibly spanning lines.
    TripleString,
    /// A `#` line comment.
    Comment,
}

impl RegionKind {
    /// Returns `true` for string and comment regions, whose contents the scanner skips.
    pub fn is_opaque(self) -> bool {
        !matches!(self, Self::Parens)
    }

    /// Returns `true` for both string kinds.
    pub fn is_string(self) -> bool {
        matches!(self, Self::SingleString | Self::TripleString)
    }
}

/// A typed span produced by the scanner.
///
/// `start` is the position of the opening delimiter. `end` is exclusive for parens (it points
/// at the closing bracket), just past the closing quote for strings, and just past the newline
/// for comments (end of text on the last line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Region kind.
    pub kind: RegionKind,
    /// Opening delimiter position.
    pub start: Position,
    /// End position, see the type docs.
    pub end: Position,
    /// Contents without delimiters, half-open.
    pub inner: (Position, Position),
    /// Contents with delimiters, half-open, never including a trailing newline.
    pub outer: (Position, Position),
    /// `false` when the region was cut short at end of line or end of text.
    pub closed: bool,
}

impl Region {
    /// Returns `true` if `pos` lies strictly after the opening delimiter and at or before the
    /// end of the contents.
    pub fn inner_contains(&self, pos: Position) -> bool {
        self.inner.0 <= pos && pos <= self.inner.1
    }

    /// Returns `true` if the half-open range `start..end` lies inside the region contents.
    pub fn inner_contains_range(&self, start: Position, end: Position) -> bool {
        self.inner.0 <= start && end <= self.inner.1
    }
}

#[derive(Debug, Clone, Copy)]
struct TripleOpen {
    start: Position,
    quote: char,
}

/// Lazy, single-pass, non-restartable scanner. See the module docs.
#[derive(Debug)]
pub struct BracketScanner {
    lines: Vec<Vec<char>>,
    strict: bool,
    line: usize,
    stack: Vec<(char, Position)>,
    triple: Option<TripleOpen>,
    pending: VecDeque<Region>,
    finished: bool,
}

/// Scan `text`. Shorthand for [`BracketScanner::new`].
pub fn scan(text: &str, strict: bool) -> BracketScanner {
    BracketScanner::new(text, strict)
}

impl BracketScanner {
    /// Create a scanner over `text` (lines split on `'\n'`).
    pub fn new(text: &str, strict: bool) -> Self {
        Self {
            lines: text.split('\n').map(|l| l.chars().collect()).collect(),
            strict,
            line: 0,
            stack: Vec::new(),
            triple: None,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn line_end(&self, line: usize) -> Position {
        Position::new(line, self.lines.get(line).map_or(0, Vec::len))
    }

    fn comment_end(&self, line: usize) -> Position {
        if line + 1 < self.lines.len() {
            Position::new(line + 1, 0)
        } else {
            self.line_end(line)
        }
    }

    /// Scan one line into `pending`.
    fn scan_line(&mut self) {
        let line = self.line;
        let chars = std::mem::take(&mut self.lines[line]);
        let mut col = 0usize;

        while col < chars.len() {
            if let Some(open) = self.triple {
                match find_triple(&chars, col, open.quote) {
                    Some(k) => {
                        let end = Position::new(line, k + 3);
                        let inner_start = Position::new(open.start.line, open.start.column + 3);
                        self.pending.push_back(Region {
                            kind: RegionKind::TripleString,
                            start: open.start,
                            end,
                            inner: (inner_start, Position::new(line, k)),
                            outer: (open.start, end),
                            closed: true,
                        });
                        self.triple = None;
                        col = k + 3;
                        continue;
                    }
                    None => break,
                }
            }

            let ch = chars[col];
            let here = Position::new(line, col);
            match ch {
                '(' | '[' | '{' => self.stack.push((ch, here)),
                ')' | ']' | '}' => {
                    if let Some(&(open, start)) = self.stack.last()
                        && matching_closer(open) == ch
                    {
                        self.stack.pop();
                        self.pending.push_back(Region {
                            kind: RegionKind::Parens,
                            start,
                            end: here,
                            inner: (Position::new(start.line, start.column + 1), here),
                            outer: (start, Position::new(line, col + 1)),
                            closed: true,
                        });
                    }
                }
                '"' | '\'' => {
                    let is_triple = chars.get(col + 1) == Some(&ch) && chars.get(col + 2) == Some(&ch);
                    if is_triple {
                        self.triple = Some(TripleOpen {
                            start: here,
                            quote: ch,
                        });
                        col += 3;
                        continue;
                    }
                    match find_single(&chars, col + 1, ch) {
                        Some(k) => {
                            let end = Position::new(line, k + 1);
                            self.pending.push_back(Region {
                                kind: RegionKind::SingleString,
                                start: here,
                                end,
                                inner: (Position::new(line, col + 1), Position::new(line, k)),
                                outer: (here, end),
                                closed: true,
                            });
                            col = k + 1;
                            continue;
                        }
                        None => {
                            if !self.strict {
                                let end = Position::new(line, chars.len());
                                self.pending.push_back(Region {
                                    kind: RegionKind::SingleString,
                                    start: here,
                                    end,
                                    inner: (Position::new(line, col + 1), end),
                                    outer: (here, end),
                                    closed: false,
                                });
                            }
                            break;
                        }
                    }
                }
                '#' => {
                    let eol = Position::new(line, chars.len());
                    self.pending.push_back(Region {
                        kind: RegionKind::Comment,
                        start: here,
                        end: self.comment_end(line),
                        inner: (Position::new(line, col + 1), eol),
                        outer: (here, eol),
                        closed: true,
                    });
                    break;
                }
                _ => {}
            }
            col += 1;
        }

        self.lines[line] = chars;
        self.line += 1;
        if self.line >= self.lines.len() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Some(open) = self.triple.take()
            && !self.strict
        {
            let end = self.line_end(self.lines.len() - 1);
            self.pending.push_back(Region {
                kind: RegionKind::TripleString,
                start: open.start,
                end,
                inner: (Position::new(open.start.line, open.start.column + 3), end),
                outer: (open.start, end),
                closed: false,
            });
        }
        self.stack.clear();
    }
}

impl Iterator for BracketScanner {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        loop {
            if let Some(region) = self.pending.pop_front() {
                return Some(region);
            }
            if self.finished {
                return None;
            }
            self.scan_line();
        }
    }
}

impl FusedIterator for BracketScanner {}

fn matching_closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Column of the next unescaped `quote` at or after `from`.
fn find_single(chars: &[char], from: usize, quote: char) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Column of the next unescaped triple `quote` at or after `from`.
fn find_triple(chars: &[char], from: usize, quote: char) -> Option<usize> {
    let mut i = from;
    while i + 3 <= chars.len() {
        if chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == quote && chars[i + 1] == quote && chars[i + 2] == quote {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Re-scan the contents of `region` with everything else masked out.
///
/// Finds brackets and nested strings inside a string or comment, which the plain pass skips.
pub fn refine(text: &str, region: &Region) -> Vec<Region> {
    let (from, to) = region.inner;
    let mut masked = String::with_capacity(text.len());
    for (line, body) in text.split('\n').enumerate() {
        if line > 0 {
            masked.push('\n');
        }
        for (col, ch) in body.chars().enumerate() {
            let pos = Position::new(line, col);
            masked.push(if from <= pos && pos < to { ch } else { ' ' });
        }
    }
    BracketScanner::new(&masked, false).collect()
}

/// All regions whose contents contain the range `start..end`, with string and comment regions
/// refined so brackets inside them are found too. Ordered from innermost to outermost.
pub fn enclosing_regions(text: &str, start: Position, end: Position) -> Vec<Region> {
    let mut found: Vec<Region> = scan(text, false)
        .filter(|r| r.inner_contains_range(start, end))
        .collect();
    sort_innermost_first(&mut found);

    // Refine past opaque regions until the innermost one is a bracket pair or nothing new
    // turns up.
    let mut guard = 0usize;
    while let Some(innermost) = found.first().copied()
        && innermost.kind.is_opaque()
        && guard < 64
    {
        guard += 1;
        let mut nested: Vec<Region> = refine(text, &innermost)
            .into_iter()
            .filter(|r| r.inner_contains_range(start, end) && *r != innermost)
            .filter(|r| !found.contains(r))
            .collect();
        if nested.is_empty() {
            break;
        }
        nested.append(&mut found);
        found = nested;
        sort_innermost_first(&mut found);
    }
    found
}

fn sort_innermost_first(regions: &mut [Region]) {
    // A region nested in another starts later or ends earlier; sorting by descending start and
    // ascending end keeps containment order.
    regions.sort_by(|a, b| b.outer.0.cmp(&a.outer.0).then(a.outer.1.cmp(&b.outer.1)));
}

/// The string region whose contents contain `pos`, if any.
pub fn string_at(text: &str, pos: Position) -> Option<Region> {
    scan(text, false).find(|r| r.kind.is_string() && r.start < pos && pos < r.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str, strict: bool) -> Vec<(RegionKind, (usize, usize), (usize, usize))> {
        scan(text, strict)
            .map(|r| {
                (
                    r.kind,
                    (r.start.line, r.start.column),
                    (r.end.line, r.end.column),
                )
            })
            .collect()
    }

    #[test]
    fn nested_parens_close_innermost_first() {
        assert_eq!(
            kinds("f(a[1])", false),
            vec![
                (RegionKind::Parens, (0, 3), (0, 5)),
                (RegionKind::Parens, (0, 1), (0, 6)),
            ]
        );
    }

    #[test]
    fn mismatched_closer_is_ignored() {
        assert_eq!(kinds("(]", false), vec![]);
    }

    #[test]
    fn strings_hide_brackets() {
        assert_eq!(
            kinds("x = '(' + \")\"", false),
            vec![
                (RegionKind::SingleString, (0, 4), (0, 7)),
                (RegionKind::SingleString, (0, 10), (0, 13)),
            ]
        );
    }

    #[test]
    fn escaped_quotes_do_not_close() {
        assert_eq!(
            kinds(r#"'a\'b'"#, false),
            vec![(RegionKind::SingleString, (0, 0), (0, 6))]
        );
    }

    #[test]
    fn comment_runs_through_newline() {
        assert_eq!(
            kinds("a # (x\nb # y", false),
            vec![
                (RegionKind::Comment, (0, 2), (1, 0)),
                (RegionKind::Comment, (1, 2), (1, 5)),
            ]
        );
    }

    #[test]
    fn unterminated_string_depends_on_mode() {
        assert_eq!(
            kinds("'abc (x)", false),
            vec![(RegionKind::SingleString, (0, 0), (0, 8))]
        );
        assert_eq!(kinds("'abc (x)\n(y)", true), vec![(RegionKind::Parens, (1, 0), (1, 2))]);
    }

    #[test]
    fn triple_strings_span_lines() {
        let regions: Vec<Region> = scan("s = \"\"\"a\n(b)\"\"\" + (c)", false).collect();
        assert_eq!(regions[0].kind, RegionKind::TripleString);
        assert_eq!(regions[0].start, Position::new(0, 4));
        assert_eq!(regions[0].end, Position::new(1, 6));
        assert_eq!(regions[1].kind, RegionKind::Parens);
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn scanner_is_fused() {
        let mut scanner = scan("()", true);
        assert!(scanner.next().is_some());
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn opaque_regions_and_gaps_rebuild_text() {
        let text = "a = 'x' # c\nb = \"y\"";
        let lines: Vec<&str> = text.split('\n').collect();
        let slice = |from: Position, to: Position| -> String {
            let mut out = String::new();
            let mut pos = from;
            while pos < to {
                let line: Vec<char> = lines[pos.line].chars().collect();
                if pos.column < line.len() {
                    out.push(line[pos.column]);
                    pos.column += 1;
                } else {
                    out.push('\n');
                    pos = Position::new(pos.line + 1, 0);
                }
            }
            out
        };
        let mut rebuilt = String::new();
        let mut at = Position::new(0, 0);
        for region in scan(text, false).filter(|r| r.kind.is_opaque()) {
            rebuilt.push_str(&slice(at, region.start));
            rebuilt.push_str(&slice(region.start, region.end));
            at = region.end;
        }
        rebuilt.push_str(&slice(at, Position::new(1, lines[1].chars().count())));
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn refinement_finds_parens_inside_strings() {
        let text = "x = 'f(a)'";
        let found = enclosing_regions(text, Position::new(0, 8), Position::new(0, 8));
        assert_eq!(found[0].kind, RegionKind::Parens);
        assert_eq!(found[0].start, Position::new(0, 6));
        assert_eq!(found[1].kind, RegionKind::SingleString);
    }

    #[test]
    fn string_at_reports_containing_literal() {
        let text = "'ab' c";
        assert!(string_at(text, Position::new(0, 2)).is_some());
        assert!(string_at(text, Position::new(0, 5)).is_none());
    }
}
