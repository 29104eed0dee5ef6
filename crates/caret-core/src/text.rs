//! Character-indexed string helpers.
//!
//! All columns in `caret-core` count Unicode scalar values (`char`s), never bytes. These helpers
//! convert between the two and find grapheme boundaries so a single "character" step never
//! splits a combined emoji or an accented letter.

use unicode_segmentation::UnicodeSegmentation;

/// Split text into lines on `'\n'`, keeping the trailing empty segment.
///
/// `N` newlines always produce `N + 1` lines, which matches the rope's line model.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Number of `char`s in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the `col`-th char, clamped to the end of `s`.
pub fn char_to_byte(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map(|(b, _)| b).unwrap_or(s.len())
}

/// Slice `s` by char columns (half-open, clamped).
pub fn slice_chars(s: &str, start: usize, end: usize) -> &str {
    let start_b = char_to_byte(s, start);
    let end_b = char_to_byte(s, end.max(start));
    &s[start_b..end_b]
}

/// The char at column `col`, if any.
pub fn char_at(s: &str, col: usize) -> Option<char> {
    s.chars().nth(col)
}

/// Column of the grapheme boundary strictly before `col` (0 if none).
pub fn prev_grapheme_boundary(line: &str, col: usize) -> usize {
    let mut last = 0usize;
    let mut at = 0usize;
    for grapheme in line.graphemes(true) {
        if at >= col {
            break;
        }
        last = at;
        at += grapheme.chars().count();
    }
    last
}

/// Column of the grapheme boundary strictly after `col` (line length if none).
pub fn next_grapheme_boundary(line: &str, col: usize) -> usize {
    let mut at = 0usize;
    for grapheme in line.graphemes(true) {
        at += grapheme.chars().count();
        if at > col {
            return at;
        }
    }
    at
}

/// Leading run of spaces and tabs.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, ch)| *ch != ' ' && *ch != '\t')
        .map(|(b, _)| b)
        .unwrap_or(line.len());
    &line[..end]
}

/// Returns `true` if the line has no non-whitespace characters.
pub fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

/// Identifier characters: ASCII/Unicode alphanumerics and `_`.
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_trailing_empty_line() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn char_slicing_is_clamped() {
        assert_eq!(slice_chars("héllo", 1, 3), "él");
        assert_eq!(slice_chars("abc", 2, 99), "c");
        assert_eq!(slice_chars("abc", 3, 1), "");
    }

    #[test]
    fn grapheme_steps_skip_combining_marks() {
        // "e" + combining acute accent counts as one grapheme of two chars.
        let line = "ae\u{301}b";
        assert_eq!(next_grapheme_boundary(line, 1), 3);
        assert_eq!(prev_grapheme_boundary(line, 3), 1);
        assert_eq!(prev_grapheme_boundary(line, 0), 0);
        assert_eq!(next_grapheme_boundary(line, 4), 4);
    }

    #[test]
    fn whitespace_helpers() {
        assert_eq!(leading_whitespace("  \tx y"), "  \t");
        assert!(is_blank(" \t "));
        assert!(!is_blank(" x"));
    }
}
