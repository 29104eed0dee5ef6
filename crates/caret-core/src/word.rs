//! Word boundaries for word-wise deletion and movement.
//!
//! A "word" is one match of `\s{2,}|\s?\w+|\s?[^a-zA-Z0-9_ ]*`: a run of whitespace, or an
//! identifier or punctuation run with at most one leading space. The strict variant
//! `\s{2,}|\w+|[^a-zA-Z0-9_]` never absorbs the space and steps over punctuation one char
//! at a time.

use regex::Regex;
use std::sync::OnceLock;

fn word_regex(strict: bool) -> &'static Regex {
    static LENIENT: OnceLock<Regex> = OnceLock::new();
    static STRICT: OnceLock<Regex> = OnceLock::new();
    if strict {
        STRICT.get_or_init(|| Regex::new(r"\s{2,}|\w+|[^a-zA-Z0-9_]").expect("valid word regex"))
    } else {
        LENIENT.get_or_init(|| {
            Regex::new(r"\s{2,}|\s?\w+|\s?[^a-zA-Z0-9_ ]*").expect("valid word regex")
        })
    }
}

fn byte_to_col(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

/// Column where the word starting at `col` ends. Always moves at least one char when `col` is
/// before the end of the line.
pub fn next_word_boundary(line: &str, col: usize, strict: bool) -> usize {
    let len = line.chars().count();
    if col >= len {
        return len;
    }
    let start = crate::text::char_to_byte(line, col);
    let rest = &line[start..];
    match word_regex(strict).find(rest) {
        Some(m) if m.start() == 0 && m.end() > 0 => col + byte_to_col(rest, m.end()),
        _ => col + 1,
    }
}

/// Column where the word ending at `col` starts. Always moves at least one char when `col > 0`.
pub fn prev_word_boundary(line: &str, col: usize, strict: bool) -> usize {
    if col == 0 {
        return 0;
    }
    let end = crate::text::char_to_byte(line, col);
    let head = &line[..end];
    let last = word_regex(strict)
        .find_iter(head)
        .filter(|m| m.end() == end && m.end() > m.start())
        .last();
    match last {
        Some(m) => byte_to_col(head, m.start()),
        None => col - 1,
    }
}
