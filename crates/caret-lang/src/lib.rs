#![warn(missing_docs)]
//! `caret-lang` - data-driven language configuration helpers for `caret-core`.
//!
//! This crate intentionally stays lightweight and does **not** depend on any regex or parsing
//! machinery. It provides small structs that the editing core compiles and consults when it
//! needs language-aware behavior: comment toggling, smart line breaks, auto-closing pairs and
//! word/path boundaries.

/// Characters that end a "path" when expanding a selection over a dotted name.
///
/// The period is deliberately absent: `os.path.join` expands as one unit.
pub const PATH_SEPARATORS: &str = " !\"#$%&'()*+,-/:;<=>?@[\\]^`{|}~";

/// Characters that split an undo typing burst. Same as [`PATH_SEPARATORS`] plus `.`.
pub const WORD_SEPARATORS: &str = " !\"#$%&'()*+,-/:;<=>?@[\\]^`{|}~.";

/// Returns `true` if `ch` splits an undo typing burst.
pub fn is_word_separator(ch: char) -> bool {
    ch == '\t' || ch == '\n' || WORD_SEPARATORS.contains(ch)
}

/// Returns `true` if `ch` terminates a path selection.
pub fn is_path_separator(ch: char) -> bool {
    ch == '\t' || ch == '\n' || PATH_SEPARATORS.contains(ch)
}

/// Comment tokens/config for a given language.
///
/// The editor kernel uses this to implement comment toggling and comment continuation on
/// line break in a UI-agnostic way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `#`, `//`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// Create a config that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Create a config that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// Returns `true` if a line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// The line comment token, or `#` when none is configured.
    pub fn line_token(&self) -> &str {
        match self.line.as_deref() {
            Some(token) if !token.is_empty() => token,
            _ => "#",
        }
    }

    /// Prefix inserted when commenting a line: the token followed by one space.
    pub fn line_prefix(&self) -> String {
        format!("{} ", self.line_token())
    }
}

/// Patterns that drive automatic indentation after a line break.
///
/// Both patterns are matched against the full text of the reference line (the nearest line
/// above the caret that is neither blank nor comment-only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentRules {
    /// A line matching this pattern opens a block: the next line gets one more indent unit.
    pub block_start: String,
    /// A line matching this pattern ends a block: the next line gets one less indent unit.
    pub block_end: String,
}

impl IndentRules {
    /// Python-style block rules.
    pub fn python() -> Self {
        Self {
            block_start: r"^[ \t]*?\b(def|if|for|class|else|elif|with|while|try|except|finally|match|case)\b.*?:"
                .to_string(),
            block_end: r"^[ \t]*?\b(pass|break|continue|raise|return)\b".to_string(),
        }
    }
}

/// A pair of characters that are auto-closed and matched together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPair {
    /// Opening character.
    pub open: char,
    /// Closing character.
    pub close: char,
}

impl BracketPair {
    /// Create a new pair.
    pub const fn new(open: char, close: char) -> Self {
        Self { open, close }
    }
}

/// Full language configuration consumed by the editing commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Language name (informational).
    pub name: String,
    /// Comment tokens.
    pub comment: CommentConfig,
    /// Smart indentation rules.
    pub indent: IndentRules,
    /// Bracket pairs, in priority order.
    pub brackets: Vec<BracketPair>,
    /// Quote characters that delimit string literals.
    pub quotes: Vec<char>,
}

impl LanguageConfig {
    /// Python defaults: `#` comments, colon-terminated block openers, `()[]{}` brackets and
    /// `"`/`'` quotes (triple-quoted strings are handled by the scanner).
    pub fn python() -> Self {
        Self {
            name: "python".to_string(),
            comment: CommentConfig::line("#"),
            indent: IndentRules::python(),
            brackets: vec![
                BracketPair::new('(', ')'),
                BracketPair::new('[', ']'),
                BracketPair::new('{', '}'),
            ],
            quotes: vec!['"', '\''],
        }
    }

    /// Closing character for an opening bracket or quote.
    pub fn closer_for(&self, open: char) -> Option<char> {
        if self.quotes.contains(&open) {
            return Some(open);
        }
        self.brackets
            .iter()
            .find(|pair| pair.open == open)
            .map(|pair| pair.close)
    }

    /// Returns `true` if `ch` opens a bracket pair.
    pub fn is_opener(&self, ch: char) -> bool {
        self.brackets.iter().any(|pair| pair.open == ch)
    }

    /// Returns `true` if `ch` closes a bracket pair.
    pub fn is_closer(&self, ch: char) -> bool {
        self.brackets.iter().any(|pair| pair.close == ch)
    }

    /// Returns `true` if `ch` is a configured quote character.
    pub fn is_quote(&self, ch: char) -> bool {
        self.quotes.contains(&ch)
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::python()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_binds_paths_but_splits_words() {
        assert!(!is_path_separator('.'));
        assert!(is_word_separator('.'));
        assert!(is_path_separator('/'));
        assert!(!is_word_separator('a'));
        assert!(!is_word_separator('_'));
    }

    #[test]
    fn closer_lookup_covers_brackets_and_quotes() {
        let lang = LanguageConfig::python();
        assert_eq!(lang.closer_for('('), Some(')'));
        assert_eq!(lang.closer_for('{'), Some('}'));
        assert_eq!(lang.closer_for('"'), Some('"'));
        assert_eq!(lang.closer_for('x'), None);
        assert!(lang.is_closer(']'));
        assert!(!lang.is_opener(']'));
    }

    #[test]
    fn line_prefix_defaults_to_hash() {
        assert_eq!(CommentConfig::default().line_prefix(), "# ");
        assert_eq!(CommentConfig::line("//").line_prefix(), "// ");
    }
}
