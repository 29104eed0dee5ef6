//! Compiled language rules.
//!
//! [`caret_lang::LanguageConfig`] holds patterns as strings; [`Language`] compiles the indent
//! patterns once so line breaks do not rebuild regexes on every keystroke.

use caret_lang::LanguageConfig;
use regex::Regex;

/// A [`LanguageConfig`] with its indent rules compiled.
#[derive(Debug, Clone)]
pub struct Language {
    config: LanguageConfig,
    block_start: Option<Regex>,
    block_end: Option<Regex>,
}

impl Language {
    /// Compile `config`. Fails if an indent pattern is not a valid regex.
    pub fn new(config: LanguageConfig) -> Result<Self, regex::Error> {
        let block_start = compile(&config.indent.block_start)?;
        let block_end = compile(&config.indent.block_end)?;
        Ok(Self {
            config,
            block_start,
            block_end,
        })
    }

    /// Python rules.
    pub fn python() -> Self {
        let config = LanguageConfig::python();
        Self {
            block_start: Regex::new(&config.indent.block_start).ok(),
            block_end: Regex::new(&config.indent.block_end).ok(),
            config,
        }
    }

    /// The underlying configuration.
    pub fn config(&self) -> &LanguageConfig {
        &self.config
    }

    /// Returns `true` if `line` opens an indented block.
    pub fn opens_block(&self, line: &str) -> bool {
        self.block_start.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Returns `true` if `line` ends a block.
    pub fn closes_block(&self, line: &str) -> bool {
        self.block_end.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Line comment token.
    pub fn comment_token(&self) -> &str {
        self.config.comment.line_token()
    }

    /// Returns `true` if `line` holds only a comment (after optional indentation).
    pub fn is_comment_only(&self, line: &str) -> bool {
        line.trim_start().starts_with(self.comment_token())
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::python()
    }
}

fn compile(pattern: &str) -> Result<Option<Regex>, regex::Error> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern).map(Some)
}
