//! User preferences, loaded from and saved to TOML.
//!
//! ```toml
//! num_scroll_lines = 3
//! use_alt_scroll_multiplier = true
//! triple_click = "line"
//! case_sensitive = true
//! min_str_len = 2
//! scrollbar_thumb_color = [0.5, 0.5, 0.5, 0.6]
//!
//! [plugin.highlight_occurrences]
//! enabled = true
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading, saving or validating preferences.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file at {config_path}: {source}")]
    Read {
        /// File that was read.
        config_path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file could not be written.
    #[error("failed to write config file at {config_path}: {source}")]
    Write {
        /// File that was written.
        config_path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`Preferences`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Preferences could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A value is out of range.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// What a triple click selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripleClick {
    /// The whole line.
    #[default]
    Line,
    /// The dotted path under the pointer.
    Path,
}

/// An RGBA colour with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Rgba {
    /// Create a colour.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    fn channels(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 4]> for Rgba {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        c.channels()
    }
}

/// Per-plugin settings (`[plugin.<name>]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginPrefs {
    /// Whether the plugin should be loaded.
    pub enabled: bool,
}

impl Default for PluginPrefs {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Editor preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Lines scrolled per wheel tick (at least 1).
    pub num_scroll_lines: u32,
    /// Holding Alt multiplies wheel scrolling by 3.
    pub use_alt_scroll_multiplier: bool,
    /// What a triple click selects.
    pub triple_click: TripleClick,
    /// Occurrence highlighting matches case.
    pub case_sensitive: bool,
    /// Minimum selection length that triggers occurrence highlighting.
    pub min_str_len: usize,
    /// Scrollbar thumb colour.
    pub scrollbar_thumb_color: Rgba,
    /// Copy/cut with no selection takes the whole line.
    pub copy_line_fallback: bool,
    /// Duration of a wheel scroll animation, in milliseconds.
    pub scroll_duration_ms: u64,
    /// Lines kept between the caret and the view edge.
    pub ensure_visible_threshold: usize,
    /// Plugin switches, keyed by plugin name.
    pub plugin: BTreeMap<String, PluginPrefs>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            num_scroll_lines: 3,
            use_alt_scroll_multiplier: true,
            triple_click: TripleClick::Line,
            case_sensitive: true,
            min_str_len: 2,
            scrollbar_thumb_color: Rgba::new(0.5, 0.5, 0.5, 0.6),
            copy_line_fallback: true,
            scroll_duration_ms: 150,
            ensure_visible_threshold: crate::scroll::DEFAULT_VISIBLE_THRESHOLD,
            plugin: BTreeMap::new(),
        }
    }
}

impl Preferences {
    /// Parse and validate preferences from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let prefs: Preferences = toml::from_str(content)?;
        prefs.validate()?;
        Ok(prefs)
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from `config_path`. A missing file yields `Ok(None)`.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }
        let content =
            std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content).map(Some)
    }

    /// Write to `config_path`, creating parent directories.
    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> Result<(), ConfigError> {
        let config_path = config_path.as_ref();
        let write_err = |source| ConfigError::Write {
            config_path: config_path.to_path_buf(),
            source,
        };
        if let Some(parent) = config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(config_path, content).map_err(write_err)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_scroll_lines < 1 {
            return Err(ConfigError::Invalid {
                key: "num_scroll_lines",
                reason: "must be at least 1".to_string(),
            });
        }
        if self
            .scrollbar_thumb_color
            .channels()
            .iter()
            .any(|c| !(0.0..=1.0).contains(c))
        {
            return Err(ConfigError::Invalid {
                key: "scrollbar_thumb_color",
                reason: "channels must be within [0, 1]".to_string(),
            });
        }
        if self.scroll_duration_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "scroll_duration_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Wheel scroll duration.
    pub fn scroll_duration(&self) -> Duration {
        Duration::from_millis(self.scroll_duration_ms)
    }

    /// Lines to scroll for `ticks` wheel ticks.
    pub fn wheel_lines(&self, ticks: i32, alt: bool) -> f64 {
        let multiplier = if alt && self.use_alt_scroll_multiplier {
            3.0
        } else {
            1.0
        };
        f64::from(ticks) * f64::from(self.num_scroll_lines) * multiplier
    }

    /// Whether plugin `name` is enabled. Unlisted plugins are enabled.
    pub fn plugin_enabled(&self, name: &str) -> bool {
        self.plugin.get(name).is_none_or(|p| p.enabled)
    }

    /// Switch a plugin on or off.
    pub fn set_plugin_enabled(&mut self, name: impl Into<String>, enabled: bool) {
        self.plugin.insert(name.into(), PluginPrefs { enabled });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Preferences::from_toml_str("").unwrap(), Preferences::default());
    }

    #[test]
    fn parses_documented_keys() {
        let prefs = Preferences::from_toml_str(
            r#"
            num_scroll_lines = 5
            triple_click = "path"
            scrollbar_thumb_color = [1.0, 0.0, 0.0, 1.0]

            [plugin.highlight_occurrences]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(prefs.num_scroll_lines, 5);
        assert_eq!(prefs.triple_click, TripleClick::Path);
        assert_eq!(prefs.scrollbar_thumb_color, Rgba::new(1.0, 0.0, 0.0, 1.0));
        assert!(!prefs.plugin_enabled("highlight_occurrences"));
        assert!(prefs.plugin_enabled("other"));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            Preferences::from_toml_str("num_scroll_lines = 0"),
            Err(ConfigError::Invalid { key: "num_scroll_lines", .. })
        ));
        assert!(matches!(
            Preferences::from_toml_str("scrollbar_thumb_color = [2.0, 0.0, 0.0, 1.0]"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            Preferences::from_toml_str("triple_click = \"word\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn wheel_multiplier() {
        let prefs = Preferences::default();
        assert_eq!(prefs.wheel_lines(1, false), 3.0);
        assert_eq!(prefs.wheel_lines(-2, true), -18.0);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("caret.toml");
        assert!(Preferences::load_from_path(&path).unwrap().is_none());

        let mut prefs = Preferences::default();
        prefs.min_str_len = 4;
        prefs.set_plugin_enabled("highlight_occurrences", false);
        prefs.save_to_path(&path).unwrap();

        let loaded = Preferences::load_from_path(&path).unwrap().unwrap();
        assert_eq!(loaded, prefs);
    }
}
