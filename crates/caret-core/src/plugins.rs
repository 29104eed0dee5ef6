//! Optional features that hook into the verb table.
//!
//! A [`Plugin`] installs and removes hooks on [`Overrides`]. [`PluginManager`] switches plugins
//! according to the `plugin.<name>.enabled` preferences and remembers the outcome of the last
//! switch, so a preferences UI can show an error indicator next to a plugin that failed.

use crate::config::Preferences;
use crate::overrides::Overrides;
use thiserror::Error;

/// Plugin errors.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plugin with this name is already registered.
    #[error("plugin `{0}` is already registered")]
    AlreadyRegistered(String),
    /// No plugin with this name.
    #[error("unknown plugin `{0}`")]
    Unknown(String),
    /// The plugin failed to enable or disable itself.
    #[error("plugin `{name}` failed: {reason}")]
    Failed {
        /// Plugin name.
        name: String,
        /// What went wrong.
        reason: String,
    },
}

/// An optional feature.
pub trait Plugin {
    /// Stable name, matching the `[plugin.<name>]` preferences key.
    fn name(&self) -> &str;
    /// Install the plugin's hooks.
    fn enable(&mut self, overrides: &mut Overrides) -> Result<(), PluginError>;
    /// Remove the plugin's hooks.
    fn disable(&mut self, overrides: &mut Overrides) -> Result<(), PluginError>;
}

/// Outcome of the last enable/disable of a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginStatus {
    /// Hooks are installed.
    Enabled,
    /// Hooks are not installed.
    Disabled,
    /// The last switch failed with this message.
    Failed(String),
}

impl PluginStatus {
    /// Returns `true` for [`PluginStatus::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, PluginStatus::Failed(_))
    }
}

struct Entry {
    plugin: Box<dyn Plugin>,
    status: PluginStatus,
}

/// Registered plugins and their status.
#[derive(Default)]
pub struct PluginManager {
    entries: Vec<Entry>,
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.plugin.name(), &e.status)))
            .finish()
    }
}

impl PluginManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. It starts disabled.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        if self.find(plugin.name()).is_some() {
            return Err(PluginError::AlreadyRegistered(plugin.name().to_string()));
        }
        self.entries.push(Entry {
            plugin,
            status: PluginStatus::Disabled,
        });
        Ok(())
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.plugin.name() == name)
    }

    /// Status of plugin `name`.
    pub fn status(&self, name: &str) -> Option<&PluginStatus> {
        self.find(name).map(|i| &self.entries[i].status)
    }

    /// `(name, status)` for every plugin, in registration order.
    pub fn statuses(&self) -> impl Iterator<Item = (&str, &PluginStatus)> {
        self.entries.iter().map(|e| (e.plugin.name(), &e.status))
    }

    /// Enable or disable one plugin.
    ///
    /// A failure is recorded as [`PluginStatus::Failed`] and also returned.
    pub fn set_enabled(
        &mut self,
        name: &str,
        enabled: bool,
        overrides: &mut Overrides,
    ) -> Result<(), PluginError> {
        let index = self
            .find(name)
            .ok_or_else(|| PluginError::Unknown(name.to_string()))?;
        let entry = &mut self.entries[index];
        let wanted = if enabled {
            PluginStatus::Enabled
        } else {
            PluginStatus::Disabled
        };
        if entry.status == wanted {
            return Ok(());
        }

        let outcome = if enabled {
            entry.plugin.enable(overrides)
        } else {
            entry.plugin.disable(overrides)
        };
        match outcome {
            Ok(()) => {
                tracing::debug!(plugin = name, enabled, "plugin switched");
                entry.status = wanted;
                Ok(())
            }
            Err(err) => {
                tracing::error!(plugin = name, enabled, error = %err, "plugin switch failed");
                entry.status = PluginStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Switch every plugin to match `prefs`. Failures are recorded per plugin and do not stop
    /// the others; the number of failures is returned.
    pub fn apply(&mut self, prefs: &Preferences, overrides: &mut Overrides) -> usize {
        let names: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.plugin.name().to_string())
            .collect();
        names
            .iter()
            .filter(|name| {
                self.set_enabled(name, prefs.plugin_enabled(name), overrides)
                    .is_err()
            })
            .count()
    }

    /// Disable every enabled plugin.
    pub fn disable_all(&mut self, overrides: &mut Overrides) {
        let names: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.status == PluginStatus::Enabled)
            .map(|e| e.plugin.name().to_string())
            .collect();
        for name in names {
            // Failures are already logged and recorded in the status.
            let _ = self.set_enabled(&name, false, overrides);
        }
    }
}
