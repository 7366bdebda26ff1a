//! Configuration file loading and management
//!
//! This module handles loading and parsing the host configuration from
//! `$XDG_CONFIG_HOME/repoforge/config.toml`. If the configuration file doesn't
//! exist, a default configuration is created with documented comments.

use anyhow::{Context, Result};
use repoforge_plugin_api::{ConfigEntry, PluginSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Main host configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Host-specific configuration
    #[serde(default)]
    pub host: HostConfig,
    /// Provider settings sets, keyed by organization and setting ID
    #[serde(default)]
    pub settings: Vec<SettingsEntry>,
}

/// Host process configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Default: "info"
    pub log_level: String,
}

/// One stored configuration set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsEntry {
    pub org_id: String,
    pub setting_id: String,
    /// Registry ID of the only plugin allowed to read this set
    pub plugin: String,
    #[serde(default)]
    pub configuration: Vec<ConfigEntry>,
}

impl SettingsEntry {
    pub fn to_plugin_settings(&self) -> PluginSettings {
        PluginSettings::new(self.configuration.clone())
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the specified path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default XDG config location
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// file with documented comments.
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_file(&config_path)?;
        }

        Self::load(&config_path)
    }

    /// Returns `$XDG_CONFIG_HOME/repoforge/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "repoforge", "repoforge")
            .context("Failed to determine project directories")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Create a default configuration file with documented comments
    pub fn create_default_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        tracing::info!("Created default configuration file at: {}", path.display());
        Ok(())
    }

    fn default_config_content() -> String {
        r#"# repoforge host configuration

[host]
# Log level: trace, debug, info, warn, error
# RUST_LOG overrides this when set.
# Default: "info"
log_level = "info"

# Provider settings sets.
# Each set is looked up by (org_id, setting_id) when a plugin is initialized,
# and is only handed to the plugin named by `plugin`.
# Entry names are matched exactly; the first entry with a given name wins.
#
# [[settings]]
# org_id = "acme"
# setting_id = "bitbucket-main"
# plugin = "bitbucket-explorer"
# configuration = [
#     { name = "username", value = "bitbucket-user" },
#     { name = "password", value = "app-password" },
#     { name = "team_id", value = "acme-team" },
# ]
"#
        .to_string()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.host.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log_level: {}. Must be one of: {}",
                self.host.log_level,
                valid_log_levels.join(", ")
            );
        }

        let mut seen = HashSet::new();
        for entry in &self.settings {
            if entry.org_id.trim().is_empty() || entry.setting_id.trim().is_empty() {
                anyhow::bail!("settings entries need a non-empty org_id and setting_id");
            }
            if entry.plugin.trim().is_empty() {
                anyhow::bail!(
                    "Settings '{}/{}': plugin must not be empty",
                    entry.org_id,
                    entry.setting_id
                );
            }
            if !seen.insert((entry.org_id.as_str(), entry.setting_id.as_str())) {
                anyhow::bail!(
                    "Duplicate settings entry for org '{}' setting '{}'",
                    entry.org_id,
                    entry.setting_id
                );
            }
        }

        Ok(())
    }

    /// Find the settings set stored under `(org_id, setting_id)`.
    pub fn find_settings(&self, org_id: &str, setting_id: &str) -> Option<&SettingsEntry> {
        self.settings
            .iter()
            .find(|entry| entry.org_id == org_id && entry.setting_id == setting_id)
    }
}
