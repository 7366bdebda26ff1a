//! Settings provider backed by the `[[settings]]` sets of the host config.

use crate::config::Config;
use async_trait::async_trait;
use repoforge_plugin_api::{PluginError, PluginSettings, Result, SettingsProvider};
use tracing::debug;

/// Serves the configuration sets that `config.toml` tags for one plugin.
///
/// A set tagged for another plugin is refused even when the (org, setting)
/// pair matches, so credentials never cross plugins.
#[derive(Debug, Clone)]
pub struct FileSettingsProvider {
    plugin_id: String,
    config: Config,
}

impl FileSettingsProvider {
    /// Provider for the plugin registered under `plugin_id`.
    pub fn for_plugin(config: &Config, plugin_id: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            config: config.clone(),
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }
}

#[async_trait]
impl SettingsProvider for FileSettingsProvider {
    async fn get_plugin_settings_by_id(
        &self,
        org_id: &str,
        setting_id: &str,
    ) -> Result<PluginSettings> {
        let entry = self
            .config
            .find_settings(org_id, setting_id)
            .ok_or_else(|| {
                PluginError::Settings(format!(
                    "no settings configured for org {org_id} setting {setting_id}"
                ))
            })?;

        if entry.plugin != self.plugin_id {
            return Err(PluginError::Settings(format!(
                "settings {org_id}/{setting_id} belong to plugin {}, not {}",
                entry.plugin, self.plugin_id
            )));
        }

        debug!(
            "Serving {} setting(s) for {}/{} ({})",
            entry.configuration.len(),
            org_id,
            setting_id,
            self.plugin_id
        );
        Ok(entry.to_plugin_settings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsEntry;
    use repoforge_plugin_api::ConfigEntry;

    const PLUGIN: &str = "bitbucket-explorer";

    fn config_with(entries: Vec<SettingsEntry>) -> Config {
        Config {
            settings: entries,
            ..Config::default()
        }
    }

    fn entry(setting_id: &str, plugin: &str, username: &str) -> SettingsEntry {
        SettingsEntry {
            org_id: "acme".to_string(),
            setting_id: setting_id.to_string(),
            plugin: plugin.to_string(),
            configuration: vec![
                ConfigEntry::new("username", username),
                ConfigEntry::new("username", "shadowed"),
            ],
        }
    }

    #[tokio::test]
    async fn test_serves_configured_set() {
        let config = config_with(vec![
            entry("main", PLUGIN, "alice"),
            entry("backup", PLUGIN, "bob"),
        ]);
        let provider = FileSettingsProvider::for_plugin(&config, PLUGIN);
        assert_eq!(provider.plugin_id(), PLUGIN);

        let settings = provider
            .get_plugin_settings_by_id("acme", "backup")
            .await
            .unwrap();
        // Entry order is preserved so first-match lookups keep working.
        assert_eq!(settings.configuration.len(), 2);
        assert_eq!(settings.find("username").unwrap().value, "bob");
    }

    #[tokio::test]
    async fn test_unknown_pair() {
        let config = config_with(vec![entry("main", PLUGIN, "alice")]);
        let provider = FileSettingsProvider::for_plugin(&config, PLUGIN);

        let err = provider
            .get_plugin_settings_by_id("other-org", "main")
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::Settings(_)));
        assert!(err.to_string().contains("other-org"));
    }

    #[tokio::test]
    async fn test_set_tagged_for_other_plugin() {
        let config = config_with(vec![entry("gh", "github-explorer", "octocat")]);
        assert!(config.validate().is_ok());

        let provider = FileSettingsProvider::for_plugin(&config, PLUGIN);
        let err = provider
            .get_plugin_settings_by_id("acme", "gh")
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::Settings(_)));
        assert!(err.to_string().contains("github-explorer"));

        let github = FileSettingsProvider::for_plugin(&config, "github-explorer");
        let settings = github.get_plugin_settings_by_id("acme", "gh").await.unwrap();
        assert_eq!(settings.find("username").unwrap().value, "octocat");
    }

    #[tokio::test]
    async fn test_first_duplicate_wins() {
        let config = config_with(vec![
            entry("main", PLUGIN, "alice"),
            entry("main", PLUGIN, "mallory"),
        ]);
        let provider = FileSettingsProvider::for_plugin(&config, PLUGIN);

        let settings = provider
            .get_plugin_settings_by_id("acme", "main")
            .await
            .unwrap();
        assert_eq!(settings.find("username").unwrap().value, "alice");
    }
}
