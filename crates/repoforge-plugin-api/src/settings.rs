//! Settings loading and validation.
//!
//! A plugin declares the configuration keys it needs as an ordered schema of
//! [`SettingDescriptor`]s. The [`SettingsLoader`] fetches the configuration set
//! for an (organization, setting) pair from a [`SettingsProvider`] and checks
//! the keys in schema order, failing on the first one that is absent.

use crate::error::{PluginError, Result};
use crate::types::PluginSettings;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Schema
// ============================================================================

/// One required configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDescriptor {
    /// Entry name looked up in the configuration set.
    pub key: &'static str,
    /// Human-readable name used in diagnostics.
    pub display_name: &'static str,
}

impl SettingDescriptor {
    pub const fn new(key: &'static str, display_name: &'static str) -> Self {
        Self { key, display_name }
    }
}

/// Values resolved for a schema, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    values: Vec<(&'static str, String)>,
}

impl ResolvedSettings {
    /// Value for a key declared in the schema.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Owned value for a declared key.
    ///
    /// Asking for a key the schema does not declare is a plugin bug and is
    /// reported as a settings error.
    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .map(str::to_string)
            .ok_or_else(|| PluginError::Settings(format!("setting \"{key}\" is not declared")))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Types built from a validated configuration set.
pub trait FromSettings: Sized {
    /// Required keys, checked in this order.
    const SCHEMA: &'static [SettingDescriptor];

    /// Build the value once every key in [`Self::SCHEMA`] has been resolved.
    fn from_settings(settings: ResolvedSettings) -> Result<Self>;
}

/// Check `settings` against `schema`.
///
/// Each key takes the value of the first entry with that exact name. The first
/// key with no entry fails with [`PluginError::MissingSetting`]; keys after it
/// are not examined.
pub fn resolve(
    plugin: &str,
    schema: &[SettingDescriptor],
    settings: &PluginSettings,
) -> Result<ResolvedSettings> {
    let mut values = Vec::with_capacity(schema.len());

    for descriptor in schema {
        let entry = settings
            .find(descriptor.key)
            .ok_or_else(|| PluginError::MissingSetting {
                plugin: plugin.to_string(),
                key: descriptor.key,
                display_name: descriptor.display_name,
            })?;
        values.push((descriptor.key, entry.value.clone()));
    }

    Ok(ResolvedSettings { values })
}

// ============================================================================
// Settings Provider
// ============================================================================

/// Source of named configuration sets.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Fetch the configuration set stored for `org_id`/`setting_id`.
    async fn get_plugin_settings_by_id(
        &self,
        org_id: &str,
        setting_id: &str,
    ) -> Result<PluginSettings>;
}

/// Fetches and validates plugin settings.
#[derive(Clone)]
pub struct SettingsLoader {
    provider: Arc<dyn SettingsProvider>,
    plugin: String,
}

impl SettingsLoader {
    /// Create a loader reporting failures on behalf of `plugin`.
    pub fn new(provider: Arc<dyn SettingsProvider>, plugin: impl Into<String>) -> Self {
        Self {
            provider,
            plugin: plugin.into(),
        }
    }

    /// Fetch the configuration once and build `T` from it.
    pub async fn load<T: FromSettings>(&self, org_id: &str, setting_id: &str) -> Result<T> {
        debug!(
            plugin = %self.plugin,
            "Loading settings for org {} setting {}", org_id, setting_id
        );

        let settings = self
            .provider
            .get_plugin_settings_by_id(org_id, setting_id)
            .await?;

        let resolved = resolve(&self.plugin, T::SCHEMA, &settings)?;
        T::from_settings(resolved)
    }
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

/// Settings provider serving pre-configured sets without any storage.
///
/// # Example
///
/// ```
/// use repoforge_plugin_api::settings::{MockSettingsProvider, SettingsProvider};
/// use repoforge_plugin_api::types::ConfigEntry;
///
/// # async fn example() -> repoforge_plugin_api::Result<()> {
/// let provider = MockSettingsProvider::empty().with_settings(
///     "acme",
///     "bitbucket",
///     vec![ConfigEntry::new("username", "u")],
/// );
/// let settings = provider.get_plugin_settings_by_id("acme", "bitbucket").await?;
/// assert_eq!(settings.configuration.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSettingsProvider {
    settings: HashMap<(String, String), PluginSettings>,
}

impl MockSettingsProvider {
    /// Create a mock provider with the given sets keyed by (org, setting).
    pub fn new(settings: HashMap<(String, String), PluginSettings>) -> Self {
        Self { settings }
    }

    /// Create an empty mock provider.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a configuration set.
    pub fn with_settings(
        mut self,
        org_id: impl Into<String>,
        setting_id: impl Into<String>,
        configuration: Vec<crate::types::ConfigEntry>,
    ) -> Self {
        self.settings.insert(
            (org_id.into(), setting_id.into()),
            PluginSettings::new(configuration),
        );
        self
    }
}

#[async_trait]
impl SettingsProvider for MockSettingsProvider {
    async fn get_plugin_settings_by_id(
        &self,
        org_id: &str,
        setting_id: &str,
    ) -> Result<PluginSettings> {
        self.settings
            .get(&(org_id.to_string(), setting_id.to_string()))
            .cloned()
            .ok_or_else(|| {
                PluginError::Settings(format!(
                    "no settings stored for org {org_id} setting {setting_id}"
                ))
            })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigEntry;

    const SCHEMA: &[SettingDescriptor] = &[
        SettingDescriptor::new("username", "Username"),
        SettingDescriptor::new("password", "Password"),
        SettingDescriptor::new("team_id", "Team ID"),
    ];

    #[derive(Debug, PartialEq)]
    struct Creds {
        username: String,
        password: String,
        team_id: String,
    }

    impl FromSettings for Creds {
        const SCHEMA: &'static [SettingDescriptor] = SCHEMA;

        fn from_settings(settings: ResolvedSettings) -> Result<Self> {
            Ok(Self {
                username: settings.require("username")?,
                password: settings.require("password")?,
                team_id: settings.require("team_id")?,
            })
        }
    }

    fn entries(pairs: &[(&str, &str)]) -> PluginSettings {
        PluginSettings::new(
            pairs
                .iter()
                .map(|(name, value)| ConfigEntry::new(*name, *value))
                .collect(),
        )
    }

    fn missing_key(err: PluginError) -> &'static str {
        match err {
            PluginError::MissingSetting { key, .. } => key,
            other => panic!("expected MissingSetting, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_all_present() {
        let settings = entries(&[("username", "u"), ("password", "p"), ("team_id", "t")]);
        let resolved = resolve("Test", SCHEMA, &settings).unwrap();

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved.get("username"), Some("u"));
        assert_eq!(resolved.get("password"), Some("p"));
        assert_eq!(resolved.get("team_id"), Some("t"));
    }

    #[test]
    fn test_resolve_any_order_with_extras() {
        let settings = entries(&[
            ("region", "eu"),
            ("team_id", "t"),
            ("password", "p"),
            ("username", "u"),
            ("username", "ignored"),
        ]);
        let resolved = resolve("Test", SCHEMA, &settings).unwrap();

        assert_eq!(resolved.get("username"), Some("u"));
        assert_eq!(resolved.get("region"), None);
    }

    #[test]
    fn test_resolve_each_missing_key() {
        let full = [("username", "u"), ("password", "p"), ("team_id", "t")];
        for skip in 0..full.len() {
            let pairs: Vec<_> = full
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, pair)| *pair)
                .collect();
            let err = resolve("Test", SCHEMA, &entries(&pairs)).unwrap_err();
            assert_eq!(missing_key(err), full[skip].0);
        }
    }

    #[test]
    fn test_resolve_reports_first_missing_key() {
        // Only team_id present: username is reported, password is never checked.
        let err = resolve("Test", SCHEMA, &entries(&[("team_id", "t")])).unwrap_err();
        assert_eq!(missing_key(err), "username");

        let err = resolve("Test", SCHEMA, &entries(&[("username", "u")])).unwrap_err();
        assert_eq!(missing_key(err), "password");
    }

    #[test]
    fn test_name_match_is_exact() {
        let settings = entries(&[("Username", "u"), ("password", "p"), ("team_id", "t")]);
        let err = resolve("Test", SCHEMA, &settings).unwrap_err();
        assert_eq!(missing_key(err), "username");
    }

    #[test]
    fn test_require_undeclared_key() {
        let settings = entries(&[("username", "u"), ("password", "p"), ("team_id", "t")]);
        let resolved = resolve("Test", SCHEMA, &settings).unwrap();
        assert!(matches!(
            resolved.require("token"),
            Err(PluginError::Settings(_))
        ));
    }

    #[tokio::test]
    async fn test_loader_builds_value() {
        let provider = MockSettingsProvider::empty().with_settings(
            "org_id",
            "setting_id",
            vec![
                ConfigEntry::new("username", "u"),
                ConfigEntry::new("password", "p"),
                ConfigEntry::new("team_id", "t"),
            ],
        );
        let loader = SettingsLoader::new(Arc::new(provider), "Test");

        let creds: Creds = loader.load("org_id", "setting_id").await.unwrap();
        assert_eq!(
            creds,
            Creds {
                username: "u".to_string(),
                password: "p".to_string(),
                team_id: "t".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_loader_missing_username() {
        let provider = MockSettingsProvider::empty().with_settings(
            "org_id",
            "setting_id",
            vec![
                ConfigEntry::new("foo", "u"),
                ConfigEntry::new("password", "p"),
                ConfigEntry::new("team_id", "t"),
            ],
        );
        let loader = SettingsLoader::new(Arc::new(provider), "Test");

        let err = loader
            .load::<Creds>("org_id", "setting_id")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Username"));
    }

    #[tokio::test]
    async fn test_loader_is_idempotent() {
        let provider = MockSettingsProvider::empty().with_settings(
            "org_id",
            "setting_id",
            vec![
                ConfigEntry::new("username", "u"),
                ConfigEntry::new("password", "p"),
                ConfigEntry::new("team_id", "t"),
            ],
        );
        let loader = SettingsLoader::new(Arc::new(provider), "Test");

        let first: Creds = loader.load("org_id", "setting_id").await.unwrap();
        let second: Creds = loader.load("org_id", "setting_id").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_loader_unknown_setting() {
        let loader = SettingsLoader::new(Arc::new(MockSettingsProvider::empty()), "Test");
        let result = loader.load::<Creds>("org_id", "missing").await;
        assert!(matches!(result, Err(PluginError::Settings(_))));
    }
}
