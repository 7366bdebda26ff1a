//! # Plugin Registry
//!
//! Host-side collection of plugin instances, keyed by plugin ID. The registry
//! is the dispatcher a host talks to: it initializes plugins and forwards
//! request descriptors to the right instance.

use crate::error::{PluginError, Result};
use crate::plugin::{Plugin, PluginMetadata};
use crate::router::Operation;
use crate::types::RequestDescriptor;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// Registry for managing plugin instances.
pub struct PluginRegistry {
    plugins: HashMap<String, Box<dyn Plugin>>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Register a plugin under its metadata ID.
    ///
    /// A plugin already registered under the same ID is replaced.
    pub fn register<P>(&mut self, plugin: P)
    where
        P: Plugin + 'static,
    {
        let id = plugin.metadata().id.clone();
        info!("Registered plugin: {} ({})", plugin.metadata().name, id);
        self.plugins.insert(id, Box::new(plugin));
    }

    /// Get a plugin by ID.
    pub fn get(&self, id: &str) -> Option<&dyn Plugin> {
        self.plugins.get(id).map(|plugin| plugin.as_ref())
    }

    /// Check if a plugin with the given ID is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }

    /// Remove a plugin from the registry.
    pub fn remove(&mut self, id: &str) -> Option<Box<dyn Plugin>> {
        self.plugins.remove(id)
    }

    /// Get the number of registered plugins.
    pub fn count(&self) -> usize {
        self.plugins.len()
    }

    /// Initialize the plugin registered under `id`.
    pub async fn init_plugin(&mut self, id: &str, org_id: &str, setting_id: &str) -> Result<()> {
        let plugin = self
            .plugins
            .get_mut(id)
            .ok_or_else(|| PluginError::PluginNotFound(id.to_string()))?;
        plugin.init(org_id, setting_id).await
    }

    /// Forward `request` to the plugin registered under `id`.
    pub async fn route(&self, id: &str, request: RequestDescriptor) -> Result<serde_json::Value> {
        let plugin = self
            .plugins
            .get(id)
            .ok_or_else(|| PluginError::PluginNotFound(id.to_string()))?;
        plugin.route_request(request).await
    }

    /// Describe every registered plugin, sorted by ID.
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        let mut infos: Vec<PluginInfo> = self
            .plugins
            .values()
            .map(|plugin| PluginInfo {
                metadata: plugin.metadata().clone(),
                operations: plugin.operations(),
                ready: plugin.is_ready(),
            })
            .collect();
        infos.sort_by(|a, b| a.metadata.id.cmp(&b.metadata.id));
        infos
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a registered plugin.
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    #[serde(flatten)]
    pub metadata: PluginMetadata,
    pub operations: Vec<Operation>,
    pub ready: bool,
}
