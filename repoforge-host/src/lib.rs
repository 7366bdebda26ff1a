//! repoforge host library
//!
//! Wires the configured settings store to the registered plugins and runs one
//! routed request. The binary in `main.rs` is a thin CLI over [`invoke`].

pub mod config;
pub mod settings_store;

use crate::config::Config;
use crate::settings_store::FileSettingsProvider;
use anyhow::{Context, Result};
use provider_bitbucket::BitbucketExplorer;
use repoforge_plugin_api::{PluginRegistry, RequestDescriptor, TracingLogger};
use std::sync::Arc;
use tracing::info;

/// A request addressed to one plugin, with the settings set to initialize it from.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub plugin_id: String,
    pub org_id: String,
    pub setting_id: String,
    pub request: RequestDescriptor,
}

/// Register every built-in plugin, each reading only the settings sets
/// `config` tags for it.
pub fn build_registry(config: &Config) -> PluginRegistry {
    let plugin_id = provider_bitbucket::PLUGIN_ID;
    let settings = Arc::new(FileSettingsProvider::for_plugin(config, plugin_id));

    let mut registry = PluginRegistry::new();
    registry.register(BitbucketExplorer::new(
        settings,
        TracingLogger::shared(plugin_id),
    ));
    registry
}

/// Initialize the addressed plugin and route the request to it.
pub async fn invoke(
    registry: &mut PluginRegistry,
    invocation: Invocation,
) -> Result<serde_json::Value> {
    let Invocation {
        plugin_id,
        org_id,
        setting_id,
        request,
    } = invocation;

    registry
        .init_plugin(&plugin_id, &org_id, &setting_id)
        .await
        .with_context(|| format!("Failed to initialize plugin {plugin_id}"))?;
    info!("Plugin {} initialized from {}/{}", plugin_id, org_id, setting_id);

    let method = request.method_name.clone();
    registry
        .route(&plugin_id, request)
        .await
        .with_context(|| format!("Request {method} to plugin {plugin_id} failed"))
}
