//! The plugin contract and per-instance lifecycle state.

use crate::error::{PluginError, Result};
use crate::router::Operation;
use crate::types::RequestDescriptor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where a plugin instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginScope {
    /// One instance per host process, shared by all organizations.
    Service,
}

/// What kind of integration a plugin provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginType {
    Repositories,
}

/// Static description of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Registry key, e.g. `bitbucket-explorer`.
    pub id: String,
    /// Name used in diagnostics, e.g. `BitbucketExplorer`.
    pub name: String,
    pub scope: PluginScope,
    pub plugin_type: PluginType,
}

/// Lifecycle state of a plugin instance.
///
/// `Ready` holds everything the routed operations need; there is no way to be
/// half-initialized.
pub enum PluginState<C, R: ?Sized> {
    Uninitialized,
    Ready { credentials: C, client: Arc<R> },
}

impl<C, R: ?Sized> Default for PluginState<C, R> {
    fn default() -> Self {
        PluginState::Uninitialized
    }
}

impl<C, R: ?Sized> PluginState<C, R> {
    pub fn is_ready(&self) -> bool {
        matches!(self, PluginState::Ready { .. })
    }

    /// Credentials, if initialized.
    pub fn credentials(&self) -> Option<&C> {
        match self {
            PluginState::Ready { credentials, .. } => Some(credentials),
            PluginState::Uninitialized => None,
        }
    }

    /// Bound client, or [`PluginError::NotInitialized`] for `plugin`.
    pub fn client(&self, plugin: &str) -> Result<&Arc<R>> {
        match self {
            PluginState::Ready { client, .. } => Ok(client),
            PluginState::Uninitialized => Err(PluginError::NotInitialized {
                plugin: plugin.to_string(),
            }),
        }
    }
}

/// A provider integration reachable through a uniform request interface.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Static description of this plugin.
    fn metadata(&self) -> &PluginMetadata;

    /// Operations reachable through [`Plugin::route_request`].
    fn operations(&self) -> Vec<Operation>;

    /// Load settings for `org_id`/`setting_id` and bind the remote client.
    ///
    /// Must complete before any request is routed. On failure the instance
    /// keeps its previous state.
    async fn init(&mut self, org_id: &str, setting_id: &str) -> Result<()>;

    /// Whether `init` has completed successfully.
    fn is_ready(&self) -> bool;

    /// Dispatch a request to one of the exposed operations.
    async fn route_request(&self, request: RequestDescriptor) -> Result<serde_json::Value>;
}
