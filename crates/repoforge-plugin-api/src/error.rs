//! Error types shared by every repoforge plugin.

use crate::types::HttpVerb;
use thiserror::Error;

/// Errors a plugin can surface to its host.
#[derive(Error, Debug)]
pub enum PluginError {
    /// A required configuration key was absent from the provider settings.
    #[error("{plugin} {display_name} missing from provider settings.")]
    MissingSetting {
        plugin: String,
        key: &'static str,
        display_name: &'static str,
    },

    /// The routed method name is not one of the plugin's exposed operations.
    #[error("The {verb} method {method} is not recognized by {plugin} plugin.")]
    MethodNotRecognized {
        verb: HttpVerb,
        method: String,
        plugin: String,
    },

    /// The remote client failed while serving an operation.
    #[error("{plugin} {operation} error: {message}")]
    RemoteOperation {
        plugin: String,
        operation: &'static str,
        message: String,
    },

    /// An operation was invoked before `init` completed.
    #[error("{plugin} plugin is not initialized")]
    NotInitialized { plugin: String },

    /// The settings provider could not serve the request.
    #[error("Settings error: {0}")]
    Settings(String),

    /// The remote client could not be built from the loaded credentials.
    #[error("{plugin} client construction failed: {message}")]
    ClientConstruction { plugin: String, message: String },

    /// No plugin with this ID is registered.
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PluginError {
    /// Whether the failure was raised by the routing layer rather than an operation.
    pub fn is_routing_error(&self) -> bool {
        matches!(self, PluginError::MethodNotRecognized { .. })
    }
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
