//! # repoforge-plugin-api
//!
//! Plugin contract for repoforge providers.
//!
//! A plugin wraps one hosting provider behind a uniform request interface:
//!
//! - [`settings`] fetches a plugin's configuration set and validates it against
//!   the plugin's declared schema
//! - [`router`] maps a [`RequestDescriptor`] to one of the plugin's enumerated
//!   operations
//! - [`plugin`] defines the [`Plugin`] trait and the tagged lifecycle state
//! - [`host`] carries the logging capability injected by the host
//! - [`registry`] is the host-side dispatcher over plugin instances

pub mod error;
pub mod host;
pub mod plugin;
pub mod registry;
pub mod router;
pub mod settings;
pub mod types;

pub use error::{PluginError, Result};
pub use host::{LogLevel, MemoryLogger, PluginLogger, TracingLogger};
pub use plugin::{Plugin, PluginMetadata, PluginScope, PluginState, PluginType};
pub use registry::{PluginInfo, PluginRegistry};
pub use router::{Handler, Operation, PluginMethod, Router};
pub use settings::{FromSettings, SettingDescriptor, SettingsLoader, SettingsProvider};
pub use types::{
    ConfigEntry, HttpVerb, PluginSettings, QueryParams, RepositoryListResult, RepositorySummary,
    RequestDescriptor, RequestPayload,
};

/// Re-exports for plugin implementations.
pub mod prelude {
    pub use crate::error::{PluginError, Result};
    pub use crate::host::{LogLevel, PluginLogger, TracingLogger};
    pub use crate::plugin::{Plugin, PluginMetadata, PluginScope, PluginState, PluginType};
    pub use crate::router::{Handler, Operation, PluginMethod, Router};
    pub use crate::settings::{
        FromSettings, ResolvedSettings, SettingDescriptor, SettingsLoader, SettingsProvider,
    };
    pub use crate::types::*;
}
