//! # provider-bitbucket
//!
//! Bitbucket provider for repoforge.
//!
//! [`BitbucketExplorer`] lists the repositories of a Bitbucket team. It loads
//! `username`, `password` and `team_id` from the host's settings provider,
//! binds a [`RepositoryClient`] built from them, and exposes a single routed
//! operation:
//!
//! | method | verb | result |
//! |--------|------|--------|
//! | `listRepositories` | `GET` | [`RepositoryListResult`] |
//!
//! Remote failures are reported as [`PluginError::RemoteOperation`]; the
//! instance stays usable afterwards.

pub mod client;
pub mod credentials;

pub use client::{
    client_factory_with_base_url, default_client_factory, BitbucketClient, ClientError,
    ClientFactory, ClientResult, RepositoryClient,
};
pub use credentials::BitbucketCredentials;

use async_trait::async_trait;
use futures::future::BoxFuture;
use repoforge_plugin_api::prelude::*;
use std::sync::Arc;

/// Registry key of the plugin.
pub const PLUGIN_ID: &str = "bitbucket-explorer";

/// Name used in diagnostics.
pub const PLUGIN_NAME: &str = "BitbucketExplorer";

// ============================================================================
// Exposed operations
// ============================================================================

/// Operations reachable through [`Plugin::route_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitbucketMethod {
    ListRepositories,
}

impl PluginMethod for BitbucketMethod {
    const ALL: &'static [Self] = &[BitbucketMethod::ListRepositories];

    fn as_str(&self) -> &'static str {
        match self {
            BitbucketMethod::ListRepositories => "listRepositories",
        }
    }

    fn http_verb(&self) -> HttpVerb {
        match self {
            BitbucketMethod::ListRepositories => HttpVerb::Get,
        }
    }
}

fn list_repositories_handler<'a>(
    plugin: &'a BitbucketExplorer,
    query_params: QueryParams,
    body: RequestPayload,
) -> BoxFuture<'a, Result<serde_json::Value>> {
    Box::pin(async move {
        let result = plugin.list_repositories(query_params, body).await?;
        Ok(serde_json::to_value(result)?)
    })
}

// ============================================================================
// Bitbucket Explorer
// ============================================================================

/// Repository explorer for a Bitbucket team.
pub struct BitbucketExplorer {
    metadata: PluginMetadata,
    settings: SettingsLoader,
    logger: Arc<dyn PluginLogger>,
    client_factory: ClientFactory,
    router: Router<BitbucketExplorer, BitbucketMethod>,
    state: PluginState<BitbucketCredentials, dyn RepositoryClient>,
}

impl BitbucketExplorer {
    /// Create an uninitialized explorer that will talk to Bitbucket Cloud.
    pub fn new(settings: Arc<dyn SettingsProvider>, logger: Arc<dyn PluginLogger>) -> Self {
        let router = Router::new(PLUGIN_NAME, Arc::clone(&logger))
            .with_handler(BitbucketMethod::ListRepositories, list_repositories_handler);

        Self {
            metadata: PluginMetadata {
                id: PLUGIN_ID.to_string(),
                name: PLUGIN_NAME.to_string(),
                scope: PluginScope::Service,
                plugin_type: PluginType::Repositories,
            },
            settings: SettingsLoader::new(settings, PLUGIN_NAME),
            logger,
            client_factory: default_client_factory(),
            router,
            state: PluginState::Uninitialized,
        }
    }

    /// Replace the factory used by [`Plugin::init`] to build the remote client.
    pub fn with_client_factory(mut self, factory: ClientFactory) -> Self {
        self.client_factory = factory;
        self
    }

    /// Credentials loaded by the last successful `init`.
    pub fn credentials(&self) -> Option<&BitbucketCredentials> {
        self.state.credentials()
    }

    /// List the team's repositories.
    ///
    /// `body` is forwarded to the remote client untouched. A client failure is
    /// logged and reported as [`PluginError::RemoteOperation`], keeping only
    /// the client's message.
    pub async fn list_repositories(
        &self,
        _query_params: QueryParams,
        body: RequestPayload,
    ) -> Result<RepositoryListResult> {
        let operation = BitbucketMethod::ListRepositories.as_str();
        let client = self.state.client(PLUGIN_NAME)?;

        match client.get_list(&body).await {
            Ok(result) => Ok(result),
            Err(err) => {
                self.logger.log(
                    LogLevel::Error,
                    &format!("{PLUGIN_NAME} {operation} failed: {err}"),
                );
                Err(PluginError::RemoteOperation {
                    plugin: PLUGIN_NAME.to_string(),
                    operation,
                    message: err.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl Plugin for BitbucketExplorer {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn operations(&self) -> Vec<Operation> {
        self.router.operations()
    }

    async fn init(&mut self, org_id: &str, setting_id: &str) -> Result<()> {
        self.logger
            .log(LogLevel::Info, &format!("Initializing {PLUGIN_NAME} plugin"));

        let credentials: BitbucketCredentials = match self.settings.load(org_id, setting_id).await
        {
            Ok(credentials) => credentials,
            Err(err) => {
                self.logger.log(LogLevel::Error, &err.to_string());
                return Err(err);
            }
        };

        let client = (self.client_factory)(&credentials).map_err(|err| {
            let err = PluginError::ClientConstruction {
                plugin: PLUGIN_NAME.to_string(),
                message: err.to_string(),
            };
            self.logger.log(LogLevel::Error, &err.to_string());
            err
        })?;

        self.logger.log(
            LogLevel::Info,
            &format!("{PLUGIN_NAME} ready for team {}", credentials.team_id),
        );
        self.state = PluginState::Ready {
            credentials,
            client,
        };
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    async fn route_request(&self, request: RequestDescriptor) -> Result<serde_json::Value> {
        self.router.route(self, request).await
    }
}

// ============================================================================
// Tests
// ============================================================================
