//! Remote client capability and the Bitbucket Cloud implementation.
//!
//! The plugin only depends on [`RepositoryClient`]; [`BitbucketClient`] is the
//! default implementation, built from the loaded credentials by a
//! [`ClientFactory`]. It issues one `GET /repositories/{team}` per call: no
//! pagination, no retries.

use crate::credentials::BitbucketCredentials;
use async_trait::async_trait;
use repoforge_plugin_api::types::{RepositoryListResult, RepositorySummary, RequestPayload};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Bitbucket Cloud REST API root.
pub const DEFAULT_BASE_URL: &str = "https://api.bitbucket.org/2.0";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bitbucket API error: {0}")]
    Api(String),

    #[error("Authentication failed")]
    AuthRequired,

    #[error("Rate limited")]
    RateLimited,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

// ============================================================================
// Capability
// ============================================================================

/// Lists repositories on the hosting provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Fetch one listing, forwarding `payload` as query parameters.
    async fn get_list(&self, payload: &RequestPayload) -> ClientResult<RepositoryListResult>;
}

/// Builds the remote client once credentials are known.
pub type ClientFactory =
    Arc<dyn Fn(&BitbucketCredentials) -> ClientResult<Arc<dyn RepositoryClient>> + Send + Sync>;

/// Factory producing a [`BitbucketClient`] against [`DEFAULT_BASE_URL`].
pub fn default_client_factory() -> ClientFactory {
    Arc::new(
        |credentials: &BitbucketCredentials| -> ClientResult<Arc<dyn RepositoryClient>> {
            let client = BitbucketClient::new(credentials.clone())?;
            Ok(Arc::new(client))
        },
    )
}

/// Factory producing a [`BitbucketClient`] against `base_url`.
pub fn client_factory_with_base_url(base_url: impl Into<String>) -> ClientFactory {
    let base_url = base_url.into();
    Arc::new(
        move |credentials: &BitbucketCredentials| -> ClientResult<Arc<dyn RepositoryClient>> {
            let client = BitbucketClient::new(credentials.clone())?.with_base_url(base_url.clone());
            Ok(Arc::new(client))
        },
    )
}

// ============================================================================
// Bitbucket API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct RepositoryPage {
    #[serde(default)]
    values: Vec<BitbucketRepository>,
}

#[derive(Debug, Deserialize)]
struct BitbucketRepository {
    scm: Option<String>,
    website: Option<String>,
    name: Option<String>,
    uuid: Option<String>,
    slug: Option<String>,
}

impl From<BitbucketRepository> for RepositorySummary {
    fn from(repo: BitbucketRepository) -> Self {
        Self {
            scm: repo.scm.unwrap_or_default(),
            website: repo.website.unwrap_or_default(),
            name: repo.name.unwrap_or_default(),
            uuid: repo.uuid.unwrap_or_default(),
            slug: repo.slug.unwrap_or_default(),
        }
    }
}

/// Decode one page of `GET /repositories/{team}`.
fn decode_page(body: &str) -> ClientResult<RepositoryListResult> {
    let page: RepositoryPage =
        serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))?;

    Ok(RepositoryListResult {
        values: page.values.into_iter().map(RepositorySummary::from).collect(),
        ok: true,
    })
}

// ============================================================================
// Bitbucket Client
// ============================================================================

/// Bitbucket Cloud client authenticated with HTTP basic auth.
pub struct BitbucketClient {
    credentials: BitbucketCredentials,
    base_url: String,
    client: Client,
}

impl BitbucketClient {
    /// Create a client for the team named in `credentials`.
    pub fn new(credentials: BitbucketCredentials) -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("repoforge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Point the client at another API root (self-hosted proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/repositories/{team_id}`, with the team ID percent-encoded.
    pub fn repositories_url(&self) -> ClientResult<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("repositories")
            .push(&self.credentials.team_id);
        Ok(url)
    }
}

#[async_trait]
impl RepositoryClient for BitbucketClient {
    async fn get_list(&self, payload: &RequestPayload) -> ClientResult<RepositoryListResult> {
        let url = self.repositories_url()?;
        debug!("List \"{}\" repos from {}", self.credentials.team_id, url);

        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .query(payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::AuthRequired);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let body = response.text().await?;
        decode_page(&body)
    }
}

// ============================================================================
// Tests
// ============================================================================
