//! Request, response and settings types exchanged between a host and its plugins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Settings
// ============================================================================

/// A single named configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    pub value: String,
}

impl ConfigEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Configuration set returned by a settings provider.
///
/// Entry order is preserved; lookups take the first entry with a matching name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSettings {
    #[serde(default)]
    pub configuration: Vec<ConfigEntry>,
}

impl PluginSettings {
    pub fn new(configuration: Vec<ConfigEntry>) -> Self {
        Self { configuration }
    }

    /// First entry named `name`.
    pub fn find(&self, name: &str) -> Option<&ConfigEntry> {
        self.configuration.iter().find(|entry| entry.name == name)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// HTTP verb a request was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            "PUT" => Ok(HttpVerb::Put),
            "PATCH" => Ok(HttpVerb::Patch),
            "DELETE" => Ok(HttpVerb::Delete),
            other => Err(format!("unknown HTTP verb \"{other}\"")),
        }
    }
}

/// Free-form query parameters forwarded to an operation.
pub type QueryParams = serde_json::Map<String, serde_json::Value>;

/// Request body forwarded untouched to the remote client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayload {
    /// Page size requested from the hosting API.
    #[serde(
        rename = "pagelen",
        alias = "pageLength",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub page_length: Option<u32>,

    /// Partial-response field selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

/// A generic inbound request, consumed once by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    #[serde(alias = "pluginMethod")]
    pub method_name: String,
    pub http_verb: HttpVerb,
    #[serde(default)]
    pub query_params: QueryParams,
    #[serde(default)]
    pub body: RequestPayload,
}

impl RequestDescriptor {
    pub fn new(method_name: impl Into<String>, http_verb: HttpVerb) -> Self {
        Self {
            method_name: method_name.into(),
            http_verb,
            query_params: QueryParams::new(),
            body: RequestPayload::default(),
        }
    }

    pub fn with_query_params(mut self, query_params: QueryParams) -> Self {
        self.query_params = query_params;
        self
    }

    pub fn with_body(mut self, body: RequestPayload) -> Self {
        self.body = body;
        self
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Summary of one repository as reported by a hosting provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub scm: String,
    pub website: String,
    pub name: String,
    pub uuid: String,
    pub slug: String,
}

/// Result of a repository listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryListResult {
    pub values: Vec<RepositorySummary>,
    pub ok: bool,
}
