//! # repoforge-host
//!
//! Command-line host for repoforge plugins.
//!
//! Loads provider settings from `$XDG_CONFIG_HOME/repoforge/config.toml` (or
//! `--config`), initializes the requested plugin from one settings set and
//! routes a single request to it. The result is printed to stdout as JSON;
//! logs go to stderr.
//!
//! ## Running
//!
//! ```bash
//! # List the team's repositories
//! repoforge-host --org acme --setting bitbucket-main --body '{"pagelen": 10}'
//!
//! # Show registered plugins and their operations
//! repoforge-host --list-plugins
//!
//! # With debug logging
//! RUST_LOG=debug repoforge-host --org acme --setting bitbucket-main
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use repoforge_host::config::Config;
use repoforge_host::{build_registry, invoke, Invocation};
use repoforge_plugin_api::{HttpVerb, QueryParams, RequestDescriptor, RequestPayload};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "repoforge-host", version, about = "Route a request to a repoforge plugin")]
struct Args {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/repoforge/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Plugin to address
    #[arg(long, default_value = provider_bitbucket::PLUGIN_ID)]
    plugin: String,

    /// Organization owning the settings set
    #[arg(long, required_unless_present = "list_plugins")]
    org: Option<String>,

    /// Settings set ID
    #[arg(long, required_unless_present = "list_plugins")]
    setting: Option<String>,

    /// Operation name
    #[arg(long, default_value = "listRepositories")]
    method: String,

    /// HTTP verb attached to the request
    #[arg(long, default_value = "GET")]
    verb: HttpVerb,

    /// Query parameters as a JSON object
    #[arg(long)]
    query: Option<String>,

    /// Request body as a JSON object
    #[arg(long)]
    body: Option<String>,

    /// Print registered plugins and exit
    #[arg(long)]
    list_plugins: bool,
}

impl Args {
    fn request(&self) -> Result<RequestDescriptor> {
        let query_params: QueryParams = match &self.query {
            Some(raw) => serde_json::from_str(raw).context("--query must be a JSON object")?,
            None => QueryParams::new(),
        };
        let body: RequestPayload = match &self.body {
            Some(raw) => serde_json::from_str(raw).context("--body must be a JSON object")?,
            None => RequestPayload::default(),
        };

        Ok(RequestDescriptor::new(self.method.clone(), self.verb)
            .with_query_params(query_params)
            .with_body(body))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // An explicit config must load; the default one falls back to built-in defaults.
    let (config, fallback) = match &args.config {
        Some(path) => (Config::load(path)?, None),
        None => match Config::load_default() {
            Ok(cfg) => (cfg, None),
            Err(e) => (Config::default(), Some(e)),
        },
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.host.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting repoforge-host v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = fallback {
        warn!("Failed to load config, using defaults: {:#}", e);
    }

    info!("Loaded {} settings set(s)", config.settings.len());
    let mut registry = build_registry(&config);

    if args.list_plugins {
        println!("{}", serde_json::to_string_pretty(&registry.list_plugins())?);
        return Ok(());
    }

    let invocation = Invocation {
        plugin_id: args.plugin.clone(),
        org_id: args.org.clone().context("--org is required")?,
        setting_id: args.setting.clone().context("--setting is required")?,
        request: args.request()?,
    };

    let value = invoke(&mut registry, invocation).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
