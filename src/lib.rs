//! # search-proxy
//!
//! HTTP front end for [`search_federation`]: validates search requests,
//! fans each one out to the configured platforms under a strict latency
//! budget, and returns whatever arrived in time.
//!
//! - [`config`] layers defaults, a TOML file and environment variables
//! - [`api`] holds the JSON wire types and request validation
//! - [`service`] runs a validated search and maps the outcome
//! - [`server`] serves it over axum with graceful shutdown
//! - [`logging`] installs the tracing subscriber

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod service;

pub use config::ProxyConfig;
pub use error::{ProxyError, Result};
pub use server::SearchServer;
pub use service::SearchService;

use search_federation::Orchestrator;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Build the registry and orchestrator described by `config` and wrap them
/// in a [`SearchService`] bound to `shutdown`.
///
/// # Errors
///
/// Returns an error if a provider cannot be constructed or the federation
/// settings are invalid.
pub fn build_service(config: &ProxyConfig, shutdown: CancellationToken) -> Result<SearchService> {
    let registry = search_federation::build_registry(&config.providers)?;
    let orchestrator = Orchestrator::new(Arc::new(registry), config.federation.clone())?;
    Ok(SearchService::new(Arc::new(orchestrator), shutdown))
}
