//! # search-federation
//!
//! One query, many independent upstream search platforms, one time-bounded
//! response.
//!
//! ## Design
//!
//! - Each platform is a [`SearchProvider`] registered by id in a
//!   [`ProviderRegistry`]
//! - The [`Orchestrator`] spawns one task per provider under a nested
//!   [`Deadline`] and collects outcomes through a bounded channel
//! - The caller never waits longer than the global budget; slow providers
//!   are cancelled and recorded as timeouts
//! - Graceful degradation: provider failures are classified per provider
//!   (success / timeout / error) and never fail the whole search
//! - Results keep arrival order; there is no cross-provider ranking,
//!   deduplication, or caching
//!
//! ## Security
//!
//! - Search queries are logged only at trace level
//! - API credentials are redacted from `Debug` output

pub mod config;
pub mod deadline;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod types;

pub use config::FederationConfig;
pub use deadline::Deadline;
pub use error::{FederationError, ProviderError, Result};
pub use orchestrator::Orchestrator;
pub use provider::SearchProvider;
pub use providers::{ProvidersConfig, build_registry};
pub use registry::ProviderRegistry;
pub use types::{Failure, Outcome, Query, SearchResponse, SearchResult};

/// Run one federated search with a fresh cancellation scope.
///
/// Convenience wrapper around [`Orchestrator::run`] for callers that have
/// no deadline of their own: the global budget from the orchestrator's
/// configuration is the only bound.
///
/// # Errors
///
/// Same as [`Orchestrator::run`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> search_federation::Result<()> {
/// use std::sync::Arc;
/// use search_federation::{FederationConfig, Orchestrator, ProvidersConfig, Query};
///
/// let registry = search_federation::build_registry(&ProvidersConfig::default())?;
/// let orchestrator = Orchestrator::new(Arc::new(registry), FederationConfig::default())?;
/// let query = Query::new("tokio select timeout", 5, ["github", "stackoverflow"])?;
/// let response = search_federation::search(&orchestrator, &query).await?;
/// for result in &response.results {
///     println!("[{}] {}: {}", result.provider, result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(orchestrator: &Orchestrator, query: &Query) -> Result<SearchResponse> {
    let parent = Deadline::after(
        orchestrator.config().global_timeout(),
        tokio_util::sync::CancellationToken::new(),
    );
    orchestrator.run(&parent, query).await
}
