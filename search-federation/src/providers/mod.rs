//! Upstream platform providers.
//!
//! Each module provides a struct implementing
//! [`SearchProvider`](crate::provider::SearchProvider) against one public
//! search API. [`build_registry`] wires all of them up from configuration.

pub mod github;
pub mod reddit;
pub mod stackoverflow;

pub use github::{GitHubConfig, GitHubProvider};
pub use reddit::{RedditConfig, RedditProvider};
pub use stackoverflow::{StackOverflowConfig, StackOverflowProvider};

use crate::error::FederationError;
use crate::registry::ProviderRegistry;
use serde::{Deserialize, Serialize};

/// Longest snippet a provider emits, in characters.
pub(crate) const MAX_SNIPPET_CHARS: usize = 500;

/// Per-platform provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// GitHub repository search.
    pub github: GitHubConfig,
    /// Stack Exchange question search.
    pub stackoverflow: StackOverflowConfig,
    /// Reddit post search.
    pub reddit: RedditConfig,
}

impl ProvidersConfig {
    /// Startup warnings for missing optional credentials.
    pub fn credential_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.github.api_token.as_deref().is_none_or(str::is_empty) {
            warnings.push("GITHUB_API_TOKEN not set; GitHub rate limit is 60 requests/hour");
        }
        if self.stackoverflow.api_key.as_deref().is_none_or(str::is_empty) {
            warnings.push("STACKOVERFLOW_API_KEY not set; Stack Exchange rate limit is 300 requests/day");
        }
        warnings
    }
}

/// Build a registry holding every built-in provider.
///
/// # Errors
///
/// Returns [`FederationError::Config`] if a base URL is invalid or an HTTP
/// client cannot be built.
pub fn build_registry(config: &ProvidersConfig) -> Result<ProviderRegistry, FederationError> {
    let mut registry = ProviderRegistry::new();
    registry.register(GitHubProvider::new(&config.github)?);
    registry.register(StackOverflowProvider::new(&config.stackoverflow)?);
    registry.register(RedditProvider::new(&config.reddit)?);
    tracing::debug!(providers = ?registry, "provider registry built");
    Ok(registry)
}
