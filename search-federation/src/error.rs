//! Error types for the search-federation crate.
//!
//! Two families live here. [`FederationError`] is what a caller of the
//! orchestrator can see: request validation and internal faults. Individual
//! provider failures use [`ProviderError`] and are always recovered into an
//! [`Outcome`](crate::types::Outcome); they never escape a search run.

/// Errors surfaced to the caller of a federated search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FederationError {
    /// The request failed validation before any provider was invoked.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request named a provider that is not registered.
    #[error("invalid platform: {provider} (valid: {valid})")]
    UnknownProvider {
        /// The id the caller asked for.
        provider: String,
        /// Comma-separated list of registered ids.
        valid: String,
    },

    /// The provider registry is unusable (for example, empty).
    #[error("registry error: {0}")]
    Registry(String),

    /// Invalid federation or provider configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl FederationError {
    /// Whether this error was caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::UnknownProvider { .. }
        )
    }
}

/// Failure kinds reported by a [`SearchProvider`](crate::provider::SearchProvider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Network-level failure talking to the upstream platform.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider gave up because its deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The upstream replied with a non-success HTTP status.
    #[error("upstream returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// The upstream payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Convenience type alias for search-federation results.
pub type Result<T> = std::result::Result<T, FederationError>;
