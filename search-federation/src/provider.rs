//! Trait definition for pluggable search providers.
//!
//! Each upstream platform (GitHub, Stack Overflow, Reddit, or a test double)
//! implements [`SearchProvider`] and is registered under its id in a
//! [`ProviderRegistry`](crate::registry::ProviderRegistry).

use crate::deadline::Deadline;
use crate::error::ProviderError;
use crate::types::SearchResult;
use async_trait::async_trait;

/// A pluggable upstream search source.
///
/// Implementors handle their own request construction and response
/// decoding. They should bound their I/O by [`Deadline::remaining`], but the
/// orchestrator enforces the deadline either way and drops the future once
/// it fires.
///
/// All implementations must be `Send + Sync`; one instance serves every
/// concurrent request.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// The provider id this instance is registered under.
    fn name(&self) -> &str;

    /// Run `query` against the upstream and return at most `max_results`
    /// normalized results.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure, deadline expiry,
    /// non-success status, or an undecodable payload.
    async fn fetch(
        &self,
        deadline: &Deadline,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ProviderError>;
}
