//! JSON wire types for the search API and their mapping to the engine's
//! domain types.

use search_federation::{FederationError, ProviderRegistry, Query, SearchResponse, SearchResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// `POST /v1/search` request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query.
    #[serde(default)]
    pub query: String,
    /// Per-platform result cap; `0` means the configured default.
    #[serde(default)]
    pub max_results: i64,
    /// Platforms to query; empty means all.
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl SearchRequest {
    /// Validate the request against `registry` and build a [`Query`].
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// empty query, query length, negative cap, cap ceiling, unknown
    /// platform.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::InvalidArgument`] or
    /// [`FederationError::UnknownProvider`].
    pub fn validate(&self, registry: &ProviderRegistry) -> Result<Query, FederationError> {
        Query::validate_text(&self.query)?;
        if self.max_results < 0 {
            return Err(FederationError::InvalidArgument(
                "max_results cannot be negative".into(),
            ));
        }
        let cap = u32::try_from(self.max_results).unwrap_or(u32::MAX);
        Query::validate_cap(cap)?;
        registry.check_known(self.platforms.iter().map(String::as_str))?;
        Query::new(self.query.as_str(), cap, self.platforms.iter().cloned())
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// One result on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Provider id that produced the result.
    pub platform: String,
    /// Result title.
    pub title: String,
    /// Short excerpt.
    pub snippet: String,
    /// Link to the item.
    pub url: String,
    /// Unix seconds.
    pub timestamp: i64,
    /// Provider-specific fields.
    pub metadata: BTreeMap<String, String>,
}

impl From<SearchResult> for ResultItem {
    fn from(result: SearchResult) -> Self {
        Self {
            platform: result.provider,
            title: result.title,
            snippet: result.snippet,
            url: result.url,
            timestamp: result.timestamp,
            metadata: result.metadata,
        }
    }
}

/// Timing and dispatch details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyMetadata {
    /// Wall time of the fan-out in milliseconds.
    pub response_time_ms: u64,
    /// Number of providers dispatched.
    pub platforms_queried: usize,
}

/// `POST /v1/search` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReply {
    /// Merged results in arrival order.
    pub results: Vec<ResultItem>,
    /// Length of `results`.
    pub total_count: usize,
    /// Providers that answered in time.
    pub platforms_success: Vec<String>,
    /// Providers cut off by a deadline.
    pub platforms_timeout: Vec<String>,
    /// Providers that failed.
    pub platforms_error: Vec<String>,
    /// Timing details.
    pub metadata: ReplyMetadata,
}

impl From<SearchResponse> for SearchReply {
    fn from(response: SearchResponse) -> Self {
        let total_count = response.total_count();
        let response_time_ms = u64::try_from(response.total_elapsed.as_millis()).unwrap_or(u64::MAX);
        Self {
            results: response.results.into_iter().map(ResultItem::from).collect(),
            total_count,
            platforms_success: response.success_providers.into_iter().collect(),
            platforms_timeout: response.timeout_providers.into_iter().collect(),
            platforms_error: response.error_providers.into_iter().collect(),
            metadata: ReplyMetadata {
                response_time_ms,
                platforms_queried: response.providers_queried,
            },
        }
    }
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReply {
    /// Always `"healthy"` while the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Unix seconds.
    pub timestamp: i64,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Error type tag for a rejected request.
pub const INVALID_ARGUMENT: &str = "invalid_argument";

/// Error type tag for a server-side fault.
pub const INTERNAL: &str = "internal";

/// Error response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// The error details.
    pub error: ErrorBody,
}

/// Error details within an [`ErrorReply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub message: String,
    /// `"invalid_argument"` or `"internal"`.
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ErrorReply {
    /// Build the wire error for a failed search.
    pub fn from_federation(err: &FederationError) -> Self {
        let (message, error_type) = match err {
            FederationError::InvalidArgument(message) => (message.clone(), INVALID_ARGUMENT),
            FederationError::UnknownProvider { .. } => (err.to_string(), INVALID_ARGUMENT),
            other => (format!("search failed: {other}"), INTERNAL),
        };
        Self {
            error: ErrorBody {
                message,
                error_type: error_type.to_owned(),
            },
        }
    }
}
