//! Core types: queries, normalized results, per-provider outcomes and the
//! aggregated response.

use crate::error::FederationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Maximum query length, in characters.
pub const MAX_QUERY_CHARS: usize = 500;

/// Largest result cap a caller may request.
pub const MAX_RESULT_CAP: u32 = 100;

/// A single normalized result produced by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Id of the provider that produced this result.
    pub provider: String,
    /// Result title.
    pub title: String,
    /// Short text excerpt.
    pub snippet: String,
    /// Link to the result on the upstream platform.
    pub url: String,
    /// Creation time on the upstream platform, Unix seconds.
    pub timestamp: i64,
    /// Platform-specific extra fields (score, tags, ...).
    pub metadata: BTreeMap<String, String>,
}

impl SearchResult {
    /// Create a result stamped with the current time and no metadata.
    pub fn new(
        provider: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            title: title.into(),
            snippet: snippet.into(),
            url: url.into(),
            timestamp: unix_now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style metadata insertion.
    pub fn with_meta(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_owned(), value.to_string());
        self
    }
}

/// A validated search query.
///
/// Construct with [`Query::new`]; fields are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    result_cap: u32,
    providers: BTreeSet<String>,
}

impl Query {
    /// Validate and build a query.
    ///
    /// `result_cap` of 0 means "use the configured default". An empty
    /// provider set means "every registered provider". Provider ids are
    /// checked against the registry at the request boundary, not here.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::InvalidArgument`] if the text is empty,
    /// longer than [`MAX_QUERY_CHARS`], or the cap exceeds [`MAX_RESULT_CAP`].
    pub fn new<I, S>(text: impl Into<String>, result_cap: u32, providers: I) -> Result<Self, FederationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let text = text.into();
        Self::validate_text(&text)?;
        Self::validate_cap(result_cap)?;
        Ok(Self {
            text,
            result_cap,
            providers: providers.into_iter().map(Into::into).collect(),
        })
    }

    /// Check query text bounds.
    pub fn validate_text(text: &str) -> Result<(), FederationError> {
        if text.is_empty() {
            return Err(FederationError::InvalidArgument(
                "query cannot be empty".into(),
            ));
        }
        if text.chars().count() > MAX_QUERY_CHARS {
            return Err(FederationError::InvalidArgument(format!(
                "query too long (max {MAX_QUERY_CHARS} characters)"
            )));
        }
        Ok(())
    }

    /// Check the requested result cap.
    pub fn validate_cap(result_cap: u32) -> Result<(), FederationError> {
        if result_cap > MAX_RESULT_CAP {
            return Err(FederationError::InvalidArgument(format!(
                "max_results cannot exceed {MAX_RESULT_CAP}"
            )));
        }
        Ok(())
    }

    /// The query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Requested cap, 0 meaning "default".
    pub fn result_cap(&self) -> u32 {
        self.result_cap
    }

    /// Requested provider ids. Empty means all.
    pub fn providers(&self) -> &BTreeSet<String> {
        &self.providers
    }
}

/// Why a provider did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The provider's deadline fired before it completed.
    Timeout,
    /// Any other failure, with a human-readable detail.
    Error(String),
}

/// The result of one dispatched provider task.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Provider id.
    pub provider: String,
    /// Results in provider order; empty on failure.
    pub results: Vec<SearchResult>,
    /// `None` on success.
    pub failure: Option<Failure>,
    /// Time from task start to completion.
    pub elapsed: Duration,
}

impl Outcome {
    /// A successful outcome.
    pub fn success(provider: impl Into<String>, results: Vec<SearchResult>, elapsed: Duration) -> Self {
        Self {
            provider: provider.into(),
            results,
            failure: None,
            elapsed,
        }
    }

    /// An outcome whose deadline fired.
    pub fn timed_out(provider: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            provider: provider.into(),
            results: Vec::new(),
            failure: Some(Failure::Timeout),
            elapsed,
        }
    }

    /// An outcome that failed for any reason other than its deadline.
    pub fn errored(provider: impl Into<String>, detail: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            provider: provider.into(),
            results: Vec::new(),
            failure: Some(Failure::Error(detail.into())),
            elapsed,
        }
    }

    /// Whether the provider succeeded.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// The aggregated response to one federated search.
///
/// `results` keeps outcome arrival order. The three provider sets never
/// overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    /// Concatenated results of every successful provider.
    pub results: Vec<SearchResult>,
    /// Providers that returned results (possibly zero).
    pub success_providers: BTreeSet<String>,
    /// Providers whose deadline fired or that never reported.
    pub timeout_providers: BTreeSet<String>,
    /// Providers that failed for any other reason.
    pub error_providers: BTreeSet<String>,
    /// Wall-clock time since dispatch started.
    pub total_elapsed: Duration,
    /// Number of provider tasks dispatched.
    pub providers_queried: usize,
}

impl SearchResponse {
    /// Number of results returned.
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// True when at least one provider succeeded, even with zero results.
    ///
    /// Distinguishes "no results found" from "nothing succeeded".
    pub fn any_succeeded(&self) -> bool {
        !self.success_providers.is_empty()
    }
}

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_result_new_stamps_current_time() {
        let result = SearchResult::new("github", "rust-lang/rust", "Empowering everyone", "https://github.com/rust-lang/rust");
        assert_eq!(result.provider, "github");
        assert!(result.timestamp > 1_600_000_000);
        assert!(result.metadata.is_empty());
    }

    #[test]
    fn with_meta_inserts_stringified_values() {
        let result = SearchResult::new("reddit", "t", "s", "u")
            .with_meta("score", 42)
            .with_meta("author", "ferris");
        assert_eq!(result.metadata.get("score").map(String::as_str), Some("42"));
        assert_eq!(result.metadata.get("author").map(String::as_str), Some("ferris"));
    }

    #[test]
    fn query_accepts_valid_input() {
        let query = Query::new("tokio select", 10, ["github", "reddit"]).expect("valid");
        assert_eq!(query.text(), "tokio select");
        assert_eq!(query.result_cap(), 10);
        assert_eq!(query.providers().len(), 2);
    }

    #[test]
    fn query_collapses_duplicate_providers() {
        let query = Query::new("q", 0, ["github", "github"]).expect("valid");
        assert_eq!(query.providers().len(), 1);
    }

    #[test]
    fn query_rejects_empty_text() {
        let err = Query::new("", 0, Vec::<String>::new()).unwrap_err();
        assert!(err.to_string().contains("query cannot be empty"));
    }

    #[test]
    fn query_length_is_counted_in_characters() {
        let exactly = "é".repeat(MAX_QUERY_CHARS);
        assert!(Query::new(exactly, 0, Vec::<String>::new()).is_ok());

        let over = "a".repeat(MAX_QUERY_CHARS + 1);
        let err = Query::new(over, 0, Vec::<String>::new()).unwrap_err();
        assert!(err.to_string().contains("query too long"));
    }

    #[test]
    fn query_rejects_cap_above_limit() {
        assert!(Query::new("q", MAX_RESULT_CAP, Vec::<String>::new()).is_ok());
        let err = Query::new("q", MAX_RESULT_CAP + 1, Vec::<String>::new()).unwrap_err();
        assert!(err.to_string().contains("cannot exceed 100"));
    }

    #[test]
    fn outcome_constructors_classify() {
        let ok = Outcome::success("a", vec![], Duration::from_millis(5));
        assert!(ok.is_success());

        let slow = Outcome::timed_out("b", Duration::from_millis(400));
        assert_eq!(slow.failure, Some(Failure::Timeout));

        let bad = Outcome::errored("c", "boom", Duration::ZERO);
        assert_eq!(bad.failure, Some(Failure::Error("boom".into())));
        assert!(bad.results.is_empty());
    }

    #[test]
    fn response_distinguishes_empty_success_from_total_failure() {
        let mut response = SearchResponse {
            results: vec![],
            success_providers: BTreeSet::new(),
            timeout_providers: BTreeSet::from(["a".to_owned()]),
            error_providers: BTreeSet::new(),
            total_elapsed: Duration::ZERO,
            providers_queried: 1,
        };
        assert_eq!(response.total_count(), 0);
        assert!(!response.any_succeeded());

        response.timeout_providers.clear();
        response.success_providers.insert("a".into());
        assert!(response.any_succeeded());
    }

    #[test]
    fn search_result_serde_round_trip() {
        let result = SearchResult::new("stackoverflow", "How?", "How? | Tags: rust", "https://stackoverflow.com/q/1")
            .with_meta("is_answered", true);
        let json = serde_json::to_string(&result).expect("serialize");
        let decoded: SearchResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, result);
    }
}
