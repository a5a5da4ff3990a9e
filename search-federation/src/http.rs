//! Shared HTTP plumbing for the upstream platform providers.
//!
//! Provides a configured [`reqwest::Client`], base-URL joining, and the
//! mapping from transport failures to [`ProviderError`].

use crate::deadline::Deadline;
use crate::error::{FederationError, ProviderError};
use std::time::Duration;
use url::Url;

/// User-Agent sent when a provider has no platform-specific one.
pub const DEFAULT_USER_AGENT: &str = concat!("search-federation/", env!("CARGO_PKG_VERSION"));

/// Hard ceiling for any single upstream request. Per-request deadlines are
/// normally much tighter.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest body excerpt kept in a status error.
const ERROR_BODY_CHARS: usize = 200;

/// Build a [`reqwest::Client`] for upstream API calls.
///
/// # Errors
///
/// Returns [`FederationError::Config`] if the client cannot be constructed.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, FederationError> {
    reqwest::Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| FederationError::Config(format!("failed to build HTTP client: {e}")))
}

/// Join `path` onto `base`, treating `base` as a directory.
///
/// `https://api.stackexchange.com/2.3` + `search/advanced` gives
/// `https://api.stackexchange.com/2.3/search/advanced`.
///
/// # Errors
///
/// Returns [`FederationError::Config`] if `base` is not an absolute URL.
pub fn endpoint(base: &str, path: &str) -> Result<Url, FederationError> {
    let mut base = Url::parse(base).map_err(|e| FederationError::Config(format!("invalid base URL {base:?}: {e}")))?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| FederationError::Config(format!("invalid endpoint path {path:?}: {e}")))
}

/// Send `request` bounded by `deadline` and return the body of a 2xx reply.
pub(crate) async fn fetch_body(request: reqwest::RequestBuilder, deadline: &Deadline) -> Result<String, ProviderError> {
    if deadline.is_elapsed() {
        return Err(ProviderError::DeadlineExceeded);
    }

    let response = request
        .timeout(deadline.remaining())
        .send()
        .await
        .map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: truncate(&body, ERROR_BODY_CHARS),
        });
    }

    response.text().await.map_err(request_error)
}

fn request_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::DeadlineExceeded
    } else {
        ProviderError::Transport(err.to_string())
    }
}

/// Cut `text` to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let keep: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", keep.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_succeeds() {
        assert!(build_client(DEFAULT_USER_AGENT).is_ok());
    }

    #[test]
    fn default_user_agent_names_crate() {
        assert!(DEFAULT_USER_AGENT.starts_with("search-federation/"));
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = endpoint("https://api.stackexchange.com/2.3", "search/advanced").expect("valid");
        assert_eq!(url.as_str(), "https://api.stackexchange.com/2.3/search/advanced");
    }

    #[test]
    fn endpoint_with_bare_host() {
        let url = endpoint("https://api.github.com", "/search/repositories").expect("valid");
        assert_eq!(url.as_str(), "https://api.github.com/search/repositories");
    }

    #[test]
    fn endpoint_with_trailing_slash() {
        let url = endpoint("http://127.0.0.1:8080/", "search.json").expect("valid");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/search.json");
    }

    #[test]
    fn endpoint_rejects_relative_base() {
        let err = endpoint("api.github.com", "search").unwrap_err();
        assert!(err.to_string().contains("invalid base URL"));
    }

    #[test]
    fn truncate_short_text_untouched() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn truncate_long_text_adds_ellipsis() {
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hello world", 9), "hello...");
        assert_eq!(truncate("hello world", 10), "hello w...");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let text = "ééééééééé";
        let cut = truncate(text, 5);
        assert_eq!(cut, "éé...");
    }
}
