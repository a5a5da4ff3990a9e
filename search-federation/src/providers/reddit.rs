//! Reddit post search via the public JSON listing endpoint.
//!
//! No OAuth: the unauthenticated endpoint only needs a descriptive
//! User-Agent, which Reddit enforces.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::MAX_SNIPPET_CHARS;
use crate::deadline::Deadline;
use crate::error::{FederationError, ProviderError};
use crate::http;
use crate::provider::SearchProvider;
use crate::types::SearchResult;

/// Registry id of this provider.
pub const REDDIT: &str = "reddit";

/// Site root used to build post permalinks.
const PERMALINK_ROOT: &str = "https://www.reddit.com";

/// Reddit settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Site root serving `search.json`.
    pub base_url: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            user_agent: "FederatedSearchEngine/1.0".to_owned(),
            base_url: PERMALINK_ROOT.to_owned(),
        }
    }
}

/// Reddit search provider.
pub struct RedditProvider {
    client: reqwest::Client,
    search_url: Url,
}

impl RedditProvider {
    /// Create a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Config`] for an invalid base URL or
    /// User-Agent.
    pub fn new(config: &RedditConfig) -> Result<Self, FederationError> {
        Ok(Self {
            client: http::build_client(&config.user_agent)?,
            search_url: http::endpoint(&config.base_url, "search.json")?,
        })
    }
}

#[async_trait]
impl SearchProvider for RedditProvider {
    fn name(&self) -> &str {
        REDDIT
    }

    async fn fetch(
        &self,
        deadline: &Deadline,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        tracing::trace!(query, "Reddit search");

        let limit = max_results.to_string();
        let request = self
            .client
            .get(self.search_url.clone())
            .query(&[("q", query), ("limit", limit.as_str()), ("sort", "relevance")])
            .header("Accept", "application/json");

        let body = http::fetch_body(request, deadline).await?;
        tracing::trace!(bytes = body.len(), "Reddit response received");
        parse_reddit_response(&body, max_results)
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    permalink: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    created_utc: Option<f64>,
    #[serde(default)]
    upvote_ratio: f64,
}

/// Decode a search listing payload.
pub(crate) fn parse_reddit_response(body: &str, max_results: usize) -> Result<Vec<SearchResult>, ProviderError> {
    let listing: Listing =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(format!("Reddit payload: {e}")))?;

    let results: Vec<SearchResult> = listing
        .data
        .children
        .into_iter()
        .take(max_results)
        .map(|child| {
            let post = child.data;
            let snippet = if post.selftext.is_empty() {
                post.title.as_str()
            } else {
                post.selftext.as_str()
            };
            let snippet = http::truncate(snippet, MAX_SNIPPET_CHARS);

            let mut result = SearchResult::new(
                REDDIT,
                post.title.clone(),
                snippet,
                format!("{PERMALINK_ROOT}{}", post.permalink),
            )
            .with_meta("score", post.score)
            .with_meta("num_comments", post.num_comments)
            .with_meta("subreddit", &post.subreddit)
            .with_meta("author", &post.author)
            .with_meta("upvote_ratio", format!("{:.2}", post.upvote_ratio));
            if let Some(created) = post.created_utc {
                result.timestamp = created as i64;
            }
            result
        })
        .collect();

    tracing::debug!(count = results.len(), "Reddit results parsed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": null,
            "children": [
                {
                    "kind": "t3",
                    "data": {
                        "id": "abc",
                        "title": "Why is my async code slow?",
                        "selftext": "I spawn a task per request and...",
                        "author": "ferris",
                        "subreddit": "rust",
                        "score": 120,
                        "num_comments": 37,
                        "created_utc": 1700000000.0,
                        "permalink": "/r/rust/comments/abc/why_is_my_async_code_slow/",
                        "url": "https://www.reddit.com/r/rust/comments/abc/",
                        "upvote_ratio": 0.974
                    }
                },
                {
                    "kind": "t3",
                    "data": {
                        "title": "Link post",
                        "selftext": "",
                        "permalink": "/r/rust/comments/def/link_post/"
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn parses_posts() {
        let results = parse_reddit_response(PAYLOAD, 10).expect("valid payload");
        assert_eq!(results.len(), 2);

        let post = &results[0];
        assert_eq!(post.provider, "reddit");
        assert_eq!(post.title, "Why is my async code slow?");
        assert_eq!(post.snippet, "I spawn a task per request and...");
        assert_eq!(
            post.url,
            "https://www.reddit.com/r/rust/comments/abc/why_is_my_async_code_slow/"
        );
        assert_eq!(post.timestamp, 1_700_000_000);
        assert_eq!(post.metadata["score"], "120");
        assert_eq!(post.metadata["num_comments"], "37");
        assert_eq!(post.metadata["subreddit"], "rust");
        assert_eq!(post.metadata["author"], "ferris");
        assert_eq!(post.metadata["upvote_ratio"], "0.97");
    }

    #[test]
    fn empty_selftext_falls_back_to_title() {
        let results = parse_reddit_response(PAYLOAD, 10).expect("valid payload");
        assert_eq!(results[1].snippet, "Link post");
        assert_eq!(results[1].metadata["upvote_ratio"], "0.00");
    }

    #[test]
    fn respects_max_results() {
        let results = parse_reddit_response(PAYLOAD, 1).expect("valid payload");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn missing_data_is_decode_error() {
        let err = parse_reddit_response(r#"{"kind":"Listing"}"#, 10).unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[test]
    fn default_config_uses_public_site() {
        let provider = RedditProvider::new(&RedditConfig::default()).expect("valid");
        assert_eq!(provider.search_url.as_str(), "https://www.reddit.com/search.json");
        assert_eq!(provider.name(), "reddit");
    }
}
