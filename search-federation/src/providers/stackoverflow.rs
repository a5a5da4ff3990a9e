//! Stack Overflow question search via the Stack Exchange API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use super::MAX_SNIPPET_CHARS;
use crate::deadline::Deadline;
use crate::error::{FederationError, ProviderError};
use crate::http;
use crate::provider::SearchProvider;
use crate::types::SearchResult;

/// Registry id of this provider.
pub const STACKOVERFLOW: &str = "stackoverflow";

/// Stack Exchange API settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackOverflowConfig {
    /// Application key; raises the daily quota.
    pub api_key: Option<String>,
    /// API root, including the version segment.
    pub base_url: String,
}

impl Default for StackOverflowConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.stackexchange.com/2.3".to_owned(),
        }
    }
}

impl fmt::Debug for StackOverflowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackOverflowConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Stack Overflow search provider.
pub struct StackOverflowProvider {
    client: reqwest::Client,
    search_url: Url,
    api_key: Option<String>,
}

impl StackOverflowProvider {
    /// Create a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Config`] for an invalid base URL.
    pub fn new(config: &StackOverflowConfig) -> Result<Self, FederationError> {
        Ok(Self {
            client: http::build_client(http::DEFAULT_USER_AGENT)?,
            search_url: http::endpoint(&config.base_url, "search/advanced")?,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }
}

#[async_trait]
impl SearchProvider for StackOverflowProvider {
    fn name(&self) -> &str {
        STACKOVERFLOW
    }

    async fn fetch(
        &self,
        deadline: &Deadline,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        tracing::trace!(query, "Stack Overflow search");

        let pagesize = max_results.to_string();
        let mut params = vec![
            ("q", query),
            ("pagesize", pagesize.as_str()),
            ("order", "desc"),
            ("sort", "relevance"),
            ("site", "stackoverflow"),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.as_str()));
        }

        let request = self
            .client
            .get(self.search_url.clone())
            .query(&params)
            .header("Accept", "application/json");

        let body = http::fetch_body(request, deadline).await?;
        tracing::trace!(bytes = body.len(), "Stack Overflow response received");
        parse_stackoverflow_response(&body, max_results)
    }
}

#[derive(Debug, Deserialize)]
struct QuestionSearch {
    #[serde(default)]
    items: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct Question {
    title: String,
    link: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    answer_count: u64,
    #[serde(default)]
    view_count: u64,
    #[serde(default)]
    is_answered: bool,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    creation_date: Option<i64>,
}

/// Decode a question search payload.
pub(crate) fn parse_stackoverflow_response(
    body: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, ProviderError> {
    let search: QuestionSearch = serde_json::from_str(body)
        .map_err(|e| ProviderError::Decode(format!("Stack Exchange payload: {e}")))?;

    let results: Vec<SearchResult> = search
        .items
        .into_iter()
        .take(max_results)
        .map(|question| {
            let mut snippet = question.title.clone();
            if !question.tags.is_empty() {
                snippet.push_str(" | Tags: ");
                snippet.push_str(&question.tags.join(", "));
            }

            let mut result = SearchResult::new(
                STACKOVERFLOW,
                question.title,
                http::truncate(&snippet, MAX_SNIPPET_CHARS),
                question.link,
            )
            .with_meta("score", question.score)
            .with_meta("answer_count", question.answer_count)
            .with_meta("view_count", question.view_count)
            .with_meta("is_answered", question.is_answered)
            .with_meta("tags", question.tags.join(","));
            if let Some(created) = question.creation_date {
                result.timestamp = created;
            }
            result
        })
        .collect();

    tracing::debug!(count = results.len(), "Stack Overflow results parsed");
    Ok(results)
}
