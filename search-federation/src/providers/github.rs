//! GitHub repository search.
//!
//! Uses the REST search endpoint sorted by stars. A token is optional but
//! raises the rate limit from 60 to 5,000 requests per hour.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
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
pub const GITHUB: &str = "github";

/// GitHub API settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token sent as a bearer token.
    pub api_token: Option<String>,
    /// API root.
    pub base_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: "https://api.github.com".to_owned(),
        }
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// GitHub repository search provider.
pub struct GitHubProvider {
    client: reqwest::Client,
    search_url: Url,
    api_token: Option<String>,
}

impl GitHubProvider {
    /// Create a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Config`] for an invalid base URL.
    pub fn new(config: &GitHubConfig) -> Result<Self, FederationError> {
        Ok(Self {
            client: http::build_client(http::DEFAULT_USER_AGENT)?,
            search_url: http::endpoint(&config.base_url, "search/repositories")?,
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
        })
    }
}

#[async_trait]
impl SearchProvider for GitHubProvider {
    fn name(&self) -> &str {
        GITHUB
    }

    async fn fetch(
        &self,
        deadline: &Deadline,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        tracing::trace!(query, "GitHub search");

        let per_page = max_results.to_string();
        let mut request = self
            .client
            .get(self.search_url.clone())
            .query(&[
                ("q", query),
                ("per_page", per_page.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
            ])
            .header("Accept", "application/vnd.github+json");

        if let Some(token) = &self.api_token {
            request = request
                .bearer_auth(token)
                .header("X-GitHub-Api-Version", "2022-11-28");
        }

        let body = http::fetch_body(request, deadline).await?;
        tracing::trace!(bytes = body.len(), "GitHub response received");
        parse_github_response(&body, max_results)
    }
}

#[derive(Debug, Deserialize)]
struct RepositorySearch {
    #[serde(default)]
    items: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// Decode a repository search payload.
///
/// Extracted as a separate function for testability with canned JSON.
pub(crate) fn parse_github_response(body: &str, max_results: usize) -> Result<Vec<SearchResult>, ProviderError> {
    let search: RepositorySearch =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(format!("GitHub payload: {e}")))?;

    let results: Vec<SearchResult> = search
        .items
        .into_iter()
        .take(max_results)
        .map(|repo| {
            let description = repo.description.unwrap_or_default();
            let mut result = SearchResult::new(
                GITHUB,
                repo.full_name,
                http::truncate(&description, MAX_SNIPPET_CHARS),
                repo.html_url,
            )
            .with_meta("stars", repo.stargazers_count)
            .with_meta("forks", repo.forks_count)
            .with_meta("language", repo.language.unwrap_or_default())
            .with_meta("open_issues", repo.open_issues_count);
            if let Some(created) = repo.created_at {
                result.timestamp = created.timestamp();
            }
            result
        })
        .collect();

    tracing::debug!(count = results.len(), "GitHub results parsed");
    Ok(results)
}
