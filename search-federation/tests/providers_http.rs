//! HTTP-level tests for the built-in providers against a local mock server.

use std::sync::Arc;
use std::time::Duration;

use search_federation::providers::{
    GitHubConfig, GitHubProvider, RedditConfig, RedditProvider, StackOverflowConfig, StackOverflowProvider,
};
use search_federation::{
    Deadline, FederationConfig, Orchestrator, ProviderError, ProvidersConfig, Query, SearchProvider,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn deadline(ms: u64) -> Deadline {
    Deadline::after(Duration::from_millis(ms), CancellationToken::new())
}

fn github_payload() -> serde_json::Value {
    serde_json::json!({
        "total_count": 1,
        "items": [{
            "full_name": "rust-lang/rust",
            "html_url": "https://github.com/rust-lang/rust",
            "description": "Empowering everyone to build reliable and efficient software.",
            "stargazers_count": 100000,
            "forks_count": 12000,
            "language": "Rust",
            "open_issues_count": 9000,
            "created_at": "2010-06-16T20:39:03Z"
        }]
    })
}

fn stackoverflow_payload() -> serde_json::Value {
    serde_json::json!({
        "items": [{
            "title": "What is a lifetime?",
            "link": "https://stackoverflow.com/questions/42",
            "score": 10,
            "answer_count": 2,
            "view_count": 500,
            "is_answered": true,
            "tags": ["rust", "lifetimes"],
            "creation_date": 1500000000
        }]
    })
}

fn reddit_payload() -> serde_json::Value {
    serde_json::json!({
        "kind": "Listing",
        "data": {
            "children": [{
                "kind": "t3",
                "data": {
                    "title": "Show r/rust: a federated search proxy",
                    "selftext": "",
                    "author": "crab",
                    "subreddit": "rust",
                    "score": 5,
                    "num_comments": 1,
                    "created_utc": 1710000000.0,
                    "permalink": "/r/rust/comments/xyz/show/",
                    "upvote_ratio": 1.0
                }
            }]
        }
    })
}

#[tokio::test]
async fn github_sends_query_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "borrow checker"))
        .and(query_param("per_page", "5"))
        .and(query_param("sort", "stars"))
        .and(query_param("order", "desc"))
        .and(header("authorization", "Bearer ghp_test"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(github_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GitHubProvider::new(&GitHubConfig {
        api_token: Some("ghp_test".into()),
        base_url: server.uri(),
    })
    .expect("valid config");

    let results = provider
        .fetch(&deadline(5_000), "borrow checker", 5)
        .await
        .expect("fetch succeeds");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "rust-lang/rust");
    assert_eq!(results[0].metadata["stars"], "100000");
}

#[tokio::test]
async fn stackoverflow_keeps_versioned_base_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2.3/search/advanced"))
        .and(query_param("q", "lifetime"))
        .and(query_param("pagesize", "10"))
        .and(query_param("site", "stackoverflow"))
        .and(query_param("key", "so-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stackoverflow_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = StackOverflowProvider::new(&StackOverflowConfig {
        api_key: Some("so-key".into()),
        base_url: format!("{}/2.3", server.uri()),
    })
    .expect("valid config");

    let results = provider
        .fetch(&deadline(5_000), "lifetime", 10)
        .await
        .expect("fetch succeeds");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].snippet, "What is a lifetime? | Tags: rust, lifetimes");
}

#[tokio::test]
async fn reddit_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "proxy"))
        .and(query_param("limit", "3"))
        .and(header("user-agent", "SearchProxyTest/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reddit_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = RedditProvider::new(&RedditConfig {
        user_agent: "SearchProxyTest/0.1".into(),
        base_url: server.uri(),
    })
    .expect("valid config");

    let results = provider.fetch(&deadline(5_000), "proxy", 3).await.expect("fetch succeeds");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].snippet, "Show r/rust: a federated search proxy");
    assert_eq!(results[0].url, "https://www.reddit.com/r/rust/comments/xyz/show/");
}

#[tokio::test]
async fn non_success_status_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API rate limit exceeded"))
        .mount(&server)
        .await;

    let provider = GitHubProvider::new(&GitHubConfig {
        api_token: None,
        base_url: server.uri(),
    })
    .expect("valid config");

    let err = provider.fetch(&deadline(5_000), "q", 5).await.unwrap_err();
    assert_eq!(
        err,
        ProviderError::Status {
            status: 403,
            body: "API rate limit exceeded".into(),
        }
    );
}

#[tokio::test]
async fn garbage_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let provider = RedditProvider::new(&RedditConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .expect("valid config");

    let err = provider.fetch(&deadline(5_000), "q", 5).await.unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)));
}

#[tokio::test]
async fn slow_upstream_hits_request_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(github_payload())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let provider = GitHubProvider::new(&GitHubConfig {
        api_token: None,
        base_url: server.uri(),
    })
    .expect("valid config");

    let err = provider.fetch(&deadline(150), "q", 5).await.unwrap_err();
    assert_eq!(err, ProviderError::DeadlineExceeded);
}

#[tokio::test]
async fn elapsed_deadline_short_circuits() {
    let provider = GitHubProvider::new(&GitHubConfig {
        api_token: None,
        base_url: "http://127.0.0.1:9".into(),
    })
    .expect("valid config");

    let err = provider.fetch(&deadline(0), "q", 5).await.unwrap_err();
    assert_eq!(err, ProviderError::DeadlineExceeded);
}

#[tokio::test]
async fn orchestrator_over_real_providers_partitions_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(github_payload()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2.3/search/advanced"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reddit_payload())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let providers = ProvidersConfig {
        github: GitHubConfig {
            api_token: None,
            base_url: server.uri(),
        },
        stackoverflow: StackOverflowConfig {
            api_key: None,
            base_url: format!("{}/2.3", server.uri()),
        },
        reddit: RedditConfig {
            base_url: server.uri(),
            ..Default::default()
        },
    };
    let registry = search_federation::build_registry(&providers).expect("valid providers");
    let orchestrator = Orchestrator::new(
        Arc::new(registry),
        FederationConfig {
            global_timeout_ms: 800,
            per_provider_timeout_ms: 400,
            default_result_cap: 10,
        },
    )
    .expect("valid config");

    let query = Query::new("rust", 0, Vec::<String>::new()).expect("valid query");
    let started = std::time::Instant::now();
    let response = search_federation::search(&orchestrator, &query)
        .await
        .expect("search never fails on provider errors");

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(response.providers_queried, 3);
    assert!(response.success_providers.contains("github"));
    assert!(response.error_providers.contains("stackoverflow"));
    assert!(response.timeout_providers.contains("reddit"));
    assert_eq!(response.total_count(), 1);
}
