// Structured API strategy.
// Lists a user's repositories through the REST endpoint and normalizes them.

use std::time::Duration;

use serde_json::Value;

use crate::error::{FolioError, Result};
use crate::fetch::{FetchFuture, RepoSource, with_timeout};

use super::client::GitHubClient;
use super::types::{ApiRepository, RepoSummary};

impl GitHubClient {
    /// Get the public repositories listed at `url`.
    ///
    /// Fails when the payload is not a JSON array. Array elements that do
    /// not look like repositories are skipped.
    pub async fn list_user_repos(&self, url: &str) -> Result<Vec<ApiRepository>> {
        let response = self.get(url).await?;
        let body: Value = response.json().await?;

        let Value::Array(entries) = body else {
            return Err(FolioError::Other(format!(
                "expected a repository list from {}",
                url
            )));
        };

        Ok(entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect())
    }
}

/// Most recently pushed first, at most `max_repos`. Every entry is kept;
/// a missing link is rendered as `#`.
pub fn normalize_repos(mut repos: Vec<ApiRepository>, max_repos: usize) -> Vec<RepoSummary> {
    // Entries without a parseable timestamp sort last.
    repos.sort_by_key(|repo| std::cmp::Reverse(repo.pushed_at_time()));

    repos
        .into_iter()
        .take(max_repos)
        .map(RepoSummary::from)
        .collect()
}

/// Repository source backed by the structured REST endpoint.
#[derive(Debug, Clone)]
pub struct ApiSource {
    client: GitHubClient,
    url: String,
    max_repos: usize,
}

impl ApiSource {
    pub fn new(client: GitHubClient, url: impl Into<String>, max_repos: usize) -> Self {
        Self {
            client,
            url: url.into(),
            max_repos,
        }
    }
}

impl RepoSource for ApiSource {
    fn name(&self) -> &'static str {
        "api"
    }

    fn fetch(&self, timeout: Duration) -> FetchFuture {
        let client = self.client.clone();
        let url = self.url.clone();
        let max_repos = self.max_repos;

        Box::pin(async move {
            match with_timeout(timeout, client.list_user_repos(&url)).await {
                Ok(repos) => {
                    let repos = normalize_repos(repos, max_repos);
                    tracing::debug!("API returned {} repositories", repos.len());
                    Some(repos)
                }
                Err(e) => {
                    tracing::warn!("API fetch failed: {}", e);
                    None
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestServer, silent_server};
    use std::time::Instant;

    fn api_repo(name: &str, pushed_at: Option<&str>) -> ApiRepository {
        ApiRepository {
            name: Some(name.to_string()),
            html_url: Some(format!("https://github.com/u/{}", name)),
            pushed_at: pushed_at.map(str::to_string),
            ..ApiRepository::default()
        }
    }

    #[test]
    fn test_normalize_sorts_by_pushed_desc_and_truncates() {
        let repos = vec![
            api_repo("old", Some("2020-01-01T00:00:00Z")),
            api_repo("unknown", None),
            api_repo("new", Some("2024-06-01T00:00:00Z")),
            api_repo("mid", Some("2022-01-01")),
        ];

        let names: Vec<String> = normalize_repos(repos.clone(), 10)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["new", "mid", "old", "unknown"]);

        let truncated = normalize_repos(repos, 2);
        assert_eq!(truncated.len(), 2);
        assert_eq!(truncated[0].name, "new");
    }

    #[test]
    fn test_normalize_keeps_entries_without_url() {
        let mut linkless = api_repo("x", Some("2024-01-01"));
        linkless.html_url = None;

        let repos = normalize_repos(vec![linkless, api_repo("ok", None)], 8);
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "x");
        assert_eq!(repos[0].url, "");
        assert_eq!(repos[1].name, "ok");
    }

    #[tokio::test]
    async fn test_fetch_minimal_entry_becomes_card() {
        let server = TestServer::json(
            200,
            r#"[{"name": "A", "pushed_at": "2024-01-01", "stargazers_count": 1500, "language": "Python"}]"#,
        )
        .await;
        let source = ApiSource::new(GitHubClient::new().unwrap(), server.url(), 8);

        let repos = source.fetch(Duration::from_secs(2)).await.unwrap();
        assert_eq!(repos.len(), 1);

        let card = crate::render::Card::from_repo(&repos[0]);
        assert_eq!(card.name, "A");
        assert_eq!(card.url, "#");
        assert_eq!(card.stars, "1.5k");
        assert_eq!(card.language.unwrap().color, "#3572A5");
    }

    #[tokio::test]
    async fn test_fetch_maps_api_entries() {
        let server = TestServer::json(
            200,
            r#"[
                {"name": "A", "html_url": "https://github.com/u/A", "pushed_at": "2024-01-01",
                 "stargazers_count": 1500, "language": "Python"},
                {"name": "B", "html_url": "https://github.com/u/B", "pushed_at": "2024-02-01",
                 "topics": ["cli", "rust"]}
            ]"#,
        )
        .await;
        let source = ApiSource::new(GitHubClient::new().unwrap(), server.url(), 8);

        let repos = source.fetch(Duration::from_secs(2)).await.unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "B");
        assert_eq!(repos[0].topics, ["cli", "rust"]);
        assert_eq!(repos[1].name, "A");
        assert_eq!(repos[1].stars, 1500);
        assert_eq!(repos[1].language, "Python");
    }

    #[tokio::test]
    async fn test_fetch_non_list_is_none() {
        let server = TestServer::json(200, r#"{"message": "Not Found"}"#).await;
        let source = ApiSource::new(GitHubClient::new().unwrap(), server.url(), 8);

        assert!(source.fetch(Duration::from_secs(2)).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_non_json_is_none() {
        let server = TestServer::new(200, "text/html", "<html>nope</html>").await;
        let source = ApiSource::new(GitHubClient::new().unwrap(), server.url(), 8);

        assert!(source.fetch(Duration::from_secs(2)).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_none() {
        let server = TestServer::json(500, "[]").await;
        let source = ApiSource::new(GitHubClient::new().unwrap(), server.url(), 8);

        assert!(source.fetch(Duration::from_secs(2)).await.is_none());
    }

    #[tokio::test]
    async fn test_rate_limited_response_is_reported() {
        let server = TestServer::with_headers(
            403,
            "application/json",
            r#"{"message": "API rate limit exceeded"}"#,
            &[
                ("x-ratelimit-limit", "60"),
                ("x-ratelimit-remaining", "0"),
                ("x-ratelimit-reset", "1700000000"),
            ],
        )
        .await;
        let client = GitHubClient::new().unwrap();

        let result = client.list_user_repos(&server.url()).await;
        assert!(matches!(result, Err(FolioError::RateLimited { .. })));
        assert_eq!(client.rate_limit().remaining, 0);
        assert_eq!(client.rate_limit().limit, 60);
    }

    #[tokio::test]
    async fn test_unresponsive_endpoint_times_out() {
        let server = silent_server().await;
        let source = ApiSource::new(GitHubClient::new().unwrap(), server.url(), 8);

        let started = Instant::now();
        let result = source.fetch(Duration::from_millis(200)).await;

        assert!(result.is_none());
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
