use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::github::rate_limiter::RateLimiter;
use crate::github::ProfileSource;
use crate::models::{CommitSummary, GitHubUser, Repository};

const GITHUB_API: &str = "https://api.github.com";
const REPOS_PER_PROFILE: u32 = 10;
const COMMITS_PER_PROFILE: u32 = 30;

pub struct GitHubClient {
    client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: Option<&SecretString>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            let mut value =
                header::HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("devcard/0.1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(),
            base_url: GITHUB_API.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn get_user(&self, username: &str) -> Result<GitHubUser> {
        tracing::info!("Fetching user: {}", username);
        let url = format!("{}/users/{}", self.base_url, username);
        match self.get_json(&url).await? {
            Some(user) => Ok(user),
            None => Err(Error::ProviderNotFound(username.to_string())),
        }
    }

    pub async fn get_user_repos(&self, username: &str) -> Result<Vec<Repository>> {
        self.list_repos(username, REPOS_PER_PROFILE).await
    }

    pub async fn get_recent_commits(&self, username: &str) -> Result<Vec<CommitSummary>> {
        let repos = self.list_repos(username, 1).await?;
        let Some(repo) = repos.first() else {
            return Ok(Vec::new());
        };

        tracing::debug!("Fetching commits for: {}/{}", username, repo.name);
        let url = format!(
            "{}/repos/{}/{}/commits?per_page={}",
            self.base_url, username, repo.name, COMMITS_PER_PROFILE
        );
        // An empty repository answers 409; a missing one 404.
        Ok(self.get_json(&url).await?.unwrap_or_default())
    }

    async fn list_repos(&self, username: &str, per_page: u32) -> Result<Vec<Repository>> {
        tracing::info!("Fetching repositories for: {}", username);
        let url = format!(
            "{}/users/{}/repos?sort=updated&per_page={}",
            self.base_url, username, per_page
        );
        Ok(self.get_json(&url).await?.unwrap_or_default())
    }

    /// GET and decode. `Ok(None)` for 404 and 409, `ProviderError` for every
    /// other failure.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        self.rate_limiter.check()?;

        tracing::debug!("Fetching: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::ProviderError(format!("request to {} failed: {}", url, e)))?;
        self.rate_limiter.update_from_headers(response.headers());

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::CONFLICT {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ProviderError(format!(
                "{} returned {}: {}",
                url,
                status,
                body.trim()
            )));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| Error::ProviderError(format!("unreadable response from {}: {}", url, e)))
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

#[async_trait]
impl ProfileSource for GitHubClient {
    async fn fetch_user(&self, login: &str) -> Result<GitHubUser> {
        self.get_user(login).await
    }

    async fn fetch_repositories(&self, login: &str) -> Result<Vec<Repository>> {
        self.get_user_repos(login).await
    }

    async fn fetch_recent_commits(&self, login: &str) -> Result<Vec<CommitSummary>> {
        self.get_recent_commits(login).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use httpmock::Method::GET;
    use httpmock::MockServer;

    fn client(base_url: String) -> GitHubClient {
        GitHubClient {
            client: Client::builder().no_proxy().build().unwrap(),
            rate_limiter: RateLimiter::new(),
            base_url: GITHUB_API.to_string(),
        }
        .with_base_url(base_url)
    }

    #[test]
    fn test_base_url_override_drops_trailing_slash() {
        let token = SecretString::from("ghp_test".to_string());
        let client = GitHubClient::new(Some(&token)).unwrap();
        assert_eq!(client.base_url, GITHUB_API);

        let client = client.with_base_url("http://127.0.0.1:8080/");
        assert_eq!(client.base_url, "http://127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_get_user_parses_nullable_fields() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/octocat");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"login":"octocat","name":null,"bio":null,"followers":12,"public_repos":8,"avatar_url":"https://a/1"}"#);
            })
            .await;

        let user = client(server.base_url()).get_user("octocat").await.unwrap();
        assert_eq!(user.login, "octocat");
        assert_eq!(user.name, None);
        assert_eq!(user.followers, 12);
        assert_eq!(user.following, 0);
        assert_eq!(user.display_name(), "octocat");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/ghost");
                then.status(404).body(r#"{"message":"Not Found"}"#);
            })
            .await;

        let result = client(server.base_url()).get_user("ghost").await;
        assert!(matches!(result, Err(Error::ProviderNotFound(login)) if login == "ghost"));
    }

    #[tokio::test]
    async fn test_repos_request_latest_ten() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/users/octocat/repos")
                    .query_param("sort", "updated")
                    .query_param("per_page", "10");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"[{"name":"a","language":"Rust","stargazers_count":3},{"name":"b","language":null}]"#);
            })
            .await;

        let repos = client(format!("{}/", server.base_url()))
            .get_user_repos("octocat")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].stargazers_count, 3);
        assert_eq!(repos[1].language_label(), None);
    }

    #[tokio::test]
    async fn test_server_error_is_provider_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(502).body("bad gateway");
            })
            .await;

        let result = client(server.base_url()).get_user_repos("octocat").await;
        assert!(matches!(result, Err(Error::ProviderError(msg)) if msg.contains("502")));
    }

    #[tokio::test]
    async fn test_commits_come_from_latest_repo() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/users/octocat/repos")
                    .query_param("per_page", "1");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"[{"name":"hello-world","language":"Rust"}]"#);
            })
            .await;
        let commits_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octocat/hello-world/commits")
                    .query_param("per_page", "30");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"[{"sha":"abc","commit":{"message":"Fix typo","author":{"name":"Mona","date":"2024-03-01T10:00:00Z"}}}]"#);
            })
            .await;

        let commits = client(server.base_url())
            .get_recent_commits("octocat")
            .await
            .unwrap();
        commits_mock.assert_async().await;
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message(), "Fix typo");
        assert!(commits[0].authored_at().is_some());
    }

    #[tokio::test]
    async fn test_no_repositories_means_no_commits() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/octocat/repos");
                then.status(200)
                    .header("content-type", "application/json")
                    .body("[]");
            })
            .await;

        let commits = client(server.base_url())
            .get_recent_commits("octocat")
            .await
            .unwrap();
        assert!(commits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_repository_yields_no_commits() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/octocat/repos");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"[{"name":"empty"}]"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octocat/empty/commits");
                then.status(409).body(r#"{"message":"Git Repository is empty."}"#);
            })
            .await;

        let commits = client(server.base_url())
            .get_recent_commits("octocat")
            .await
            .unwrap();
        assert!(commits.is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_rate_limit_fails_fast() {
        let reset = (Utc::now().timestamp() + 3600).to_string();
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/users/octocat/repos");
                then.status(200)
                    .header("content-type", "application/json")
                    .header("x-ratelimit-remaining", "0")
                    .header("x-ratelimit-reset", reset.as_str())
                    .body("[]");
            })
            .await;
        let client = client(server.base_url());

        client.get_user_repos("octocat").await.unwrap();
        assert_eq!(client.rate_limiter().remaining(), Some(0));

        let result = client.get_user_repos("octocat").await;
        assert!(matches!(result, Err(Error::ProviderError(msg)) if msg.contains("rate limit")));
        mock.assert_hits_async(1).await;
    }
}
