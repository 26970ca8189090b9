pub mod client;
pub mod rate_limiter;

pub use client::GitHubClient;
pub use rate_limiter::RateLimiter;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CommitSummary, GitHubUser, Repository};

#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_user(&self, login: &str) -> Result<GitHubUser>;
    async fn fetch_repositories(&self, login: &str) -> Result<Vec<Repository>>;
    async fn fetch_recent_commits(&self, login: &str) -> Result<Vec<CommitSummary>>;
}
