//! In-process fakes for the text-generation service and the GitHub provider.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::github::ProfileSource;
use crate::llm::{CompletionRequest, TextGenerator};
use crate::models::{CommitSummary, GitHubUser, Repository};

/// Replays canned completions in order; an exhausted script reports
/// `UpstreamEmpty`.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn failing(error: Error) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.prompts.lock().unwrap().push(request.prompt);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(Error::UpstreamEmpty))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Serves fixed profile data and counts calls per operation.
#[derive(Default)]
pub struct StaticSource {
    pub users: HashMap<String, GitHubUser>,
    pub repos: HashMap<String, Vec<Repository>>,
    pub commits: HashMap<String, Vec<CommitSummary>>,
    /// Handles whose repository and commit lookups fail.
    pub broken_secondary: Vec<String>,
    pub user_calls: AtomicUsize,
    pub repo_calls: AtomicUsize,
    pub commit_calls: AtomicUsize,
}

impl StaticSource {
    pub fn with_user(mut self, user: GitHubUser, repos: Vec<Repository>) -> Self {
        self.repos.insert(user.login.clone(), repos);
        self.users.insert(user.login.clone(), user);
        self
    }

    pub fn with_commits(mut self, login: &str, commits: Vec<CommitSummary>) -> Self {
        self.commits.insert(login.to_string(), commits);
        self
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.user_calls.load(Ordering::SeqCst),
            self.repo_calls.load(Ordering::SeqCst),
            self.commit_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl ProfileSource for StaticSource {
    async fn fetch_user(&self, login: &str) -> Result<GitHubUser> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(login)
            .cloned()
            .ok_or_else(|| Error::ProviderNotFound(login.to_string()))
    }

    async fn fetch_repositories(&self, login: &str) -> Result<Vec<Repository>> {
        self.repo_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_secondary.iter().any(|b| b == login) {
            return Err(Error::ProviderError("repositories unavailable".to_string()));
        }
        Ok(self.repos.get(login).cloned().unwrap_or_default())
    }

    async fn fetch_recent_commits(&self, login: &str) -> Result<Vec<CommitSummary>> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_secondary.iter().any(|b| b == login) {
            return Err(Error::ProviderError("commits unavailable".to_string()));
        }
        Ok(self.commits.get(login).cloned().unwrap_or_default())
    }
}
