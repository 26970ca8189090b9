use chrono::Utc;
use futures::future::try_join;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::analysis::fallback::synthesize_after_failure;
use crate::analysis::judge::ComparativeJudge;
use crate::analysis::stats::ScoreEngine;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::github::ProfileSource;
use crate::llm::{build_analysis_prompt, parse_analysis, CompletionRequest, TextGenerator};
use crate::models::analysis::{AnalysisResult, ContenderStats, Origin};
use crate::models::{
    BattleReport, CommitSummary, Contender, DeveloperReport, GitHubUser, Repository, Scorecard,
};
use crate::storage::Cache;

const MAX_HANDLE_LEN: usize = 39;

#[derive(Debug, Clone)]
pub struct ProfileData {
    pub user: GitHubUser,
    pub repos: Vec<Repository>,
    pub commits: Vec<CommitSummary>,
}

pub struct AnalysisPipeline {
    source: Arc<dyn ProfileSource>,
    generator: Arc<dyn TextGenerator>,
    cache: Arc<dyn Cache>,
    engine: ScoreEngine,
    judge: ComparativeJudge,
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(
        source: Arc<dyn ProfileSource>,
        generator: Arc<dyn TextGenerator>,
        cache: Arc<dyn Cache>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            judge: ComparativeJudge::new(generator.clone()),
            generator,
            cache,
            engine: ScoreEngine::new(),
            config,
        }
    }

    pub async fn analyze_user(&self, login: &str) -> Result<DeveloperReport> {
        let data = self.gather(login).await?;
        let scorecard = self.score(&data);
        let analysis = self.analyze(&data).await;

        tracing::info!(
            "Report for {}: level {} {}, analysis from {}",
            data.user.login,
            scorecard.level,
            scorecard.archetype,
            analysis.origin
        );

        Ok(DeveloperReport {
            commits_sampled: data.commits.len(),
            user: data.user,
            repositories: data.repos,
            scorecard,
            analysis,
            generated_at: Utc::now(),
        })
    }

    pub async fn battle(&self, first: &str, second: &str) -> Result<BattleReport> {
        let (first, second) = try_join(self.gather(first), self.gather(second)).await?;

        let first = Contender {
            scorecard: self.score(&first),
            user: first.user,
        };
        let second = Contender {
            scorecard: self.score(&second),
            user: second.user,
        };

        let judgment = self
            .judge
            .judge(&contender_stats(&first), &contender_stats(&second))
            .await;

        Ok(BattleReport {
            first,
            second,
            judgment,
            generated_at: Utc::now(),
        })
    }

    pub async fn gather(&self, login: &str) -> Result<ProfileData> {
        let login = validate_handle(login)?;
        let key = login.to_ascii_lowercase();
        let profile_key = format!("profile:{}", key);
        let repos_key = format!("repos:{}", key);
        let commits_key = format!("commits:{}", key);

        let (user, repos, commits) = tokio::join!(
            self.cached(&profile_key, self.source.fetch_user(login)),
            self.cached(&repos_key, self.source.fetch_repositories(login)),
            self.cached(&commits_key, self.source.fetch_recent_commits(login)),
        );

        let user = user?;
        let repos = repos.unwrap_or_else(|e| {
            tracing::warn!("Continuing without repositories for {}: {}", login, e);
            Vec::new()
        });
        let commits = commits.unwrap_or_else(|e| {
            tracing::warn!("Continuing without commits for {}: {}", login, e);
            Vec::new()
        });

        Ok(ProfileData {
            user,
            repos,
            commits,
        })
    }

    pub fn score(&self, data: &ProfileData) -> Scorecard {
        let estimate = self
            .engine
            .estimate_total_commits(&data.user, data.commits.len());
        self.engine.compute_scorecard(&data.user, &data.repos, estimate)
    }

    pub async fn analyze(&self, data: &ProfileData) -> AnalysisResult {
        match self.request_analysis(data).await {
            Ok(analysis) => analysis,
            Err(e) => {
                if e.is_ai_failure() {
                    tracing::warn!(
                        "AI analysis unavailable for {} ({}), using fallback: {}",
                        data.user.login,
                        self.config.ai_model,
                        e
                    );
                } else {
                    tracing::error!("Unexpected analysis error for {}: {}", data.user.login, e);
                }
                synthesize_after_failure(&data.user, &data.repos, e.to_string())
            }
        }
    }

    async fn request_analysis(&self, data: &ProfileData) -> Result<AnalysisResult> {
        let prompt = build_analysis_prompt(&data.user.login, &data.repos, &data.commits);
        tracing::debug!(
            "Requesting analysis for {} from {}",
            data.user.login,
            self.generator.name()
        );
        let raw = self
            .generator
            .complete(CompletionRequest::analysis(prompt))
            .await?;
        let mut analysis = parse_analysis(&raw)?;
        // The model does not get to claim it is the fallback.
        analysis.origin = Origin::Ai;
        analysis.diagnostic = None;
        Ok(analysis)
    }

    async fn cached<T, F>(&self, key: &str, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T>>,
    {
        match self.cache.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    tracing::debug!("Cache hit: {}", key);
                    return Ok(value);
                }
                Err(e) => tracing::warn!("Ignoring unreadable cache entry {}: {}", key, e),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
        }

        let value = fetch.await?;

        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(key, &raw, self.config.cache_ttl_secs) {
                    tracing::warn!("Cache write failed for {}: {}", key, e);
                }
            }
            Err(e) => tracing::warn!("Could not serialize {} for caching: {}", key, e),
        }

        Ok(value)
    }
}

fn contender_stats(contender: &Contender) -> ContenderStats {
    ContenderStats {
        handle: contender.user.login.clone(),
        public_repos: contender.user.public_repos,
        followers: contender.user.followers,
        total_stars: contender.scorecard.total_stars,
        top_language: contender.scorecard.top_language.clone(),
    }
}

/// Only characters GitHub has ever allowed in a handle. Legacy accounts may
/// carry trailing or doubled hyphens, so the provider decides on those.
fn validate_handle(login: &str) -> Result<&str> {
    let login = login.trim();
    let valid = !login.is_empty()
        && login.len() <= MAX_HANDLE_LEN
        && login.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(login)
    } else {
        Err(Error::ProviderNotFound(login.to_string()))
    }
}
