use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisResult, JudgmentResult};
use super::scorecard::Scorecard;
use super::user::{GitHubUser, Repository};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperReport {
    pub user: GitHubUser,
    pub repositories: Vec<Repository>,
    pub commits_sampled: usize,
    pub scorecard: Scorecard,
    pub analysis: AnalysisResult,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contender {
    pub user: GitHubUser,
    pub scorecard: Scorecard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleReport {
    pub first: Contender,
    pub second: Contender,
    pub judgment: JudgmentResult,
    pub generated_at: DateTime<Utc>,
}
