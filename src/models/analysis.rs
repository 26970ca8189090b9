use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Ai,
    Fallback,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Ai => write!(f, "ai"),
            Origin::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub commit_pattern: CommitPattern,
    pub code_quality: CodeQuality,
    pub origin: Origin,
    /// Upstream failure text when `origin` is `Fallback`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitPattern {
    pub productivity_score: u8,
    pub peak_hours: Vec<String>,
    pub work_pattern: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeQuality {
    pub overall_quality_score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResult {
    pub winner_id: String,
    pub reason: String,
    pub score_a: u8,
    pub score_b: u8,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContenderStats {
    pub handle: String,
    pub public_repos: u64,
    pub followers: u64,
    pub total_stars: u64,
    pub top_language: String,
}
