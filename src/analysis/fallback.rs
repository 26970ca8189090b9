use crate::analysis::stats::{language_tally, top_language};
use crate::models::analysis::{AnalysisResult, CodeQuality, CommitPattern, Origin};
use crate::models::{GitHubUser, Repository};

pub const FALLBACK_PRODUCTIVITY_CAP: u64 = 98;
pub const FALLBACK_QUALITY_CAP: u64 = 95;

const UNKNOWN_LANGUAGE: &str = "Code";

pub const AI_UNAVAILABLE_PREFIX: &str = "[AI Unavailable] ";

pub fn synthesize_analysis(user: &GitHubUser, repos: &[Repository]) -> AnalysisResult {
    let tally = language_tally(repos);
    let top = top_language(&tally).unwrap_or(UNKNOWN_LANGUAGE);

    let total_stars = repos
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.stargazers_count));

    let productivity = (60u64.saturating_add((repos.len() as u64).saturating_mul(2)))
        .min(FALLBACK_PRODUCTIVITY_CAP) as u8;
    let quality = (70u64.saturating_add(total_stars / 5)).min(FALLBACK_QUALITY_CAP) as u8;

    tracing::debug!(
        "Synthesized analysis for {}: productivity {}, quality {}",
        user.login,
        productivity,
        quality
    );

    let suggested_next = if top == "TypeScript" {
        "Rust or Go"
    } else {
        "TypeScript"
    };

    AnalysisResult {
        commit_pattern: CommitPattern {
            productivity_score: productivity,
            peak_hours: vec!["09:00-11:00".to_string(), "14:00-17:00".to_string()],
            work_pattern: format!(
                "[Standard Analysis] High activity detected in {} projects. Maintains {} active repositories with consistent output.",
                top,
                repos.len()
            ),
            recommendations: vec![
                format!("Consider documenting your complex {} modules better.", top),
                "Automate your deployment pipelines for side projects.".to_string(),
                format!("Expand your portfolio with more {} projects.", suggested_next),
            ],
        },
        code_quality: CodeQuality {
            overall_quality_score: quality,
            strengths: vec![
                format!("Solid understanding of {} ecosystems", top),
                "Good repository structuring patterns".to_string(),
                "Maintains clean version control history".to_string(),
            ],
            improvements: vec![
                "Add more unit test coverage for core logic".to_string(),
                "Include detailed contributing guidelines".to_string(),
                "Optimize build times for larger projects".to_string(),
            ],
        },
        origin: Origin::Fallback,
        diagnostic: None,
    }
}

pub fn synthesize_after_failure(
    user: &GitHubUser,
    repos: &[Repository],
    reason: impl Into<String>,
) -> AnalysisResult {
    let mut analysis = synthesize_analysis(user, repos);
    analysis.commit_pattern.work_pattern =
        format!("{}{}", AI_UNAVAILABLE_PREFIX, analysis.commit_pattern.work_pattern);
    analysis.diagnostic = Some(reason.into());
    analysis
}
