use serde_json::json;

use crate::models::{CommitSummary, ContenderStats, Repository};

pub const SYSTEM_PROMPT: &str = "Output JSON only.";

pub const MAX_PROMPT_REPOS: usize = 5;
pub const MAX_PROMPT_COMMITS: usize = 5;
pub const MAX_SNIPPET_CHARS: usize = 100;

pub const ANALYSIS_SCHEMA: &str = r#"{
  "commit_pattern": {
    "productivity_score": integer (0-100),
    "peak_hours": ["HH:MM-HH:MM"],
    "work_pattern": "string",
    "recommendations": ["string"]
  },
  "code_quality": {
    "overall_quality_score": integer (0-100),
    "strengths": ["string"],
    "improvements": ["string"]
  }
}"#;

pub const JUDGMENT_SCHEMA: &str = r#"{
  "winner": "string (exactly one of the two usernames)",
  "reason": "string (witty and short)",
  "score_a": integer (0-100),
  "score_b": integer (0-100)
}"#;

pub fn build_analysis_prompt(
    handle: &str,
    repos: &[Repository],
    commits: &[CommitSummary],
) -> String {
    let repo_summary = if repos.is_empty() {
        "- No public repositories.".to_string()
    } else {
        repos
            .iter()
            .take(MAX_PROMPT_REPOS)
            .map(|r| {
                format!(
                    "- {} ({}): {}",
                    r.name,
                    r.language_label().unwrap_or("N/A"),
                    r.description
                        .as_deref()
                        .filter(|d| !d.trim().is_empty())
                        .map(|d| truncate_chars(d, MAX_SNIPPET_CHARS))
                        .unwrap_or_else(|| "No description".to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let commit_summary = if commits.is_empty() {
        "No recent public commits found.".to_string()
    } else {
        let sample: Vec<_> = commits
            .iter()
            .take(MAX_PROMPT_COMMITS)
            .map(|c| {
                json!({
                    "msg": truncate_chars(c.message(), MAX_SNIPPET_CHARS),
                    "date": c.authored_at().map(|d| d.to_rfc3339()),
                })
            })
            .collect();
        serde_json::Value::Array(sample).to_string()
    };

    format!(
        "Act as a senior engineering manager. Review this developer profile.\n\
         User: {}\n\
         Repos:\n{}\n\
         Commits: {}\n\n\
         Output JSON matching exactly this schema:\n{}\n",
        handle, repo_summary, commit_summary, ANALYSIS_SCHEMA
    )
}

pub fn build_judgment_prompt(a: &ContenderStats, b: &ContenderStats) -> String {
    format!(
        "Act as a harsh code battle judge. Compare:\n\
         A ({}): {}\n\
         B ({}): {}\n\n\
         Output JSON matching exactly this schema:\n{}\n",
        a.handle,
        contender_line(a),
        b.handle,
        contender_line(b),
        JUDGMENT_SCHEMA
    )
}

fn contender_line(c: &ContenderStats) -> String {
    format!(
        "Repos: {}, Followers: {}, Stars: {}, Class: {}",
        c.public_repos, c.followers, c.total_stars, c.top_language
    )
}

/// First `max` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
