use std::sync::Arc;

use crate::error::Result;
use crate::llm::{build_judgment_prompt, parse_judgment, CompletionRequest, TextGenerator};
use crate::models::analysis::{ContenderStats, JudgmentResult, Origin};

pub const FALLBACK_SCORE_CAP: u64 = 95;

/// Lifecycle of one comparison. `Judged` is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum JudgeState {
    NotStarted,
    AwaitingUpstream,
    Judged(JudgmentResult),
}

pub struct JudgeSession {
    a: ContenderStats,
    b: ContenderStats,
    state: JudgeState,
}

impl JudgeSession {
    pub fn new(a: ContenderStats, b: ContenderStats) -> Self {
        Self {
            a,
            b,
            state: JudgeState::NotStarted,
        }
    }

    pub fn state(&self) -> &JudgeState {
        &self.state
    }

    pub async fn run(&mut self, generator: &dyn TextGenerator) -> JudgmentResult {
        if let JudgeState::Judged(result) = &self.state {
            return result.clone();
        }

        self.state = JudgeState::AwaitingUpstream;
        let result = match self.request_verdict(generator).await {
            Ok(result) => {
                tracing::info!(
                    "Judge picked {} ({} vs {})",
                    result.winner_id,
                    result.score_a,
                    result.score_b
                );
                result
            }
            Err(e) => {
                tracing::warn!("Judge unavailable, deciding on raw stats: {}", e);
                fallback_judgment(&self.a, &self.b, &e.to_string())
            }
        };

        self.state = JudgeState::Judged(result.clone());
        result
    }

    async fn request_verdict(&self, generator: &dyn TextGenerator) -> Result<JudgmentResult> {
        let prompt = build_judgment_prompt(&self.a, &self.b);
        let raw = generator.complete(CompletionRequest::judgment(prompt)).await?;
        parse_judgment(&raw, &self.a.handle, &self.b.handle)
    }
}

pub struct ComparativeJudge {
    generator: Arc<dyn TextGenerator>,
}

impl ComparativeJudge {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn judge(&self, a: &ContenderStats, b: &ContenderStats) -> JudgmentResult {
        let mut session = JudgeSession::new(a.clone(), b.clone());
        session.run(self.generator.as_ref()).await
    }
}

/// Ties go to the first contender.
pub fn fallback_judgment(a: &ContenderStats, b: &ContenderStats, detail: &str) -> JudgmentResult {
    let score_a = raw_score(a);
    let score_b = raw_score(b);
    let winner = if score_b > score_a { b } else { a };

    JudgmentResult {
        winner_id: winner.handle.clone(),
        reason: format!("[Judge Offline: {}] Winner by raw stats.", detail),
        score_a,
        score_b,
        origin: Origin::Fallback,
    }
}

fn raw_score(c: &ContenderStats) -> u8 {
    c.public_repos
        .saturating_add(c.followers)
        .min(FALLBACK_SCORE_CAP) as u8
}
