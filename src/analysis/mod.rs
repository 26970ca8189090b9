pub mod fallback;
pub mod judge;
pub mod pipeline;
pub mod stats;

pub use fallback::{synthesize_after_failure, synthesize_analysis};
pub use judge::{ComparativeJudge, JudgeSession, JudgeState};
pub use pipeline::{AnalysisPipeline, ProfileData};
pub use stats::{compute_scorecard, ScoreEngine};
