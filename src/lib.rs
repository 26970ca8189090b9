pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod llm;
pub mod taxonomy;
pub mod analysis;
pub mod storage;

#[cfg(test)]
mod testing;

pub use config::{Config, PipelineConfig};
pub use error::{Error, Result};
pub use github::{GitHubClient, ProfileSource};
pub use llm::{ChatCompletionsProvider, GeneratorSettings, TextGenerator};
pub use analysis::AnalysisPipeline;
pub use storage::{Cache, NoCache, SqliteCache};
