pub mod provider;
pub mod chat;
pub mod prompts;
pub mod parser;

pub use provider::{CompletionRequest, TextGenerator};
pub use chat::{ChatCompletionsProvider, GeneratorSettings};
pub use parser::{parse_analysis, parse_judgment};
pub use prompts::{build_analysis_prompt, build_judgment_prompt, SYSTEM_PROMPT};
