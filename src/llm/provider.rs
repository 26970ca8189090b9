use async_trait::async_trait;

use crate::error::Result;
use crate::llm::prompts::SYSTEM_PROMPT;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn analysis(prompt: String) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            temperature: 0.5,
            max_tokens: 1024,
        }
    }

    pub fn judgment(prompt: String) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            temperature: 0.8,
            max_tokens: 512,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
    fn name(&self) -> &str;
}
