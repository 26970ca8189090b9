use secrecy::SecretString;
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_AI_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_AI_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_CACHE_PATH: &str = "devcard-cache.db";

#[derive(Debug)]
pub struct Config {
    pub github_token: Option<SecretString>,
    pub ai_api_key: Option<SecretString>,
    pub ai_api_base: String,
    pub ai_model: String,
    pub ai_timeout: Duration,
    pub cache_path: String,
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let github_token = non_empty_var("GITHUB_TOKEN").map(SecretString::from);

        let ai_api_key = non_empty_var("GROQ_API_KEY")
            .or_else(|| non_empty_var("OPENAI_API_KEY"))
            .map(SecretString::from);

        let ai_api_base = non_empty_var("AI_API_BASE")
            .unwrap_or_else(|| DEFAULT_AI_API_BASE.to_string());

        let ai_model = non_empty_var("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string());

        let ai_timeout_secs = parse_var("AI_TIMEOUT_SECS", DEFAULT_AI_TIMEOUT_SECS)?;
        if ai_timeout_secs == 0 {
            return Err(Error::Config(
                "AI_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let cache_path =
            non_empty_var("CACHE_PATH").unwrap_or_else(|| DEFAULT_CACHE_PATH.to_string());

        let cache_ttl_secs = parse_var("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;

        Ok(Self {
            github_token,
            ai_api_key,
            ai_api_base,
            ai_model,
            ai_timeout: Duration::from_secs(ai_timeout_secs),
            cache_path,
            cache_ttl_secs,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var(name: &str, default: u64) -> Result<u64> {
    match non_empty_var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a positive integer, got '{}'", name, raw))),
        None => Ok(default),
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub cache_ttl_secs: u64,
    pub ai_model: String,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            cache_ttl_secs: config.cache_ttl_secs,
            ai_model: config.ai_model.clone(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            ai_model: DEFAULT_AI_MODEL.to_string(),
        }
    }
}
