use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{Config, DEFAULT_AI_API_BASE, DEFAULT_AI_MODEL, DEFAULT_AI_TIMEOUT_SECS};
use crate::error::{Error, Result};
use crate::llm::provider::{CompletionRequest, TextGenerator};

pub struct GeneratorSettings {
    pub api_key: Option<SecretString>,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

impl GeneratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config
                .ai_api_key
                .as_ref()
                .map(|k| SecretString::from(k.expose_secret().to_owned())),
            api_base: config.ai_api_base.clone(),
            model: config.ai_model.clone(),
            timeout: config.ai_timeout,
        }
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_AI_API_BASE.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
        }
    }
}

pub struct ChatCompletionsProvider {
    client: Client,
    api_key: Option<SecretString>,
    api_base: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for ChatCompletionsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsProvider {
    pub fn new(settings: GeneratorSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self::with_client(client, settings))
    }

    pub fn with_client(client: Client, settings: GeneratorSettings) -> Self {
        Self {
            client,
            api_key: settings.api_key,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model,
            timeout: settings.timeout,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, api_key: &SecretString, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejected(status, body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            Error::UpstreamUnavailable(format!("unreadable completion envelope: {}", e))
        })?;

        completion_text(parsed)
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let api_key = self.api_key.as_ref().ok_or(Error::MissingCredentials)?;

        tracing::debug!(
            "Requesting completion from {} (model: {}, {} prompt chars)",
            self.api_base,
            self.model,
            request.prompt.len()
        );

        // Dropping the timed-out future aborts the in-flight request.
        match tokio::time::timeout(self.timeout, self.send(api_key, &request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::UpstreamUnavailable(format!(
                "no response within {}s",
                self.timeout.as_secs_f32()
            ))),
        }
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn rejected(status: StatusCode, body: String) -> Error {
    const MAX_BODY_CHARS: usize = 500;
    let body: String = body.trim().chars().take(MAX_BODY_CHARS).collect();
    Error::UpstreamRejected {
        status: status.as_u16(),
        body,
    }
}

fn completion_text(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(Error::UpstreamEmpty)
}
