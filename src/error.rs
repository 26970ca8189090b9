use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("User not found: {0}")]
    ProviderNotFound(String),

    #[error("GitHub API error: {0}")]
    ProviderError(String),

    #[error("No text-generation API key configured")]
    MissingCredentials,

    #[error("Text-generation service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Text-generation service rejected the request ({status}): {body}")]
    UpstreamRejected { status: u16, body: String },

    #[error("Text-generation service returned an empty completion")]
    UpstreamEmpty,

    #[error("Response does not match the expected schema: {0}")]
    SchemaInvalid(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn schema(message: impl Into<String>) -> Self {
        Error::SchemaInvalid(message.into())
    }

    pub fn is_ai_failure(&self) -> bool {
        matches!(
            self,
            Error::MissingCredentials
                | Error::UpstreamUnavailable(_)
                | Error::UpstreamRejected { .. }
                | Error::UpstreamEmpty
                | Error::SchemaInvalid(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_failures_are_classified() {
        assert!(Error::MissingCredentials.is_ai_failure());
        assert!(Error::UpstreamEmpty.is_ai_failure());
        assert!(Error::schema("missing field").is_ai_failure());
        assert!(Error::UpstreamRejected {
            status: 429,
            body: "slow down".to_string()
        }
        .is_ai_failure());
        assert!(!Error::ProviderNotFound("ghost".to_string()).is_ai_failure());
        assert!(!Error::ProviderError("boom".to_string()).is_ai_failure());
    }

    #[test]
    fn test_rejected_message_keeps_status_and_body() {
        let err = Error::UpstreamRejected {
            status: 401,
            body: "invalid api key".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("invalid api key"));
    }
}
