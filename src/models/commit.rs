use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSummary {
    #[serde(default)]
    pub sha: String,
    pub commit: CommitDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetails {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl CommitSummary {
    pub fn new(message: impl Into<String>, date: Option<DateTime<Utc>>) -> Self {
        Self {
            sha: String::new(),
            commit: CommitDetails {
                message: message.into(),
                author: Some(CommitAuthor { name: None, date }),
            },
        }
    }

    pub fn message(&self) -> &str {
        &self.commit.message
    }

    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        self.commit.author.as_ref().and_then(|a| a.date)
    }
}
