use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use std::sync::Mutex;

use crate::error::{Error, Result};

pub struct RateLimiter {
    state: Mutex<RateLimitState>,
}

#[derive(Debug, Clone, Copy, Default)]
struct RateLimitState {
    remaining: Option<u32>,
    reset_at: Option<DateTime<Utc>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RateLimitState::default()),
        }
    }

    pub fn check(&self) -> Result<()> {
        self.check_at(Utc::now())
    }

    fn check_at(&self, now: DateTime<Utc>) -> Result<()> {
        let state = match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        };

        match (state.remaining, state.reset_at) {
            (Some(0), Some(reset_at)) if reset_at > now => {
                let wait = (reset_at - now).num_seconds().max(1);
                tracing::warn!("GitHub rate limit exhausted, resets in {}s", wait);
                Err(Error::ProviderError(format!(
                    "rate limit exhausted, resets in {}s",
                    wait
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn update_from_headers(&self, headers: &HeaderMap) {
        let remaining = header_number(headers, "x-ratelimit-remaining");
        let reset = header_number(headers, "x-ratelimit-reset");
        if let Some(remaining) = remaining {
            self.record(remaining as u32, reset.and_then(|r| Utc.timestamp_opt(r as i64, 0).single()));
        }
    }

    fn record(&self, remaining: u32, reset_at: Option<DateTime<Utc>>) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.remaining = Some(remaining);
        if reset_at.is_some() {
            state.reset_at = reset_at;
        }
        if remaining < 10 {
            tracing::debug!("GitHub rate limit nearly exhausted: {} left", remaining);
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        self.state.lock().ok().and_then(|s| s.remaining)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
