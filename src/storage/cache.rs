use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;

pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > now => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set_at(&self, key: &str, value: &str, ttl_secs: u64, now: DateTime<Utc>) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        if ttl_secs == 0 {
            entries.remove(key);
            return;
        }
        let ttl = Duration::seconds(ttl_secs.min(i64::MAX as u64 / 1000) as i64);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        entries.insert(key.to_string(), (value.to_string(), expires_at));
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_at(key, Utc::now()))
    }

    fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.set_at(key, value, ttl_secs, Utc::now());
        Ok(())
    }
}

pub struct NoCache;

impl Cache for NoCache {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<()> {
        Ok(())
    }
}
