use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::time::Instant;

use crate::config::CachePolicy;

/// Query parameters that never take part in a cache key.
const SECRET_PARAMS: &[&str] = &["apikey"];

#[derive(Debug, Clone)]
struct CachedResponse {
    body: String,
    stored_at: Instant,
}

/// In-memory HTTP response cache with two freshness bounds:
///
/// - **fresh** (`max_age`): served instead of issuing a request.
/// - **stale** (`max_stale`): served only when the request could not reach
///   the server at all.
///
/// Only bodies that decoded successfully are stored, so an error payload
/// never shadows a good answer.
#[derive(Debug)]
pub struct ResponseCache {
    policy: CachePolicy,
    entries: Mutex<HashMap<String, CachedResponse>>,
}

impl ResponseCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Cache key for a request: parameters in order, secrets removed.
    pub fn key(params: &[(&str, &str)]) -> String {
        params
            .iter()
            .filter(|(name, _)| !SECRET_PARAMS.contains(name))
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Body younger than `max_age`, if any.
    pub fn fresh(&self, key: &str) -> Option<String> {
        self.lookup(key, self.policy.max_age())
    }

    /// Body younger than `max_stale`, if any. Offline fallback only.
    pub fn stale(&self, key: &str) -> Option<String> {
        self.lookup(key, self.policy.max_stale())
    }

    pub fn store(&self, key: String, body: String) {
        if self.policy.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        if !entries.contains_key(&key) && entries.len() >= self.policy.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, cached)| cached.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            CachedResponse {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn lookup(&self, key: &str, bound: std::time::Duration) -> Option<String> {
        let entries = self.entries.lock();
        let cached = entries.get(key)?;
        if cached.stored_at.elapsed() < bound {
            Some(cached.body.clone())
        } else {
            None
        }
    }
}
