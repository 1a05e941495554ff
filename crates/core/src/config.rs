use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::CoreError;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Environment variables read by [`AppConfig::from_env`].
pub const ENV_API_KEY: &str = "STOCKS_API_KEY";
pub const ENV_BASE_URL: &str = "STOCKS_BASE_URL";
pub const ENV_DATABASE_PATH: &str = "STOCKS_DATABASE_PATH";
pub const ENV_PREFERENCES_PATH: &str = "STOCKS_PREFERENCES_PATH";

/// Process-level configuration. Built once at startup and handed to
/// [`crate::StocksCompanion::open`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Alpha Vantage API key.
    pub api_key: String,

    pub base_url: String,

    /// SQLite file holding watchlists. `None` keeps them in memory.
    pub database_path: Option<PathBuf>,

    /// JSON file holding theme and search history. `None` keeps them in memory.
    pub preferences_path: Option<PathBuf>,

    pub request_timeout_secs: u64,

    pub cache: CachePolicy,

    pub search: SearchConfig,

    /// Interval of the watchlist-detail auto refresh.
    pub watchlist_refresh_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            database_path: None,
            preferences_path: None,
            request_timeout_secs: 30,
            cache: CachePolicy::default(),
            search: SearchConfig::default(),
            watchlist_refresh_secs: 30,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with whatever `STOCKS_*` variables are set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            config.api_key = key;
        }
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Ok(path) = std::env::var(ENV_DATABASE_PATH) {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(ENV_PREFERENCES_PATH) {
            config.preferences_path = Some(PathBuf::from(path));
        }
        config
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api_key.trim().is_empty() {
            return Err(CoreError::Validation("API key must not be empty".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(CoreError::Validation("Base URL must not be empty".into()));
        }
        if self.watchlist_refresh_secs == 0 {
            return Err(CoreError::Validation(
                "Watchlist refresh interval must be at least one second".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn watchlist_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.watchlist_refresh_secs)
    }
}

/// Response cache policy for the quote client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// Entries younger than this are served without a request.
    pub max_age_secs: u64,

    /// When offline, entries younger than this are still acceptable.
    pub max_stale_secs: u64,

    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_age_secs: 30,
            max_stale_secs: 60 * 60 * 24,
            max_entries: 256,
        }
    }
}

impl CachePolicy {
    /// Policy that never serves from cache.
    pub fn disabled() -> Self {
        Self {
            max_age_secs: 0,
            max_stale_secs: 0,
            max_entries: 0,
        }
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn max_stale(&self) -> Duration {
        Duration::from_secs(self.max_stale_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before searching.
    pub debounce_ms: u64,

    /// Minimum trimmed query length that triggers a remote search.
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_len: 2,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
