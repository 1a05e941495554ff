use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::{AppConfig, CachePolicy, DEFAULT_BASE_URL};
use crate::errors::CoreError;
use crate::models::overview::StockOverview;
use crate::models::quote::MarketMovers;
use crate::models::search::{SymbolMatch, SymbolSearchResponse};
use super::http_cache::ResponseCache;
use super::traits::QuoteProvider;

const PROVIDER_NAME: &str = "Alpha Vantage";

const FN_TOP_GAINERS_LOSERS: &str = "TOP_GAINERS_LOSERS";
const FN_OVERVIEW: &str = "OVERVIEW";
const FN_SYMBOL_SEARCH: &str = "SYMBOL_SEARCH";

/// Keys Alpha Vantage uses to report failures inside a 200 response.
const NOTICE_KEYS: &[&str] = &["Error Message", "Information", "Note"];

/// Alpha Vantage API client for movers, fundamentals and symbol search.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key.
/// - **Strategy**: short-lived response cache, stale answers when offline.
///
/// Rate-limit and invalid-call notices arrive as HTTP 200 with an
/// `Information`/`Note`/`Error Message` object; those surface as
/// [`CoreError::Api`] and are never cached.
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
    cache: ResponseCache,
}

impl AlphaVantageClient {
    pub fn new(api_key: String) -> Self {
        Self::with_options(
            api_key,
            DEFAULT_BASE_URL.to_string(),
            Duration::from_secs(30),
            CachePolicy::default(),
        )
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_options(
            config.api_key.clone(),
            config.base_url.clone(),
            config.request_timeout(),
            config.cache,
        )
    }

    pub fn with_options(
        api_key: String,
        base_url: String,
        timeout: Duration,
        cache: CachePolicy,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url,
            api_key,
            cache: ResponseCache::new(cache),
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Issue one GET and decode its body, going through the response cache.
    async fn get_json<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, CoreError> {
        let key = ResponseCache::key(params);

        if let Some(body) = self.cache.fresh(&key) {
            debug!("{PROVIDER_NAME}: serving {key} from cache");
            return decode(&body);
        }

        match self.fetch_body(params).await {
            Ok(body) => {
                let value = decode(&body)?;
                self.cache.store(key, body);
                Ok(value)
            }
            Err(e) if e.is_connectivity() => match self.cache.stale(&key) {
                Some(body) => {
                    warn!("{PROVIDER_NAME}: offline ({e}), serving stale {key}");
                    decode(&body)
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    async fn fetch_body(&self, params: &[(&str, &str)]) -> Result<String, CoreError> {
        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("apikey", self.api_key.as_str()));

        debug!("{PROVIDER_NAME}: GET {}", ResponseCache::key(params));
        let resp = self.client.get(&self.base_url).query(&query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Remote {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Err(CoreError::EmptyResponse);
        }
        Ok(body)
    }
}

/// Decode an Alpha Vantage body, turning in-band notices into errors.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::EmptyResponse);
    }

    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: PROVIDER_NAME.into(),
        message: format!("Failed to parse response: {e}"),
    })?;

    if value.is_null() {
        return Err(CoreError::EmptyResponse);
    }

    if let Some(obj) = value.as_object() {
        for key in NOTICE_KEYS {
            if let Some(notice) = obj.get(*key).and_then(|v| v.as_str()) {
                return Err(CoreError::Api {
                    provider: PROVIDER_NAME.into(),
                    message: notice.to_string(),
                });
            }
        }
    }

    serde_json::from_value(value).map_err(|e| CoreError::Api {
        provider: PROVIDER_NAME.into(),
        message: format!("Unexpected response shape: {e}"),
    })
}

/// Validate a decoded overview: an empty `Symbol` is Alpha Vantage's
/// way of saying the ticker is unknown.
pub fn check_overview(symbol: &str, overview: StockOverview) -> Result<StockOverview, CoreError> {
    if overview.is_found() {
        Ok(overview)
    } else {
        Err(CoreError::NotFound(symbol.to_string()))
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch_movers(&self) -> Result<MarketMovers, CoreError> {
        self.get_json(&[("function", FN_TOP_GAINERS_LOSERS)]).await
    }

    async fn fetch_overview(&self, symbol: &str) -> Result<StockOverview, CoreError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::Validation("Symbol must not be empty".into()));
        }
        let overview: StockOverview = self
            .get_json(&[("function", FN_OVERVIEW), ("symbol", symbol.as_str())])
            .await?;
        check_overview(&symbol, overview)
    }

    async fn search_symbols(&self, keywords: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        let keywords = keywords.trim();
        let resp: SymbolSearchResponse = self
            .get_json(&[("function", FN_SYMBOL_SEARCH), ("keywords", keywords)])
            .await?;
        Ok(resp.best_matches)
    }
}
