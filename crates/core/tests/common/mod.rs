// Shared fixtures for the integration test binaries.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use stocks_companion_core::errors::CoreError;
use stocks_companion_core::models::overview::StockOverview;
use stocks_companion_core::models::quote::{MarketMovers, StockQuote};
use stocks_companion_core::models::search::SymbolMatch;
use stocks_companion_core::providers::traits::QuoteProvider;
use stocks_companion_core::services::stock_repository::StockRepository;
use stocks_companion_core::storage::watchlist_store::WatchlistStore;

pub fn quote(ticker: &str, change_amount: &str, change_percentage: &str) -> StockQuote {
    StockQuote {
        ticker: ticker.into(),
        price: "100.00".into(),
        change_amount: change_amount.into(),
        change_percentage: change_percentage.into(),
        volume: "1000000".into(),
    }
}

pub fn sample_movers() -> MarketMovers {
    MarketMovers {
        metadata: "Top gainers, losers, and most actively traded US tickers".into(),
        last_updated: "2024-05-10 16:15:59 US/Eastern".into(),
        top_gainers: vec![quote("AAPL", "2.5", "1.5%"), quote("NVDA", "10.0", "4.5%")],
        top_losers: vec![quote("TSLA", "-3.0", "-2.0%")],
        most_active: vec![quote("AAPL", "2.5", "1.5%"), quote("AMD", "0.5", "0.3%")],
    }
}

pub fn symbol_match(symbol: &str) -> SymbolMatch {
    SymbolMatch {
        symbol: symbol.into(),
        name: format!("{symbol} Inc"),
        region: "United States".into(),
        currency: "USD".into(),
        match_score: "1.0000".into(),
        ..SymbolMatch::default()
    }
}

/// Scripted quote provider that records every call.
pub struct MockQuoteProvider {
    pub movers: Mutex<Result<MarketMovers, String>>,
    pub overviews: Mutex<HashMap<String, StockOverview>>,
    pub search_delay: Duration,
    pub calls: Mutex<Vec<String>>,
}

impl MockQuoteProvider {
    pub fn new() -> Self {
        Self {
            movers: Mutex::new(Ok(sample_movers())),
            overviews: Mutex::new(HashMap::new()),
            search_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn with_overview(self, overview: StockOverview) -> Self {
        self.overviews
            .lock()
            .insert(overview.symbol.clone(), overview);
        self
    }

    pub fn fail_movers(&self, message: &str) {
        *self.movers.lock() = Err(message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn fetch_movers(&self) -> Result<MarketMovers, CoreError> {
        self.calls.lock().push("movers".into());
        self.movers
            .lock()
            .clone()
            .map_err(|message| CoreError::Remote {
                status: 503,
                message,
            })
    }

    async fn fetch_overview(&self, symbol: &str) -> Result<StockOverview, CoreError> {
        // Same normalization as the Alpha Vantage client.
        let symbol = symbol.trim().to_uppercase();
        self.calls.lock().push(format!("overview:{symbol}"));
        self.overviews
            .lock()
            .get(&symbol)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(symbol))
    }

    async fn search_symbols(&self, keywords: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        self.calls.lock().push(format!("search:{keywords}"));
        if !self.search_delay.is_zero() {
            tokio::time::sleep(self.search_delay).await;
        }
        Ok(vec![symbol_match(keywords)])
    }
}

pub fn overview(symbol: &str) -> StockOverview {
    StockOverview {
        symbol: symbol.into(),
        name: format!("{symbol} Inc"),
        market_capitalization: "2500000000000".into(),
        pe_ratio: "28.5".into(),
        ..StockOverview::default()
    }
}

pub fn repository_with(provider: Arc<MockQuoteProvider>) -> Arc<StockRepository> {
    let store = WatchlistStore::open_in_memory().expect("in-memory store");
    Arc::new(StockRepository::new(provider, store))
}
