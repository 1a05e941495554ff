// ═══════════════════════════════════════════════════════════════════
// Integration Tests — StocksCompanion wiring, config, persistence
// ═══════════════════════════════════════════════════════════════════

mod common;

use std::sync::Arc;
use tempfile::tempdir;

use common::{overview, MockQuoteProvider};
use stocks_companion_core::config::{AppConfig, DEFAULT_BASE_URL};
use stocks_companion_core::errors::CoreError;
use stocks_companion_core::providers::traits::QuoteProvider;
use stocks_companion_core::StocksCompanion;

fn config_in(dir: &std::path::Path) -> AppConfig {
    AppConfig {
        api_key: "demo".into(),
        database_path: Some(dir.join("watchlists.db")),
        preferences_path: Some(dir.join("preferences.json")),
        ..AppConfig::default()
    }
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn default_config() {
    let config = AppConfig::default();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.search.debounce_ms, 300);
    assert_eq!(config.search.min_query_len, 2);
    assert_eq!(config.watchlist_refresh_interval().as_secs(), 30);
    assert_eq!(config.cache.max_age_secs, 30);
}

#[test]
fn validation_rejects_missing_key_and_zero_interval() {
    let err = AppConfig::default().validate().unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let config = AppConfig {
        api_key: "demo".into(),
        watchlist_refresh_secs: 0,
        ..AppConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn config_deserializes_with_defaults() {
    let config: AppConfig = serde_json::from_str(r#"{"api_key":"k","search":{"debounce_ms":150}}"#).unwrap();
    assert_eq!(config.api_key, "k");
    assert_eq!(config.search.debounce_ms, 150);
    assert_eq!(config.search.min_query_len, 2);
    assert!(config.database_path.is_none());
}

#[test]
fn open_requires_api_key() {
    let err = StocksCompanion::open(AppConfig::default()).unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[test]
fn open_with_valid_config() {
    let dir = tempdir().unwrap();
    let app = StocksCompanion::open(config_in(dir.path())).unwrap();
    assert_eq!(app.repository().provider_name(), "Alpha Vantage");
    assert!(dir.path().join("watchlists.db").exists());
}

// ── Wiring ──────────────────────────────────────────────────────────

#[tokio::test]
async fn state_survives_restart() {
    let dir = tempdir().unwrap();

    {
        let provider = Arc::new(MockQuoteProvider::new().with_overview(overview("AAPL")));
        let app = StocksCompanion::with_provider(config_in(dir.path()), provider).unwrap();

        let detail = app.stock_detail();
        detail.load("AAPL").await;
        assert!(detail.create_watchlist_and_add("Tech", "AAPL").is_some());

        app.search().add_to_recent_searches("AAPL");
        app.theme().toggle_theme().unwrap();
    }

    let app = StocksCompanion::with_provider(
        config_in(dir.path()),
        Arc::new(MockQuoteProvider::new()),
    )
    .unwrap();

    let lists = app.repository().list_watchlists().unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, "Tech");
    assert!(app.repository().is_stock_in_any_watchlist("AAPL").unwrap());
    assert!(app.theme().is_dark_theme());
    assert_eq!(app.preferences().recent_searches_now(), vec!["AAPL"]);
}

#[tokio::test]
async fn in_memory_without_paths() {
    let provider = Arc::new(MockQuoteProvider::new());
    let quotes: Arc<dyn QuoteProvider> = provider.clone();
    let app = StocksCompanion::with_provider(AppConfig::default(), quotes).unwrap();

    let home = app.home();
    home.load_market_data().await;
    assert!(home.state().has_data());

    let watchlists = app.watchlists();
    let id = watchlists.create_watchlist("Scratch").unwrap();
    app.repository().add_stock_to_watchlist(id, "NVDA").unwrap();

    let detail = app.watchlist_detail();
    detail.load(id).await;
    assert_eq!(detail.state().stocks[0].ticker, "NVDA");
    assert_eq!(provider.calls_to("movers").len(), 2);
}
