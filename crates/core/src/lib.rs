pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;
pub mod viewmodels;

use std::sync::Arc;

use config::AppConfig;
use errors::CoreError;
use providers::alphavantage::AlphaVantageClient;
use providers::traits::QuoteProvider;
use services::stock_repository::StockRepository;
use storage::preferences_store::PreferencesStore;
use storage::watchlist_store::WatchlistStore;
use viewmodels::{
    home::HomeViewModel, preferences::PreferencesViewModel, search::SearchViewModel,
    stock_detail::StockDetailViewModel, watchlist::WatchlistViewModel,
    watchlist_detail::WatchlistDetailViewModel,
};

/// Main entry point for the Stocks Companion core library.
///
/// Owns the process-wide handles (quote client, watchlist database,
/// preferences file) and hands them to view models explicitly. The stores
/// close when the last handle referencing them is dropped.
#[must_use]
pub struct StocksCompanion {
    config: AppConfig,
    repository: Arc<StockRepository>,
    preferences: PreferencesStore,
}

impl std::fmt::Debug for StocksCompanion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StocksCompanion")
            .field("provider", &self.repository.provider_name())
            .field("database_path", &self.config.database_path)
            .field("preferences_path", &self.config.preferences_path)
            .finish()
    }
}

impl StocksCompanion {
    /// Validate `config`, open both stores and build the Alpha Vantage client.
    pub fn open(config: AppConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let provider: Arc<dyn QuoteProvider> = Arc::new(AlphaVantageClient::from_config(&config));
        Self::with_provider(config, provider)
    }

    /// Like [`open`](Self::open) but with a caller-supplied quote source.
    /// The API key is not required here.
    pub fn with_provider(
        config: AppConfig,
        provider: Arc<dyn QuoteProvider>,
    ) -> Result<Self, CoreError> {
        let watchlists = match &config.database_path {
            Some(path) => WatchlistStore::open(path)?,
            None => WatchlistStore::open_in_memory()?,
        };
        let preferences = match &config.preferences_path {
            Some(path) => PreferencesStore::open(path)?,
            None => PreferencesStore::in_memory(),
        };
        log::info!("Stocks Companion ready (provider: {})", provider.name());

        Ok(Self {
            repository: Arc::new(StockRepository::new(provider, watchlists)),
            preferences,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn repository(&self) -> Arc<StockRepository> {
        Arc::clone(&self.repository)
    }

    pub fn preferences(&self) -> PreferencesStore {
        self.preferences.clone()
    }

    // ── View models ─────────────────────────────────────────────────
    // Those with background work need a running Tokio runtime.

    pub fn home(&self) -> HomeViewModel {
        HomeViewModel::new(self.repository())
    }

    pub fn search(&self) -> SearchViewModel {
        SearchViewModel::new(self.repository(), self.preferences(), self.config.search)
    }

    pub fn stock_detail(&self) -> StockDetailViewModel {
        StockDetailViewModel::new(self.repository())
    }

    pub fn watchlists(&self) -> WatchlistViewModel {
        WatchlistViewModel::new(self.repository())
    }

    pub fn watchlist_detail(&self) -> WatchlistDetailViewModel {
        WatchlistDetailViewModel::new(self.repository(), self.config.watchlist_refresh_interval())
    }

    pub fn theme(&self) -> PreferencesViewModel {
        PreferencesViewModel::new(self.preferences())
    }
}
