use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::models::quote::{MarketMovers, StockQuote};
use crate::models::resource::NetworkResult;
use crate::services::stock_repository::StockRepository;

/// Which movers list a "view all" screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Gainers,
    Losers,
    MostActive,
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gainers" => Ok(Section::Gainers),
            "losers" => Ok(Section::Losers),
            "active" => Ok(Section::MostActive),
            other => Err(format!("Unknown section: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeState {
    pub is_loading: bool,
    pub top_gainers: Vec<StockQuote>,
    pub top_losers: Vec<StockQuote>,
    pub most_active: Vec<StockQuote>,
    pub last_updated: String,
    pub error: Option<String>,
}

impl HomeState {
    pub fn has_data(&self) -> bool {
        !self.top_gainers.is_empty() || !self.top_losers.is_empty() || !self.most_active.is_empty()
    }

    pub fn section(&self, section: Section) -> &[StockQuote] {
        match section {
            Section::Gainers => &self.top_gainers,
            Section::Losers => &self.top_losers,
            Section::MostActive => &self.most_active,
        }
    }

    /// Fold one repository event into the state. Previous lists survive an
    /// error so the screen can keep showing them.
    fn apply(&mut self, event: NetworkResult<MarketMovers>) {
        match event {
            NetworkResult::Loading => {
                self.is_loading = true;
                self.error = None;
            }
            NetworkResult::Success(movers) => {
                self.is_loading = false;
                self.top_gainers = movers.top_gainers;
                self.top_losers = movers.top_losers;
                self.most_active = movers.most_active;
                self.last_updated = movers.last_updated;
                self.error = None;
            }
            NetworkResult::Error(message) => {
                self.is_loading = false;
                self.error = Some(message);
            }
        }
    }
}

/// Home screen: market movers.
pub struct HomeViewModel {
    repository: Arc<StockRepository>,
    state: watch::Sender<HomeState>,
}

impl HomeViewModel {
    pub fn new(repository: Arc<StockRepository>) -> Self {
        let (state, _rx) = watch::channel(HomeState::default());
        Self { repository, state }
    }

    pub fn state(&self) -> HomeState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.state.subscribe()
    }

    pub async fn load_market_data(&self) {
        let mut events = self.repository.top_gainers_losers();
        while let Some(event) = events.next().await {
            self.state.send_modify(|state| state.apply(event));
        }
    }

    pub async fn refresh(&self) {
        self.load_market_data().await;
    }

    /// Load only if nothing is shown and nothing is in flight.
    pub async fn ensure_loaded(&self) {
        let idle_and_empty = {
            let state = self.state.borrow();
            !state.has_data() && !state.is_loading
        };
        if idle_and_empty {
            self.load_market_data().await;
        }
    }

    pub fn section(&self, section: Section) -> Vec<StockQuote> {
        self.state.borrow().section(section).to_vec()
    }
}
