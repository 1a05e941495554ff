use futures::StreamExt;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::models::quote::{MarketMovers, StockQuote};
use crate::models::resource::NetworkResult;
use crate::services::stock_repository::StockRepository;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchlistDetailState {
    pub is_loading: bool,
    pub is_refreshing: bool,
    /// Watchlist symbols that appear in today's movers, one row per ticker.
    pub stocks: Vec<StockQuote>,
    /// Mean change percentage over `stocks`; zero when empty.
    pub average_change: f64,
    pub error: Option<String>,
}

struct DetailShared {
    repository: Arc<StockRepository>,
    state: watch::Sender<WatchlistDetailState>,
}

impl DetailShared {
    async fn load(&self, watchlist_id: i64) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let symbols = match self.repository.stock_symbols(watchlist_id) {
            Ok(symbols) => symbols,
            Err(e) => {
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.error = Some(format!("Failed to load watchlist: {e}"));
                });
                return;
            }
        };

        if symbols.is_empty() {
            self.state.send_modify(|state| {
                state.is_loading = false;
                state.stocks.clear();
                state.average_change = 0.0;
            });
            return;
        }

        let wanted: HashSet<String> = symbols.into_iter().collect();
        let mut events = self.repository.top_gainers_losers();
        while let Some(event) = events.next().await {
            match event {
                NetworkResult::Loading => {}
                NetworkResult::Success(movers) => {
                    let stocks = quotes_for(&movers, &wanted);
                    let average_change = average_change(&stocks);
                    self.state.send_modify(|state| {
                        state.is_loading = false;
                        state.stocks = stocks;
                        state.average_change = average_change;
                        state.error = None;
                    });
                }
                NetworkResult::Error(message) => {
                    debug!("Watchlist {watchlist_id} quotes failed: {message}");
                    self.state.send_modify(|state| {
                        state.is_loading = false;
                        state.error = Some("Failed to load stock data".to_string());
                    });
                }
            }
        }
    }

    async fn refresh(&self, watchlist_id: i64) {
        self.state.send_modify(|state| state.is_refreshing = true);
        self.load(watchlist_id).await;
        self.state.send_modify(|state| state.is_refreshing = false);
    }
}

/// Quotes from the movers snapshot whose ticker is in `wanted`, first
/// occurrence only (a ticker can be both a gainer and most-active).
fn quotes_for(movers: &MarketMovers, wanted: &HashSet<String>) -> Vec<StockQuote> {
    let mut seen = HashSet::new();
    movers
        .all_quotes()
        .filter(|q| wanted.contains(&q.ticker) && seen.insert(q.ticker.clone()))
        .cloned()
        .collect()
}

fn average_change(stocks: &[StockQuote]) -> f64 {
    if stocks.is_empty() {
        return 0.0;
    }
    stocks
        .iter()
        .map(StockQuote::change_percentage_value)
        .sum::<f64>()
        / stocks.len() as f64
}

/// One watchlist's symbols with today's numbers, optionally refreshed on a
/// fixed interval while the screen is alive.
pub struct WatchlistDetailViewModel {
    shared: Arc<DetailShared>,
    refresh_interval: Duration,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl WatchlistDetailViewModel {
    pub fn new(repository: Arc<StockRepository>, refresh_interval: Duration) -> Self {
        let (state, _rx) = watch::channel(WatchlistDetailState::default());
        Self {
            shared: Arc::new(DetailShared { repository, state }),
            refresh_interval,
            refresh_task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> WatchlistDetailState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WatchlistDetailState> {
        self.shared.state.subscribe()
    }

    pub async fn load(&self, watchlist_id: i64) {
        self.shared.load(watchlist_id).await;
    }

    pub async fn refresh(&self, watchlist_id: i64) {
        self.shared.refresh(watchlist_id).await;
    }

    pub async fn remove_stock(&self, watchlist_id: i64, symbol: &str) {
        match self
            .shared
            .repository
            .remove_stock_from_watchlist(watchlist_id, symbol)
        {
            Ok(_) => self.load(watchlist_id).await,
            Err(e) => self.shared.state.send_modify(|state| {
                state.error = Some(format!("Failed to remove stock: {e}"));
            }),
        }
    }

    /// Refresh every `refresh_interval`, skipping ticks while a load is in
    /// flight. Replaces any previous timer; a zero interval disables it.
    /// Requires a Tokio runtime.
    pub fn start_auto_refresh(&self, watchlist_id: i64) {
        if self.refresh_interval.is_zero() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let period = self.refresh_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if shared.state.borrow().is_loading {
                    continue;
                }
                shared.refresh(watchlist_id).await;
            }
        });

        if let Some(previous) = self.refresh_task.lock().replace(handle) {
            previous.abort();
        }
    }

    pub fn stop_auto_refresh(&self) {
        if let Some(handle) = self.refresh_task.lock().take() {
            handle.abort();
        }
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.refresh_task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for WatchlistDetailViewModel {
    fn drop(&mut self) {
        self.stop_auto_refresh();
    }
}
