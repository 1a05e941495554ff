use futures::StreamExt;
use log::warn;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::overview::StockOverview;
use crate::models::resource::NetworkResult;
use crate::models::watchlist::Watchlist;
use crate::services::stock_repository::StockRepository;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockDetailState {
    pub is_loading: bool,
    pub stock: Option<StockOverview>,
    /// True when the symbol sits in at least one watchlist.
    pub is_in_watchlist: bool,
    pub error: Option<String>,
}

/// Detail screen for one symbol, plus the "add to watchlist" sheet.
///
/// Keeps the list of watchlists current in the background; must be created
/// inside a Tokio runtime.
pub struct StockDetailViewModel {
    repository: Arc<StockRepository>,
    state: watch::Sender<StockDetailState>,
    watchlists: watch::Sender<Vec<Watchlist>>,
    watchlists_task: JoinHandle<()>,
}

impl StockDetailViewModel {
    pub fn new(repository: Arc<StockRepository>) -> Self {
        let (state, _rx) = watch::channel(StockDetailState::default());
        let (watchlists, _rx) = watch::channel(Vec::new());

        let mut updates = repository.all_watchlists();
        let publisher = watchlists.clone();
        let watchlists_task = tokio::spawn(async move {
            while let Some(update) = updates.next().await {
                match update {
                    Ok(lists) => {
                        publisher.send_replace(lists);
                    }
                    Err(e) => warn!("Watchlist stream failed: {e}"),
                }
            }
        });

        Self {
            repository,
            state,
            watchlists,
            watchlists_task,
        }
    }

    pub fn state(&self) -> StockDetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StockDetailState> {
        self.state.subscribe()
    }

    pub fn watchlists(&self) -> Vec<Watchlist> {
        self.watchlists.borrow().clone()
    }

    pub fn subscribe_watchlists(&self) -> watch::Receiver<Vec<Watchlist>> {
        self.watchlists.subscribe()
    }

    pub async fn load(&self, symbol: &str) {
        let mut events = self.repository.stock_overview(symbol);
        while let Some(event) = events.next().await {
            match event {
                NetworkResult::Loading => self.state.send_modify(|state| {
                    state.is_loading = true;
                    state.error = None;
                }),
                NetworkResult::Success(stock) => {
                    let membership = self.repository.is_stock_in_any_watchlist(&stock.symbol);
                    self.state.send_modify(|state| {
                        state.is_loading = false;
                        state.stock = Some(stock);
                        match membership {
                            Ok(found) => {
                                state.is_in_watchlist = found;
                                state.error = None;
                            }
                            Err(e) => state.error = Some(format!("Failed to check watchlists: {e}")),
                        }
                    });
                }
                NetworkResult::Error(message) => self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.error = Some(message);
                }),
            }
        }
    }

    pub fn add_to_watchlist(&self, watchlist_id: i64, symbol: &str) {
        let symbol = normalize_symbol(symbol);
        match self.repository.add_stock_to_watchlist(watchlist_id, &symbol) {
            Ok(_) => self.state.send_modify(|state| state.is_in_watchlist = true),
            Err(e) => self.set_error(format!("Failed to add to watchlist: {e}")),
        }
    }

    /// Create a watchlist and put `symbol` in it. Returns the new id.
    pub fn create_watchlist_and_add(&self, name: &str, symbol: &str) -> Option<i64> {
        let symbol = normalize_symbol(symbol);
        let result = self
            .repository
            .create_watchlist(name)
            .and_then(|id| self.repository.add_stock_to_watchlist(id, &symbol).map(|_| id));

        match result {
            Ok(id) => {
                self.state.send_modify(|state| state.is_in_watchlist = true);
                Some(id)
            }
            Err(e) => {
                self.set_error(format!("Failed to create watchlist: {e}"));
                None
            }
        }
    }

    /// Drop `symbol` from every watchlist.
    pub fn remove_from_all_watchlists(&self, symbol: &str) {
        let symbol = normalize_symbol(symbol);
        let result = self.repository.list_watchlists().and_then(|lists| {
            for list in &lists {
                self.repository.remove_stock_from_watchlist(list.id, &symbol)?;
            }
            Ok(())
        });

        match result {
            Ok(()) => self.state.send_modify(|state| state.is_in_watchlist = false),
            Err(e) => self.set_error(format!("Failed to remove from watchlist: {e}")),
        }
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.error = None);
    }

    fn set_error(&self, message: String) {
        self.state.send_modify(|state| state.error = Some(message));
    }
}

/// Same normalization the quote client applies before a lookup, so stored
/// symbols match the loaded overview.
fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

impl Drop for StockDetailViewModel {
    fn drop(&mut self) {
        self.watchlists_task.abort();
    }
}
