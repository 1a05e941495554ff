use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::watchlist::Watchlist;
use crate::services::stock_repository::StockRepository;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchlistState {
    /// True until the first snapshot from the store arrives.
    pub is_loading: bool,
    /// Newest first.
    pub watchlists: Vec<Watchlist>,
    pub error: Option<String>,
}

/// Watchlists overview: list, create, delete.
///
/// The list follows the store in the background; must be created inside a
/// Tokio runtime.
pub struct WatchlistViewModel {
    repository: Arc<StockRepository>,
    state: watch::Sender<WatchlistState>,
    follow_task: JoinHandle<()>,
}

impl WatchlistViewModel {
    pub fn new(repository: Arc<StockRepository>) -> Self {
        let (state, _rx) = watch::channel(WatchlistState {
            is_loading: true,
            ..WatchlistState::default()
        });

        let mut updates = repository.all_watchlists();
        let publisher = state.clone();
        let follow_task = tokio::spawn(async move {
            while let Some(update) = updates.next().await {
                publisher.send_modify(|state| {
                    state.is_loading = false;
                    match update {
                        Ok(lists) => state.watchlists = lists,
                        Err(e) => state.error = Some(format!("Failed to load watchlists: {e}")),
                    }
                });
            }
        });

        Self {
            repository,
            state,
            follow_task,
        }
    }

    pub fn state(&self) -> WatchlistState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WatchlistState> {
        self.state.subscribe()
    }

    pub fn create_watchlist(&self, name: &str) -> Option<i64> {
        match self.repository.create_watchlist(name) {
            Ok(id) => Some(id),
            Err(e) => {
                self.set_error(format!("Failed to create watchlist: {e}"));
                None
            }
        }
    }

    pub fn delete_watchlist(&self, watchlist: &Watchlist) {
        if let Err(e) = self.repository.delete_watchlist(watchlist) {
            self.set_error(format!("Failed to delete watchlist: {e}"));
        }
    }

    /// Number of symbols in a watchlist. A read failure is reported through
    /// the state's `error` and counts as zero.
    pub fn stock_count(&self, watchlist_id: i64) -> usize {
        match self.repository.stock_count(watchlist_id) {
            Ok(count) => count,
            Err(e) => {
                self.set_error(format!("Failed to count stocks: {e}"));
                0
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.error = None);
    }

    fn set_error(&self, message: String) {
        self.state.send_modify(|state| state.error = Some(message));
    }
}

impl Drop for WatchlistViewModel {
    fn drop(&mut self) {
        self.follow_task.abort();
    }
}
