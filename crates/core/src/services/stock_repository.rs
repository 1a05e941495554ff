use futures::stream::{self, BoxStream, StreamExt};
use log::debug;
use std::future::Future;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::overview::StockOverview;
use crate::models::quote::MarketMovers;
use crate::models::resource::NetworkResult;
use crate::models::search::SymbolMatch;
use crate::models::watchlist::{Watchlist, WatchlistStock};
use crate::providers::traits::QuoteProvider;
use crate::storage::watchlist_store::{Observed, WatchlistStore};

/// Stream of one remote call: `Loading`, then exactly one terminal event.
pub type ResultStream<T> = BoxStream<'static, NetworkResult<T>>;

/// Single entry point for screens.
///
/// Remote reads are exposed as tri-state streams; watchlist operations
/// delegate to the [`WatchlistStore`] unchanged.
pub struct StockRepository {
    provider: Arc<dyn QuoteProvider>,
    watchlists: WatchlistStore,
}

impl StockRepository {
    pub fn new(provider: Arc<dyn QuoteProvider>, watchlists: WatchlistStore) -> Self {
        Self {
            provider,
            watchlists,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn watchlist_store(&self) -> &WatchlistStore {
        &self.watchlists
    }

    // ── Remote ──────────────────────────────────────────────────────

    pub fn top_gainers_losers(&self) -> ResultStream<MarketMovers> {
        let provider = Arc::clone(&self.provider);
        tri_state(async move { provider.fetch_movers().await })
    }

    pub fn stock_overview(&self, symbol: &str) -> ResultStream<StockOverview> {
        let provider = Arc::clone(&self.provider);
        let symbol = symbol.to_string();
        tri_state(async move { provider.fetch_overview(&symbol).await })
    }

    pub fn search_symbol(&self, query: &str) -> ResultStream<Vec<SymbolMatch>> {
        let provider = Arc::clone(&self.provider);
        let query = query.to_string();
        tri_state(async move { provider.search_symbols(&query).await })
    }

    // ── Watchlists ──────────────────────────────────────────────────

    pub fn all_watchlists(&self) -> Observed<Vec<Watchlist>> {
        self.watchlists.observe_watchlists()
    }

    /// Point-in-time list, newest first.
    pub fn list_watchlists(&self) -> Result<Vec<Watchlist>, CoreError> {
        self.watchlists.watchlists()
    }

    pub fn watchlist_stocks(&self, watchlist_id: i64) -> Observed<Vec<WatchlistStock>> {
        self.watchlists.observe_stocks(watchlist_id)
    }

    pub fn stock_symbols(&self, watchlist_id: i64) -> Result<Vec<String>, CoreError> {
        self.watchlists.symbols(watchlist_id)
    }

    pub fn stock_count(&self, watchlist_id: i64) -> Result<usize, CoreError> {
        self.watchlists.stock_count(watchlist_id)
    }

    /// Coarse "bookmarked" flag: true if the symbol is in any watchlist.
    pub fn is_stock_in_any_watchlist(&self, symbol: &str) -> Result<bool, CoreError> {
        self.watchlists.is_symbol_in_any_watchlist(symbol)
    }

    pub fn create_watchlist(&self, name: &str) -> Result<i64, CoreError> {
        self.watchlists.create_watchlist(name)
    }

    pub fn add_stock_to_watchlist(&self, watchlist_id: i64, symbol: &str) -> Result<bool, CoreError> {
        self.watchlists.add_stock(watchlist_id, symbol)
    }

    pub fn remove_stock_from_watchlist(
        &self,
        watchlist_id: i64,
        symbol: &str,
    ) -> Result<usize, CoreError> {
        self.watchlists.remove_stock(watchlist_id, symbol)
    }

    pub fn delete_watchlist(&self, watchlist: &Watchlist) -> Result<(), CoreError> {
        self.watchlists.delete_watchlist(watchlist)
    }
}

/// Wrap a fallible call as `Loading` followed by its outcome. The call runs
/// only when the stream is polled past the first event.
fn tri_state<T, F>(call: F) -> ResultStream<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, CoreError>> + Send + 'static,
{
    let outcome = async move {
        let result = call.await;
        if let Err(e) = &result {
            debug!("Remote call failed: {e}");
        }
        NetworkResult::from(result)
    };

    stream::once(async { NetworkResult::Loading })
        .chain(stream::once(outcome))
        .boxed()
}
