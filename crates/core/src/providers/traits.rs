use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::overview::StockOverview;
use crate::models::quote::MarketMovers;
use crate::models::search::SymbolMatch;

/// Trait abstraction for the remote quote source.
///
/// Each call is a single request/response round-trip: no retry, no
/// pagination, no streaming. The repository depends only on this trait,
/// so tests and alternative back-ends plug in without touching it.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Today's top gainers, top losers and most actively traded symbols.
    async fn fetch_movers(&self) -> Result<MarketMovers, CoreError>;

    /// Fundamentals for one symbol. Fails with [`CoreError::NotFound`]
    /// when the upstream record carries no symbol.
    async fn fetch_overview(&self, symbol: &str) -> Result<StockOverview, CoreError>;

    /// Symbol search by keywords. An empty list is a valid answer.
    async fn search_symbols(&self, keywords: &str) -> Result<Vec<SymbolMatch>, CoreError>;
}
