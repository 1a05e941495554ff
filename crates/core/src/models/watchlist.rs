use serde::{Deserialize, Serialize};

/// A user-named list of ticker symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchlist {
    /// Surrogate key assigned by the store.
    pub id: i64,

    pub name: String,

    /// Epoch milliseconds, set once at creation.
    pub created_at: i64,
}

/// Membership of one symbol in one watchlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistStock {
    pub id: i64,
    pub watchlist_id: i64,
    pub symbol: String,
    /// Epoch milliseconds.
    pub added_at: i64,
}
