//! Screen state holders. Each publishes an immutable state record through a
//! `tokio::sync::watch` channel and turns user actions into repository calls.

pub mod home;
pub mod preferences;
pub mod search;
pub mod stock_detail;
pub mod watchlist;
pub mod watchlist_detail;
