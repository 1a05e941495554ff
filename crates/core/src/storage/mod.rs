pub mod migrations;
pub mod preferences_store;
pub mod watchlist_store;
