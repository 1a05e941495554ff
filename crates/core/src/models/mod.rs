pub mod overview;
pub mod preferences;
pub mod quote;
pub mod resource;
pub mod search;
pub mod watchlist;
