pub mod http_cache;
pub mod traits;

// API provider implementations
pub mod alphavantage;
