use thiserror::Error;

/// Unified error type for the entire stocks-companion-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    /// Upstream answered with a non-2xx status.
    #[error("Error: {status} - {message}")]
    Remote { status: u16, message: String },

    #[error("Empty response")]
    EmptyResponse,

    /// Overview lookup returned a record without a symbol.
    #[error("Stock not found: {0}")]
    NotFound(String),

    /// Upstream answered 200 but the payload is an error/notice object
    /// (invalid call, rate limit, premium endpoint).
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    // ── Local persistence ───────────────────────────────────────────
    #[error("Local store error: {0}")]
    LocalStore(String),

    /// Malformed persisted data. Recovered locally wherever a default exists.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CoreError {
    /// True for failures where no response reached us at all
    /// (DNS, refused connection, timeout). Used by the stale-cache fallback.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, CoreError::Network(_))
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Decode(e.to_string())
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(e: rusqlite::Error) -> Self {
        CoreError::LocalStore(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs to prevent
        // API key leakage. reqwest errors often contain full URLs with secrets.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
