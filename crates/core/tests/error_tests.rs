// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use stocks_companion_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn remote() {
        let err = CoreError::Remote {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "Error: 503 - Service Unavailable");
    }

    #[test]
    fn empty_response() {
        assert_eq!(CoreError::EmptyResponse.to_string(), "Empty response");
    }

    #[test]
    fn not_found() {
        let err = CoreError::NotFound("ZZZZ".into());
        assert_eq!(err.to_string(), "Stock not found: ZZZZ");
    }

    #[test]
    fn api() {
        let err = CoreError::Api {
            provider: "Alpha Vantage".into(),
            message: "rate limit".into(),
        };
        assert_eq!(err.to_string(), "API error (Alpha Vantage): rate limit");
    }

    #[test]
    fn local_store() {
        let err = CoreError::LocalStore("disk full".into());
        assert_eq!(err.to_string(), "Local store error: disk full");
    }

    #[test]
    fn decode() {
        let err = CoreError::Decode("bad json".into());
        assert_eq!(err.to_string(), "Decode error: bad json");
    }

    #[test]
    fn validation() {
        let err = CoreError::Validation("name empty".into());
        assert_eq!(err.to_string(), "Validation failed: name empty");
    }
}

// ── From conversions ────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(ref m) if m.contains("missing file")));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Decode(_)));
    }

    #[test]
    fn from_rusqlite_error() {
        let err: CoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, CoreError::LocalStore(_)));
    }
}

// ── Classification ──────────────────────────────────────────────────

#[test]
fn only_network_errors_count_as_connectivity() {
    assert!(CoreError::Network("connection refused".into()).is_connectivity());
    assert!(!CoreError::EmptyResponse.is_connectivity());
    assert!(!CoreError::Remote {
        status: 500,
        message: "Internal Server Error".into()
    }
    .is_connectivity());
}
