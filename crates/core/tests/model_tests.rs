// ═══════════════════════════════════════════════════════════════════
// Model Tests — quotes, overview formatting, search, statistics
// ═══════════════════════════════════════════════════════════════════

use stocks_companion_core::models::overview::StockOverview;
use stocks_companion_core::models::preferences::{SearchStatistics, MAX_COMMON_SEARCHES};
use stocks_companion_core::models::quote::{
    format_currency, format_percentage, parse_f64, MarketMovers, StockQuote,
};
use stocks_companion_core::models::resource::NetworkResult;
use stocks_companion_core::models::search::SymbolSearchResponse;
use stocks_companion_core::errors::CoreError;

fn quote_with_change(change_amount: &str) -> StockQuote {
    StockQuote {
        ticker: "AAPL".into(),
        change_amount: change_amount.into(),
        ..StockQuote::default()
    }
}

// ── StockQuote ──────────────────────────────────────────────────────

mod stock_quote {
    use super::*;

    #[test]
    fn positive_change() {
        assert!(quote_with_change("+2.5").is_positive_change());
        assert!(quote_with_change("2.5").is_positive_change());
    }

    #[test]
    fn negative_change() {
        assert!(!quote_with_change("-1.0").is_positive_change());
    }

    #[test]
    fn unparsable_change_counts_as_zero_and_positive() {
        let q = quote_with_change("n/a");
        assert_eq!(q.change_amount_value(), 0.0);
        assert!(q.is_positive_change());
    }

    #[test]
    fn change_percentage_strips_percent_sign() {
        let q = StockQuote {
            change_percentage: "-12.5%".into(),
            ..StockQuote::default()
        };
        assert_eq!(q.change_percentage_value(), -12.5);
    }

    #[test]
    fn formatted_volume_buckets() {
        let with_volume = |v: &str| StockQuote {
            volume: v.into(),
            ..StockQuote::default()
        };
        assert_eq!(with_volume("2500000000").formatted_volume(), "2.5B");
        assert_eq!(with_volume("3400000").formatted_volume(), "3.4M");
        assert_eq!(with_volume("5600").formatted_volume(), "5.6K");
        assert_eq!(with_volume("999").formatted_volume(), "999");
        assert_eq!(with_volume("garbage").formatted_volume(), "0");
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let q: StockQuote = serde_json::from_str(r#"{"ticker":"MSFT","price":"410.5"}"#).unwrap();
        assert_eq!(q.ticker, "MSFT");
        assert_eq!(q.price_value(), 410.5);
        assert_eq!(q.volume, "");
        assert_eq!(q.volume_value(), 0);
    }
}

// ── MarketMovers ────────────────────────────────────────────────────

#[test]
fn movers_deserialize_upstream_field_names() {
    let json = r#"{
        "metadata": "Top gainers, losers, and most actively traded US tickers",
        "last_updated": "2024-05-10 16:15:59 US/Eastern",
        "top_gainers": [{"ticker":"AAPL","price":"190.1","change_amount":"+2.5","change_percentage":"1.33%","volume":"1000"}],
        "top_losers": [],
        "most_actively_traded": [{"ticker":"TSLA","price":"170","change_amount":"-1.0","change_percentage":"-0.5%","volume":"99"}]
    }"#;
    let movers: MarketMovers = serde_json::from_str(json).unwrap();
    assert_eq!(movers.top_gainers.len(), 1);
    assert!(movers.top_gainers[0].is_positive_change());
    assert_eq!(movers.most_active[0].ticker, "TSLA");
    assert!(!movers.most_active[0].is_positive_change());
    assert_eq!(movers.all_quotes().count(), 2);
}

// ── StockOverview ───────────────────────────────────────────────────

mod overview {
    use super::*;

    fn with_cap(cap: &str) -> StockOverview {
        StockOverview {
            market_capitalization: cap.into(),
            ..StockOverview::default()
        }
    }

    #[test]
    fn market_cap_trillions() {
        assert_eq!(with_cap("2500000000000").formatted_market_cap(), "$2.50T");
    }

    #[test]
    fn market_cap_billions_and_millions() {
        assert_eq!(with_cap("1200000000").formatted_market_cap(), "$1.20B");
        assert_eq!(with_cap("3400000").formatted_market_cap(), "$3.40M");
    }

    #[test]
    fn market_cap_small_and_invalid() {
        assert_eq!(with_cap("950000").formatted_market_cap(), "$950000");
        assert_eq!(with_cap("None").formatted_market_cap(), "N/A");
        assert_eq!(with_cap("").formatted_market_cap(), "N/A");
    }

    #[test]
    fn ratios() {
        let o = StockOverview {
            pe_ratio: "28.5".into(),
            return_on_equity_ttm: "0.1523".into(),
            dividend_yield: "None".into(),
            ..StockOverview::default()
        };
        assert_eq!(o.formatted_pe_ratio(), "28.5");
        assert_eq!(o.formatted_roe(), "15.23%");
        assert_eq!(o.formatted_dividend_yield(), "N/A");
        assert_eq!(StockOverview::default().formatted_pe_ratio(), "N/A");
    }

    #[test]
    fn deserializes_pascal_case_fields() {
        let json = r#"{"Symbol":"IBM","Name":"International Business Machines",
            "MarketCapitalization":"180000000000","52WeekHigh":"199.18",
            "50DayMovingAverage":"170.2","Unknown":"ignored"}"#;
        let o: StockOverview = serde_json::from_str(json).unwrap();
        assert!(o.is_found());
        assert_eq!(o.name, "International Business Machines");
        assert_eq!(o.week_52_high, "199.18");
        assert_eq!(o.moving_average_50_day, "170.2");
        assert_eq!(o.sector, "");
        assert_eq!(o.formatted_market_cap(), "$180.00B");
    }

    #[test]
    fn empty_object_is_not_found() {
        let o: StockOverview = serde_json::from_str("{}").unwrap();
        assert!(!o.is_found());
    }
}

// ── Symbol search ───────────────────────────────────────────────────

#[test]
fn search_response_numbered_keys() {
    let json = r#"{"bestMatches":[{"1. symbol":"TSCO.LON","2. name":"Tesco PLC","3. type":"Equity",
        "4. region":"United Kingdom","5. marketOpen":"08:00","6. marketClose":"16:30",
        "7. timezone":"UTC+01","8. currency":"GBX","9. matchScore":"0.7273"}]}"#;
    let resp: SymbolSearchResponse = serde_json::from_str(json).unwrap();
    let m = &resp.best_matches[0];
    assert_eq!(m.symbol, "TSCO.LON");
    assert_eq!(m.region, "United Kingdom");
    assert_eq!(m.currency, "GBX");
    assert!((m.match_score_value() - 0.7273).abs() < 1e-9);
}

#[test]
fn search_response_without_matches_is_empty() {
    let resp: SymbolSearchResponse = serde_json::from_str("{}").unwrap();
    assert!(resp.best_matches.is_empty());
}

// ── SearchStatistics ────────────────────────────────────────────────

mod statistics {
    use super::*;

    #[test]
    fn record_counts_and_sorts() {
        let mut stats = SearchStatistics::default();
        stats.record("AAPL");
        stats.record("TSLA");
        stats.record("TSLA");

        assert_eq!(stats.total_searches, 3);
        assert_eq!(stats.most_common_searches[0].query, "TSLA");
        assert_eq!(stats.most_common_searches[0].count, 2);
        assert_eq!(stats.most_common_searches[1].query, "AAPL");
    }

    #[test]
    fn full_table_of_ties_drops_new_queries() {
        let mut stats = SearchStatistics::default();
        for i in 0..15 {
            stats.record(&format!("Q{i}"));
        }
        stats.record("Q14");

        assert_eq!(stats.total_searches, 16);
        assert_eq!(stats.most_common_searches.len(), MAX_COMMON_SEARCHES);
        assert_eq!(stats.most_common_searches[0].query, "Q0");
        assert!(stats
            .most_common_searches
            .iter()
            .all(|entry| entry.query != "Q14" && entry.count == 1));
    }

    #[test]
    fn repeated_entry_in_full_table_moves_up() {
        let mut stats = SearchStatistics::default();
        for i in 0..10 {
            stats.record(&format!("Q{i}"));
        }
        stats.record("Q7");

        assert_eq!(stats.most_common_searches[0].query, "Q7");
        assert_eq!(stats.most_common_searches[0].count, 2);
        assert_eq!(stats.most_common_searches.len(), MAX_COMMON_SEARCHES);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

#[test]
fn lenient_parse() {
    assert_eq!(parse_f64(" 1.5 "), 1.5);
    assert_eq!(parse_f64("+2.5"), 2.5);
    assert_eq!(parse_f64("None"), 0.0);
    assert_eq!(parse_f64("NaN"), 0.0);
}

#[test]
fn currency_and_percentage_formatting() {
    assert_eq!(format_currency(1234.5), "$1,234.50");
    assert_eq!(format_currency(1234567.891), "$1,234,567.89");
    assert_eq!(format_currency(-0.5), "-$0.50");
    assert_eq!(format_currency(0.0), "$0.00");
    assert_eq!(format_percentage(1.2345), "1.23%");
}

// ── NetworkResult ───────────────────────────────────────────────────

#[test]
fn network_result_helpers() {
    let loading: NetworkResult<u8> = NetworkResult::Loading;
    assert!(loading.is_loading());
    assert!(!loading.is_terminal());

    let ok = NetworkResult::<u8>::from(Ok(7));
    assert_eq!(ok.data(), Some(&7));
    assert_eq!(ok.clone().map(|v| v * 2), NetworkResult::Success(14));

    let err = NetworkResult::<u8>::from(Err(CoreError::EmptyResponse));
    assert_eq!(err.error(), Some("Empty response"));
    assert!(err.is_terminal());
}
