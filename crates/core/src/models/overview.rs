use serde::{Deserialize, Serialize};

use super::quote::parse_f64;

/// Fundamentals snapshot from the `OVERVIEW` endpoint.
///
/// The upstream object is flat and every value is a string; absent fields
/// deserialize to empty strings. An unknown symbol comes back as `{}`,
/// so an empty `symbol` means "not found".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockOverview {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "AssetType")]
    pub asset_type: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "CIK")]
    pub cik: String,
    #[serde(rename = "Exchange")]
    pub exchange: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "OfficialSite")]
    pub official_site: String,
    #[serde(rename = "FiscalYearEnd")]
    pub fiscal_year_end: String,
    #[serde(rename = "LatestQuarter")]
    pub latest_quarter: String,
    #[serde(rename = "MarketCapitalization")]
    pub market_capitalization: String,
    #[serde(rename = "EBITDA")]
    pub ebitda: String,
    #[serde(rename = "PERatio")]
    pub pe_ratio: String,
    #[serde(rename = "PEGRatio")]
    pub peg_ratio: String,
    #[serde(rename = "BookValue")]
    pub book_value: String,
    #[serde(rename = "DividendPerShare")]
    pub dividend_per_share: String,
    #[serde(rename = "DividendYield")]
    pub dividend_yield: String,
    #[serde(rename = "EPS")]
    pub eps: String,
    #[serde(rename = "RevenuePerShareTTM")]
    pub revenue_per_share_ttm: String,
    #[serde(rename = "ProfitMargin")]
    pub profit_margin: String,
    #[serde(rename = "OperatingMarginTTM")]
    pub operating_margin_ttm: String,
    #[serde(rename = "ReturnOnAssetsTTM")]
    pub return_on_assets_ttm: String,
    #[serde(rename = "ReturnOnEquityTTM")]
    pub return_on_equity_ttm: String,
    #[serde(rename = "RevenueTTM")]
    pub revenue_ttm: String,
    #[serde(rename = "GrossProfitTTM")]
    pub gross_profit_ttm: String,
    #[serde(rename = "DilutedEPSTTM")]
    pub diluted_eps_ttm: String,
    #[serde(rename = "QuarterlyEarningsGrowthYOY")]
    pub quarterly_earnings_growth_yoy: String,
    #[serde(rename = "QuarterlyRevenueGrowthYOY")]
    pub quarterly_revenue_growth_yoy: String,
    #[serde(rename = "AnalystTargetPrice")]
    pub analyst_target_price: String,
    #[serde(rename = "AnalystRatingStrongBuy")]
    pub analyst_rating_strong_buy: String,
    #[serde(rename = "AnalystRatingBuy")]
    pub analyst_rating_buy: String,
    #[serde(rename = "AnalystRatingHold")]
    pub analyst_rating_hold: String,
    #[serde(rename = "AnalystRatingSell")]
    pub analyst_rating_sell: String,
    #[serde(rename = "AnalystRatingStrongSell")]
    pub analyst_rating_strong_sell: String,
    #[serde(rename = "TrailingPE")]
    pub trailing_pe: String,
    #[serde(rename = "ForwardPE")]
    pub forward_pe: String,
    #[serde(rename = "PriceToSalesRatioTTM")]
    pub price_to_sales_ratio_ttm: String,
    #[serde(rename = "PriceToBookRatio")]
    pub price_to_book_ratio: String,
    #[serde(rename = "EVToRevenue")]
    pub ev_to_revenue: String,
    #[serde(rename = "EVToEBITDA")]
    pub ev_to_ebitda: String,
    #[serde(rename = "Beta")]
    pub beta: String,
    #[serde(rename = "52WeekHigh")]
    pub week_52_high: String,
    #[serde(rename = "52WeekLow")]
    pub week_52_low: String,
    #[serde(rename = "50DayMovingAverage")]
    pub moving_average_50_day: String,
    #[serde(rename = "200DayMovingAverage")]
    pub moving_average_200_day: String,
    #[serde(rename = "SharesOutstanding")]
    pub shares_outstanding: String,
    #[serde(rename = "SharesFloat")]
    pub shares_float: String,
    #[serde(rename = "PercentInsiders")]
    pub percent_insiders: String,
    #[serde(rename = "PercentInstitutions")]
    pub percent_institutions: String,
    #[serde(rename = "DividendDate")]
    pub dividend_date: String,
    #[serde(rename = "ExDividendDate")]
    pub ex_dividend_date: String,
}

impl StockOverview {
    /// `$2.50T`, `$1.20B`, `$3.40M`, plain dollars below a million,
    /// `N/A` when the upstream value is not an integer.
    pub fn formatted_market_cap(&self) -> String {
        let Ok(cap) = self.market_capitalization.trim().parse::<i64>() else {
            return "N/A".to_string();
        };
        match cap {
            c if c >= 1_000_000_000_000 => format!("${:.2}T", c as f64 / 1_000_000_000_000.0),
            c if c >= 1_000_000_000 => format!("${:.2}B", c as f64 / 1_000_000_000.0),
            c if c >= 1_000_000 => format!("${:.2}M", c as f64 / 1_000_000.0),
            c => format!("${c}"),
        }
    }

    pub fn formatted_pe_ratio(&self) -> String {
        if is_missing(&self.pe_ratio) {
            "N/A".to_string()
        } else {
            self.pe_ratio.clone()
        }
    }

    pub fn formatted_roe(&self) -> String {
        ratio_as_percent(&self.return_on_equity_ttm)
    }

    pub fn formatted_dividend_yield(&self) -> String {
        ratio_as_percent(&self.dividend_yield)
    }

    pub fn is_found(&self) -> bool {
        !self.symbol.trim().is_empty()
    }
}

/// Alpha Vantage uses the literal string "None" for absent numbers.
fn is_missing(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw == "None" || raw == "-"
}

/// "0.0152" → "1.52%".
fn ratio_as_percent(raw: &str) -> String {
    if is_missing(raw) {
        return "N/A".to_string();
    }
    format!("{:.2}%", parse_f64(raw) * 100.0)
}
