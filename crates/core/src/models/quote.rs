use serde::{Deserialize, Serialize};

/// One row of the movers snapshot (top gainer, loser or most-active).
///
/// Alpha Vantage sends every field as a string. Numeric accessors parse
/// defensively and fall back to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockQuote {
    pub ticker: String,
    pub price: String,
    pub change_amount: String,
    /// e.g. "12.3456%"
    pub change_percentage: String,
    pub volume: String,
}

impl StockQuote {
    pub fn price_value(&self) -> f64 {
        parse_f64(&self.price)
    }

    pub fn change_amount_value(&self) -> f64 {
        parse_f64(&self.change_amount)
    }

    /// Change percentage with the trailing `%` stripped.
    pub fn change_percentage_value(&self) -> f64 {
        parse_f64(&self.change_percentage.replace('%', ""))
    }

    pub fn volume_value(&self) -> i64 {
        self.volume.trim().parse().unwrap_or(0)
    }

    /// Zero change counts as positive.
    pub fn is_positive_change(&self) -> bool {
        self.change_amount_value() >= 0.0
    }

    /// Compact volume: `1.2B`, `3.4M`, `5.6K`, raw below one thousand.
    pub fn formatted_volume(&self) -> String {
        let vol = self.volume_value();
        match vol {
            v if v >= 1_000_000_000 => format!("{:.1}B", v as f64 / 1_000_000_000.0),
            v if v >= 1_000_000 => format!("{:.1}M", v as f64 / 1_000_000.0),
            v if v >= 1_000 => format!("{:.1}K", v as f64 / 1_000.0),
            v => v.to_string(),
        }
    }
}

/// Response of the `TOP_GAINERS_LOSERS` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketMovers {
    pub metadata: String,
    pub last_updated: String,
    pub top_gainers: Vec<StockQuote>,
    pub top_losers: Vec<StockQuote>,
    #[serde(rename = "most_actively_traded")]
    pub most_active: Vec<StockQuote>,
}

impl MarketMovers {
    /// All quotes across the three sections, gainers first.
    pub fn all_quotes(&self) -> impl Iterator<Item = &StockQuote> {
        self.top_gainers
            .iter()
            .chain(self.top_losers.iter())
            .chain(self.most_active.iter())
    }
}

/// Lenient float parse: anything unparsable is zero.
pub fn parse_f64(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// US-dollar formatting with thousands separators: `$1,234.56`, `-$0.50`.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

/// Two-decimal percentage: `1.23%`.
pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}
