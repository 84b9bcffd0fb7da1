//! Core series types shared by the processor, detector and store

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of raw price/fundamentals data
///
/// Every numeric field is optional: fundamentals are not published daily and
/// upstream feeds leave holes in price data too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub price_to_book: Option<f64>,
    #[serde(default)]
    pub bvps: Option<f64>,
    #[serde(default)]
    pub enterprise_value: Option<f64>,
}

impl RawBar {
    /// Bar with only a date and a close, the minimum the indicators need
    pub fn with_close(date: NaiveDate, close: Option<f64>) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
            price_to_book: None,
            bvps: None,
            enterprise_value: None,
        }
    }
}

/// Raw bar enriched with moving averages
///
/// `sma50`/`sma200` stay `None` until the trailing window is complete and
/// gap-free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub price_to_book: Option<f64>,
    pub bvps: Option<f64>,
    pub enterprise_value: Option<f64>,
}

impl MetricRecord {
    /// Copy `bar` and attach the averages
    ///
    /// Non-finite prices and fundamentals become `None`, the same value SQLite
    /// reads back for a stored NaN.
    pub fn from_bar(bar: &RawBar, sma50: Option<f64>, sma200: Option<f64>) -> Self {
        Self {
            date: bar.date,
            open: finite(bar.open),
            high: finite(bar.high),
            low: finite(bar.low),
            close: finite(bar.close),
            volume: bar.volume,
            sma50,
            sma200,
            price_to_book: finite(bar.price_to_book),
            bvps: finite(bar.bvps),
            enterprise_value: finite(bar.enterprise_value),
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    GoldenCross,
    DeathCross,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::GoldenCross => "golden_cross",
            SignalType::DeathCross => "death_cross",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "golden_cross" => Some(SignalType::GoldenCross),
            "death_cross" => Some(SignalType::DeathCross),
            _ => None,
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detected crossover, keyed by `(ticker, date, signal_type)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub ticker: String,
    pub date: NaiveDate,
    pub signal_type: SignalType,
    #[serde(default = "empty_meta")]
    pub meta: serde_json::Value,
}

fn empty_meta() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl SignalEvent {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, signal_type: SignalType) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            signal_type,
            meta: empty_meta(),
        }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = meta;
        self
    }
}
