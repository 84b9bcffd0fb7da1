//! Data sources supplying the raw daily series
//!
//! A source returns bars in the order it received them plus a provenance
//! marker telling which fundamentals (if any) were attached. Ordering is
//! checked by the processor, not repaired here. The marker is passed through to
//! the report; the analysis core never looks at it.

pub mod json_file;
pub mod yahoo;

pub use json_file::JsonFileSource;
pub use yahoo::YahooChartSource;

use crate::analysis::RawBar;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FUNDAMENTALS_NONE: &str = "none";
pub const FUNDAMENTALS_SNAPSHOT: &str = "snapshot";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{source_name} returned status {status} for {ticker}")]
    Status {
        source_name: &'static str,
        ticker: String,
        status: u16,
    },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("no bars available for {0}")]
    Empty(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

/// Raw series for one ticker as delivered by a source
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedSeries {
    pub ticker: String,
    pub bars: Vec<RawBar>,
    pub fundamentals_used: String,
}

/// Point-in-time fundamentals applied to every bar lacking its own values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    #[serde(default)]
    pub price_to_book: Option<f64>,
    #[serde(default)]
    pub bvps: Option<f64>,
    #[serde(default)]
    pub enterprise_value: Option<f64>,
}

impl Fundamentals {
    pub fn is_empty(&self) -> bool {
        self.price_to_book.is_none() && self.bvps.is_none() && self.enterprise_value.is_none()
    }

    /// Fill absent fundamentals; values already on a bar win
    pub fn apply_to(&self, bars: &mut [RawBar]) {
        for bar in bars {
            bar.price_to_book = bar.price_to_book.or(self.price_to_book);
            bar.bvps = bar.bvps.or(self.bvps);
            bar.enterprise_value = bar.enterprise_value.or(self.enterprise_value);
        }
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the full daily history for `ticker`
    async fn fetch(&self, ticker: &str) -> Result<SourcedSeries, SourceError>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}
