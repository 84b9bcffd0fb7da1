//! Local JSON file source
//!
//! Accepts either a bare array of bars or a document:
//!
//! ```json
//! {
//!   "bars": [{"date": "2024-01-02", "close": 101.5, "volume": 120000}],
//!   "fundamentals": {"price_to_book": 2.4, "bvps": 410.0},
//!   "fundamentals_used": "exchange_filing"
//! }
//! ```

use super::{DataSource, Fundamentals, SourceError, SourcedSeries, FUNDAMENTALS_NONE, FUNDAMENTALS_SNAPSHOT};
use crate::analysis::RawBar;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BarFile {
    Document {
        bars: Vec<RawBar>,
        #[serde(default)]
        fundamentals: Option<Fundamentals>,
        #[serde(default)]
        fundamentals_used: Option<String>,
    },
    Bars(Vec<RawBar>),
}

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse file contents into a series
    ///
    /// Bars keep file order. Out-of-order or duplicate dates are left in place
    /// so the processor rejects them instead of the file being repaired.
    pub fn parse(ticker: &str, contents: &str) -> Result<SourcedSeries, SourceError> {
        let (mut bars, fundamentals, marker) = match serde_json::from_str::<BarFile>(contents)? {
            BarFile::Document {
                bars,
                fundamentals,
                fundamentals_used,
            } => (bars, fundamentals, fundamentals_used),
            BarFile::Bars(bars) => (bars, None, None),
        };

        let snapshot = fundamentals.filter(|f| !f.is_empty());
        if let Some(snapshot) = &snapshot {
            snapshot.apply_to(&mut bars);
        }

        let fundamentals_used = marker.unwrap_or_else(|| {
            if snapshot.is_some() {
                FUNDAMENTALS_SNAPSHOT.to_string()
            } else {
                FUNDAMENTALS_NONE.to_string()
            }
        });

        Ok(SourcedSeries {
            ticker: ticker.to_string(),
            bars,
            fundamentals_used,
        })
    }
}

#[async_trait]
impl DataSource for JsonFileSource {
    async fn fetch(&self, ticker: &str) -> Result<SourcedSeries, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        let series = Self::parse(ticker, &contents)?;
        log::info!(
            "📂 Loaded {} bars for {} from {}",
            series.bars.len(),
            ticker,
            self.path.display()
        );
        Ok(series)
    }

    fn name(&self) -> &'static str {
        "JSON file"
    }
}
