//! Yahoo Finance chart API source
//!
//! ## API Reference
//!
//! Endpoint: {base_url}/v8/finance/chart/{ticker}?range={range}&interval=1d
//! Returns: parallel arrays of bar timestamps and OHLCV values (any may be null)
//!
//! The chart endpoint carries no fundamentals: `price_to_book`, `bvps` and
//! `enterprise_value` stay `None` on every bar and the marker is always
//! `none`. Use a JSON file source to supply fundamentals.

use super::{DataSource, SourceError, SourcedSeries, FUNDAMENTALS_NONE};
use crate::analysis::RawBar;
use crate::config::SourceConfig;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

fn at<T: Copy>(values: &[Option<T>], index: usize) -> Option<T> {
    values.get(index).copied().flatten()
}

/// Exchange-local calendar date for a bar timestamp
fn local_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    let utc = DateTime::from_timestamp(timestamp, 0)?;
    Some((utc.naive_utc() + Duration::seconds(gmtoffset)).date())
}

pub struct YahooChartSource {
    config: SourceConfig,
}

impl YahooChartSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.config.base_url.trim_end_matches('/'),
            ticker,
            self.config.history_range
        )
    }

    /// Convert a chart response body into bars
    ///
    /// Timestamps are normalized to exchange-local dates. If two timestamps
    /// land on the same date the later one wins (Yahoo appends the live
    /// session as an extra bar).
    pub fn parse(ticker: &str, body: &str) -> Result<SourcedSeries, SourceError> {
        let response: ChartResponse = serde_json::from_str(body)?;

        if let Some(error) = response.chart.error {
            return Err(SourceError::Parse(format!(
                "chart error {}: {}",
                error.code,
                error.description.unwrap_or_default()
            )));
        }

        let result = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| SourceError::Empty(ticker.to_string()))?;

        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let gmtoffset = result.meta.gmtoffset;

        let mut by_date: BTreeMap<NaiveDate, RawBar> = BTreeMap::new();
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let date = local_date(ts, gmtoffset)
                .ok_or_else(|| SourceError::Parse(format!("invalid timestamp {}", ts)))?;

            by_date.insert(
                date,
                RawBar {
                    date,
                    open: at(&quote.open, i),
                    high: at(&quote.high, i),
                    low: at(&quote.low, i),
                    close: at(&quote.close, i),
                    volume: at(&quote.volume, i),
                    price_to_book: None,
                    bvps: None,
                    enterprise_value: None,
                },
            );
        }

        if by_date.is_empty() {
            return Err(SourceError::Empty(ticker.to_string()));
        }

        Ok(SourcedSeries {
            ticker: ticker.to_string(),
            bars: by_date.into_values().collect(),
            fundamentals_used: FUNDAMENTALS_NONE.to_string(),
        })
    }
}

#[async_trait]
impl DataSource for YahooChartSource {
    async fn fetch(&self, ticker: &str) -> Result<SourcedSeries, SourceError> {
        let url = self.chart_url(ticker);
        log::info!("🌐 Fetching {} history for {}", self.config.history_range, ticker);
        log::debug!("GET {}", url);

        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent("stockflow/0.1")
            .build()?;

        let response = client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                source_name: self.name(),
                ticker: ticker.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let series = Self::parse(ticker, &body)?;

        log::info!("✅ Received {} daily bars for {}", series.bars.len(), ticker);
        Ok(series)
    }

    fn name(&self) -> &'static str {
        "Yahoo chart"
    }
}
