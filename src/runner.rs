//! One synchronous pipeline run for a single ticker
//!
//! raw bars → process → detect → upsert metrics → upsert events → report

use crate::analysis::{self, AnalysisError};
use crate::export::AnalysisReport;
use crate::source::SourcedSeries;
use crate::store::{StoreError, UpsertStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("analysis failed for {ticker}: {source}")]
    Analysis {
        ticker: String,
        #[source]
        source: AnalysisError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Derive metrics and signals for `series` and persist both
///
/// Safe to re-run with the same input: every write is an upsert by natural
/// key. Errors are returned as-is; retrying means calling this again.
pub fn run_pipeline<S: UpsertStore>(
    store: &mut S,
    series: &SourcedSeries,
) -> Result<AnalysisReport, PipelineError> {
    let ticker = series.ticker.as_str();

    let metrics = analysis::process(&series.bars).map_err(|source| PipelineError::Analysis {
        ticker: ticker.to_string(),
        source,
    })?;
    let events = analysis::detect_signal_events(ticker, &metrics);

    log::info!(
        "📈 {}: {} rows, {} signal(s) detected",
        ticker,
        metrics.len(),
        events.len()
    );

    store.upsert_metrics(ticker, &metrics)?;
    store.upsert_signal_events(ticker, &events)?;

    Ok(AnalysisReport {
        ticker: ticker.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        price_rows_count: metrics.len(),
        fundamentals_used: series.fundamentals_used.clone(),
        signals: events,
    })
}
