//! JSON summary report written at the end of a run

use crate::analysis::SignalEvent;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker: String,
    /// UTC, RFC 3339
    pub generated_at: String,
    pub price_rows_count: usize,
    pub fundamentals_used: String,
    pub signals: Vec<SignalEvent>,
}

/// Save report as pretty-printed JSON, creating the parent directory if needed
pub fn write_report(path: impl AsRef<Path>, report: &AnalysisReport) -> Result<(), ReportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;

    log::debug!("Saved report for {} to {}", report.ticker, path.display());
    Ok(())
}

/// Load a previously written report
pub fn load_report(path: impl AsRef<Path>) -> Result<AnalysisReport, ReportError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
