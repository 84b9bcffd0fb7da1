use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Raw series is not strictly ascending by date (out of order or duplicated)
    #[error("raw series out of order at index {index}: {date} does not follow {previous}")]
    InputOrdering {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },
}
