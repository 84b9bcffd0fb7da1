use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Table creation failed; fatal to the run
    #[error("schema initialization failed in {file}: {source}")]
    SchemaInit {
        file: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{op}: required key field `{field}` is missing")]
    MissingKey { op: &'static str, field: &'static str },

    #[error("{op}: record for ticker `{found}` passed in a batch for `{expected}`")]
    KeyMismatch {
        op: &'static str,
        expected: String,
        found: String,
    },

    /// Batch aborted and rolled back; nothing from the call was committed
    #[error("{op} failed for {ticker}{}: {source}", on_date(.date))]
    Transaction {
        op: &'static str,
        ticker: String,
        date: Option<NaiveDate>,
        #[source]
        source: TransactionFailure,
    },

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

fn on_date(date: &Option<NaiveDate>) -> String {
    date.map(|d| format!(" on {}", d)).unwrap_or_default()
}

/// Underlying cause of an aborted batch
#[derive(Debug, Error)]
pub enum TransactionFailure {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("meta serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
