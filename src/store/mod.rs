//! Upsert Store - durable, replay-safe persistence
//!
//! Writes are keyed by natural keys and replace on conflict, so re-running a
//! pipeline for the same inputs converges to the same stored state.

pub mod error;
pub mod sqlite_store;

pub use error::{StoreError, TransactionFailure};
pub use sqlite_store::{SqliteStore, TickerEntry};

use crate::analysis::{MetricRecord, SignalEvent};

/// Persistence boundary for the analysis pipeline
///
/// Each write call is one atomic unit: either every record in the batch is
/// committed or none is.
pub trait UpsertStore {
    /// Create tables if absent. Safe to call on every start.
    fn initialize(&mut self) -> Result<(), StoreError>;

    /// Insert-or-replace each record keyed by (ticker, date)
    ///
    /// Returns the number of records written.
    fn upsert_metrics(&mut self, ticker: &str, records: &[MetricRecord]) -> Result<usize, StoreError>;

    /// Insert-or-replace each event keyed by (ticker, date, signal_type)
    fn upsert_signal_events(&mut self, ticker: &str, events: &[SignalEvent]) -> Result<usize, StoreError>;
}
