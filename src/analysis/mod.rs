//! Analysis Core - indicator derivation and crossover detection
//!
//! ```text
//! RawBar series (ascending by date)
//!     ↓
//! process()            SMA50 / SMA200 per record
//!     ↓
//! MetricRecord series
//!     ↓
//! detect_*()           golden / death crossovers
//!     ↓
//! SignalEvent list
//! ```
//!
//! Everything here is pure and in-memory; persistence lives in `store`.

pub mod detector;
pub mod error;
pub mod processor;
pub mod types;

pub use detector::{detect_death_cross, detect_golden_crossover, detect_signal_events};
pub use error::AnalysisError;
pub use processor::{process, simple_moving_average, LONG_WINDOW, SHORT_WINDOW};
pub use types::{MetricRecord, RawBar, SignalEvent, SignalType};
