//! stockflow - daily indicator pipeline for a single instrument
//!
//! ```text
//! DataSource (JSON file | Yahoo chart API)
//!     ↓
//! analysis::process         SMA50 / SMA200
//!     ↓
//! analysis::detect_*        golden / death crosses
//!     ↓
//! store::SqliteStore        idempotent upserts, one transaction per batch
//!     ↓
//! export::write_report      JSON summary
//! ```

pub mod analysis;
pub mod config;
pub mod export;
pub mod runner;
pub mod source;
pub mod sqlite_pragma;
pub mod store;

pub use runner::{run_pipeline, PipelineError};
