//! Versioned forecast ledger.
//!
//! Every forecast run is persisted as an immutable snapshot identified by
//! `(marketplace, model, timestamp)`: one CSV table plus an optional JSON
//! metadata sidecar. Snapshots can be loaded back individually, combined into
//! a history table, or averaged for model comparison.

pub mod compare;
pub mod error;
pub mod ledger;
pub mod query;
pub mod run;

pub use compare::{ComparisonRow, Series};
pub use error::LedgerError;
pub use ledger::ForecastLedger;
pub use query::{HistoryRecord, RunFilter};
pub use run::{ForecastRun, RunId, TIMESTAMP_FORMAT};
