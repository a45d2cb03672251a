//! `stockplan-core`: shared vocabulary of the replenishment planner.
//!
//! This crate contains **pure data** primitives (no IO, no logging): the
//! identifiers every other crate joins on and the record types that flow
//! between evaluation, shipment calculation, constraints and the ledger.

pub mod error;
pub mod id;
pub mod records;
pub mod snapshot;

pub use error::DomainError;
pub use id::{Marketplace, ModelName, ProductKey, WarehouseId};
pub use records::{
    DefectureEntry, ForecastRecord, ShipmentRecord, StockRecord, TimeSeriesPoint, WithdrawEntry,
    clamp_non_negative,
};
pub use snapshot::StockSnapshot;
