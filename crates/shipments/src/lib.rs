//! `stockplan-shipments` turns a demand forecast and the current warehouse
//! stock into per-warehouse shipment quantities.
//!
//! The calculator is pure: no IO, only `tracing` for coverage gaps.

pub mod analysis;
pub mod calculator;
pub mod error;
pub mod monthly;

pub use analysis::{CoverageAnalysis, RatioStats, analyze_coverage};
pub use calculator::{DEFAULT_COVERAGE_COEFFICIENT, ShipmentCalculator};
pub use error::ShipmentError;
pub use monthly::{month_start, monthly_demand};
