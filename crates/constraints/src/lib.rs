//! `stockplan-constraints` applies business overrides to forecasts and
//! shipments: discontinued products, supply shortages and packaging multiples.
//!
//! Every pass is pure and idempotent. Box rounding must run after the zeroing
//! passes since it works on final shipment quantities.

pub mod boxes;
pub mod engine;
pub mod pools;

pub use boxes::{BoxSizes, DEFAULT_BOX_SIZE, round_to_boxes};
pub use engine::ConstraintEngine;
pub use pools::{PoolKind, StockPool, StockPools};
