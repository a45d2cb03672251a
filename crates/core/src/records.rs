//! Tabular records exchanged between the planner's components.
//!
//! Field names serialize with the column names used by the normalized input
//! tables and the ledger files (`unified_code`, `warehouse`, ...).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{ModelName, ProductKey, WarehouseId};

/// Clamp a model or input quantity into the non-negative domain.
///
/// Non-finite values collapse to zero.
pub fn clamp_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

/// Observed (or forecast) demand of one product on one date.
///
/// Duplicates for the same `(date, product)` are aggregated by ingestion
/// before a series reaches the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    #[serde(rename = "unified_code")]
    pub product: ProductKey,
    pub quantity: f64,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate, product: ProductKey, quantity: f64) -> Self {
        Self {
            date,
            product,
            quantity: clamp_non_negative(quantity),
        }
    }
}

/// Inventory snapshot of one product in one warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub date: NaiveDate,
    pub warehouse: WarehouseId,
    #[serde(rename = "unified_code")]
    pub product: ProductKey,
    pub stock: f64,
}

impl StockRecord {
    pub fn new(date: NaiveDate, warehouse: WarehouseId, product: ProductKey, stock: f64) -> Self {
        Self {
            date,
            warehouse,
            product,
            stock: clamp_non_negative(stock),
        }
    }
}

/// One forecast value produced by a forecasting method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    #[serde(rename = "unified_code")]
    pub product: ProductKey,
    pub quantity: f64,
    #[serde(rename = "model_name")]
    pub model: ModelName,
}

/// Derived replenishment instruction for one warehouse and month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub date: NaiveDate,
    pub warehouse: WarehouseId,
    #[serde(rename = "unified_code")]
    pub product: ProductKey,
    pub forecasted_sales: f64,
    pub current_stock: f64,
    pub required_stock: f64,
    pub shipment: f64,
    /// Number of boxes; zero until box rounding has run.
    pub boxes: u64,
}

/// Permanently discontinued product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawEntry {
    #[serde(rename = "unified_code")]
    pub product: ProductKey,
}

/// Product in temporary supply shortage.
///
/// `end_date = None` means the shortage has no known resolution date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectureEntry {
    #[serde(rename = "unified_code")]
    pub product: ProductKey,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl DefectureEntry {
    /// The shortage still applies on `date` (not yet past its end date).
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.end_date.is_none_or(|end| date <= end)
    }
}
