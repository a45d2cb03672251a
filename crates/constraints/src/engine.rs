//! Withdraw, defecture and box-rounding passes.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use stockplan_core::{DefectureEntry, ForecastRecord, ProductKey, ShipmentRecord, WithdrawEntry};
use tracing::debug;

use crate::boxes::{BoxSizes, round_to_boxes};
use crate::pools::StockPools;

/// Post-processing of forecasts and shipments.
///
/// Forecast-side rules depend on stock:
/// - a withdrawn product is zeroed when its stock across all pools is `<= 0`;
/// - a product in defecture is zeroed on dates up to its end date while its
///   marketplace stock is `<= 0`.
///
/// Shipment-side rules zero withdrawn and defecture products unconditionally.
#[derive(Debug, Clone, Default)]
pub struct ConstraintEngine {
    withdraw: BTreeSet<ProductKey>,
    defecture: BTreeMap<ProductKey, Vec<DefectureEntry>>,
    box_sizes: BoxSizes,
    pools: StockPools,
}

impl ConstraintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_withdraw(mut self, entries: &[WithdrawEntry]) -> Self {
        self.withdraw.extend(entries.iter().map(|e| e.product.clone()));
        self
    }

    pub fn with_defecture(mut self, entries: &[DefectureEntry]) -> Self {
        for e in entries {
            self.defecture
                .entry(e.product.clone())
                .or_default()
                .push(e.clone());
        }
        self
    }

    pub fn with_box_sizes(mut self, box_sizes: BoxSizes) -> Self {
        self.box_sizes = box_sizes;
        self
    }

    pub fn with_pools(mut self, pools: StockPools) -> Self {
        self.pools = pools;
        self
    }

    pub fn box_sizes(&self) -> &BoxSizes {
        &self.box_sizes
    }

    pub fn is_withdrawn(&self, product: &ProductKey) -> bool {
        self.withdraw.contains(product)
    }

    pub fn in_defecture(&self, product: &ProductKey) -> bool {
        self.defecture.contains_key(product)
    }

    /// Some defecture entry for `product` has not ended by `date`.
    pub fn defecture_active_on(&self, product: &ProductKey, date: NaiveDate) -> bool {
        self.defecture
            .get(product)
            .is_some_and(|entries| entries.iter().any(|e| e.is_active_on(date)))
    }

    /// Withdraw then defecture on a forecast.
    pub fn constrain_forecast(&self, mut forecast: Vec<ForecastRecord>) -> Vec<ForecastRecord> {
        self.apply_withdraw(&mut forecast);
        self.apply_defecture(&mut forecast);
        forecast
    }

    /// Withdraw, defecture, then box rounding on shipments.
    pub fn constrain_shipments(&self, mut shipments: Vec<ShipmentRecord>) -> Vec<ShipmentRecord> {
        self.apply_shipment_withdraw(&mut shipments);
        self.apply_shipment_defecture(&mut shipments);
        self.apply_box_rounding(&mut shipments);
        shipments
    }

    pub fn apply_withdraw(&self, forecast: &mut [ForecastRecord]) {
        if self.withdraw.is_empty() {
            return;
        }
        let mut zeroed = 0usize;
        for row in forecast.iter_mut() {
            if self.is_withdrawn(&row.product) && self.pools.total(&row.product) <= 0.0 {
                row.quantity = 0.0;
                zeroed += 1;
            }
        }
        debug!(zeroed, "withdraw constraint applied to forecast");
    }

    pub fn apply_defecture(&self, forecast: &mut [ForecastRecord]) {
        if self.defecture.is_empty() {
            return;
        }
        let mut zeroed = 0usize;
        for row in forecast.iter_mut() {
            if self.defecture_active_on(&row.product, row.date)
                && self.pools.marketplace_total(&row.product) <= 0.0
            {
                row.quantity = 0.0;
                zeroed += 1;
            }
        }
        debug!(zeroed, "defecture constraint applied to forecast");
    }

    pub fn apply_shipment_withdraw(&self, shipments: &mut [ShipmentRecord]) {
        let zeroed = zero_shipments(shipments, |p| self.is_withdrawn(p));
        debug!(zeroed, "withdraw constraint applied to shipments");
    }

    pub fn apply_shipment_defecture(&self, shipments: &mut [ShipmentRecord]) {
        let zeroed = zero_shipments(shipments, |p| self.in_defecture(p));
        debug!(zeroed, "defecture constraint applied to shipments");
    }

    /// Round every shipment up to its box size and record the box count.
    pub fn apply_box_rounding(&self, shipments: &mut [ShipmentRecord]) {
        for row in shipments.iter_mut() {
            let (rounded, boxes) =
                round_to_boxes(row.shipment, self.box_sizes.resolve(&row.product));
            row.shipment = rounded;
            row.boxes = boxes;
        }
    }
}

fn zero_shipments(
    shipments: &mut [ShipmentRecord],
    matches: impl Fn(&ProductKey) -> bool,
) -> usize {
    let mut zeroed = 0;
    for row in shipments.iter_mut().filter(|r| matches(&r.product)) {
        row.shipment = 0.0;
        row.boxes = 0;
        zeroed += 1;
    }
    zeroed
}
