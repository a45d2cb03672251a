//! Latest-date stock snapshot, aggregated per product and warehouse.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::id::{ProductKey, WarehouseId};
use crate::records::{StockRecord, clamp_non_negative};

/// Stock on the most recent date present in a set of stock records.
///
/// Older snapshots are ignored entirely (no time weighting). Rows for the same
/// `(product, warehouse)` on the latest date are summed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockSnapshot {
    date: Option<NaiveDate>,
    by_product: BTreeMap<ProductKey, BTreeMap<WarehouseId, f64>>,
}

impl StockSnapshot {
    pub fn latest(records: &[StockRecord]) -> Self {
        let Some(date) = records.iter().map(|r| r.date).max() else {
            return Self::default();
        };

        let mut by_product: BTreeMap<ProductKey, BTreeMap<WarehouseId, f64>> = BTreeMap::new();
        for r in records.iter().filter(|r| r.date == date) {
            *by_product
                .entry(r.product.clone())
                .or_default()
                .entry(r.warehouse.clone())
                .or_insert(0.0) += clamp_non_negative(r.stock);
        }

        Self {
            date: Some(date),
            by_product,
        }
    }

    /// Date of the snapshot; `None` when built from no records.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Per-warehouse stock of `product`, if any warehouse reports it.
    pub fn warehouses(&self, product: &ProductKey) -> Option<&BTreeMap<WarehouseId, f64>> {
        self.by_product.get(product)
    }

    /// Total stock of `product` across warehouses (zero when unknown).
    pub fn total(&self, product: &ProductKey) -> f64 {
        self.by_product
            .get(product)
            .map_or(0.0, |w| w.values().sum())
    }

    pub fn products(&self) -> impl Iterator<Item = &ProductKey> {
        self.by_product.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(day: u32, wh: &str, product: &str, stock: f64) -> StockRecord {
        StockRecord::new(
            NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            WarehouseId::new(wh).unwrap(),
            ProductKey::new(product).unwrap(),
            stock,
        )
    }

    #[test]
    fn only_the_latest_date_counts() {
        let snapshot = StockSnapshot::latest(&[
            rec(1, "W1", "P", 500.0),
            rec(2, "W1", "P", 10.0),
            rec(2, "W1", "P", 5.0),
            rec(2, "W2", "P", 20.0),
            rec(1, "W3", "Q", 99.0),
        ]);

        let p = ProductKey::new("P").unwrap();
        assert_eq!(snapshot.date(), NaiveDate::from_ymd_opt(2024, 5, 2));
        assert_eq!(snapshot.total(&p), 35.0);
        assert_eq!(snapshot.warehouses(&p).unwrap().len(), 2);
        // Q only exists on an older date.
        assert_eq!(snapshot.total(&ProductKey::new("Q").unwrap()), 0.0);
        assert!(snapshot.warehouses(&ProductKey::new("Q").unwrap()).is_none());
    }

    #[test]
    fn empty_input_gives_empty_snapshot() {
        let snapshot = StockSnapshot::latest(&[]);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.date(), None);
    }
}
