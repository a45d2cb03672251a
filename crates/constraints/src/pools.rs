//! Named stock pools (one per marketplace plus internal warehouses).

use stockplan_core::{Marketplace, ProductKey, StockRecord, StockSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolKind {
    /// Stock held in a marketplace's warehouses.
    Marketplace(Marketplace),
    /// Stock held in the seller's own warehouse.
    Internal,
}

/// Latest snapshot of one pool.
#[derive(Debug, Clone, PartialEq)]
pub struct StockPool {
    pub kind: PoolKind,
    pub snapshot: StockSnapshot,
}

/// All known stock pools.
///
/// Each pool is reduced to its own latest snapshot date; pools may have
/// different snapshot dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockPools {
    pools: Vec<StockPool>,
}

impl StockPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marketplace(mut self, marketplace: Marketplace, records: &[StockRecord]) -> Self {
        self.add(PoolKind::Marketplace(marketplace), records);
        self
    }

    pub fn with_internal(mut self, records: &[StockRecord]) -> Self {
        self.add(PoolKind::Internal, records);
        self
    }

    pub fn add(&mut self, kind: PoolKind, records: &[StockRecord]) {
        self.pools.push(StockPool {
            kind,
            snapshot: StockSnapshot::latest(records),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &StockPool> {
        self.pools.iter()
    }

    /// Stock of `product` across every pool.
    pub fn total(&self, product: &ProductKey) -> f64 {
        self.pools.iter().map(|p| p.snapshot.total(product)).sum()
    }

    /// Stock of `product` across marketplace pools only.
    pub fn marketplace_total(&self, product: &ProductKey) -> f64 {
        self.pools
            .iter()
            .filter(|p| matches!(p.kind, PoolKind::Marketplace(_)))
            .map(|p| p.snapshot.total(product))
            .sum()
    }
}
