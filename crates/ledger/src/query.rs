//! Filters and rows for ledger queries.

use serde::Serialize;

use stockplan_core::{ForecastRecord, Marketplace, ModelName, ProductKey};

use crate::run::RunId;

/// Filter criteria for listing runs and reconstructing history.
///
/// Unset fields match everything. `product` only affects row-level queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFilter {
    pub marketplace: Option<Marketplace>,
    pub model: Option<ModelName>,
    pub product: Option<ProductKey>,
}

impl RunFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_marketplace(mut self, marketplace: Marketplace) -> Self {
        self.marketplace = Some(marketplace);
        self
    }

    pub fn with_model(mut self, model: ModelName) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_product(mut self, product: ProductKey) -> Self {
        self.product = Some(product);
        self
    }

    pub fn matches_run(&self, id: &RunId) -> bool {
        self.marketplace.as_ref().is_none_or(|m| *m == id.marketplace)
            && self.model.as_ref().is_none_or(|m| *m == id.model)
    }

    pub fn matches_record(&self, record: &ForecastRecord) -> bool {
        self.product.as_ref().is_none_or(|p| *p == record.product)
    }
}

/// One forecast row annotated with the snapshot it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub run: RunId,
    pub record: ForecastRecord,
}
