//! Packaging multiples.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use stockplan_core::{ProductKey, clamp_non_negative};

/// Box size used when neither a product nor a default override is configured.
pub const DEFAULT_BOX_SIZE: NonZeroU32 = NonZeroU32::new(24).unwrap();

/// Slack applied before rounding up so float noise (`48.000000001`) does not
/// cost an extra box.
const CEIL_TOLERANCE: f64 = 1e-9;

/// Box size lookup: per-product size, then default override, then 24.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxSizes {
    per_product: BTreeMap<ProductKey, NonZeroU32>,
    default_override: Option<NonZeroU32>,
}

impl BoxSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, size: NonZeroU32) -> Self {
        self.default_override = Some(size);
        self
    }

    pub fn with_product(mut self, product: ProductKey, size: NonZeroU32) -> Self {
        self.insert(product, size);
        self
    }

    pub fn insert(&mut self, product: ProductKey, size: NonZeroU32) {
        self.per_product.insert(product, size);
    }

    pub fn resolve(&self, product: &ProductKey) -> NonZeroU32 {
        self.per_product
            .get(product)
            .copied()
            .or(self.default_override)
            .unwrap_or(DEFAULT_BOX_SIZE)
    }

    pub fn len(&self) -> usize {
        self.per_product.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_product.is_empty()
    }
}

impl FromIterator<(ProductKey, NonZeroU32)> for BoxSizes {
    fn from_iter<I: IntoIterator<Item = (ProductKey, NonZeroU32)>>(iter: I) -> Self {
        Self {
            per_product: iter.into_iter().collect(),
            default_override: None,
        }
    }
}

/// Round `shipment` up to a whole number of boxes.
///
/// Returns `(rounded_shipment, boxes)`. Negative or non-finite input counts as
/// zero; any positive shipment takes at least one box.
pub fn round_to_boxes(shipment: f64, box_size: NonZeroU32) -> (f64, u64) {
    let shipment = clamp_non_negative(shipment);
    if shipment == 0.0 {
        return (0.0, 0);
    }
    let size = f64::from(box_size.get());
    let boxes = ((shipment / size - CEIL_TOLERANCE).ceil().max(0.0) as u64).max(1);
    (boxes as f64 * size, boxes)
}
