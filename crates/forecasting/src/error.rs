//! Forecasting error model.

use stockplan_core::ProductKey;
use thiserror::Error;

/// Why a method could not be fitted for a product.
///
/// These are *reported*, not propagated: the method records the product as
/// unfit and keeps serving zero forecasts for it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("insufficient history for {product}: {found} point(s), need at least {required}")]
    InsufficientHistory {
        product: ProductKey,
        found: usize,
        required: usize,
    },

    #[error("ill-conditioned input for {product}: {reason}")]
    IllConditioned { product: ProductKey, reason: String },
}

impl ForecastError {
    pub fn insufficient(product: &ProductKey, found: usize, required: usize) -> Self {
        Self::InsufficientHistory {
            product: product.clone(),
            found,
            required,
        }
    }

    pub fn ill_conditioned(product: &ProductKey, reason: impl Into<String>) -> Self {
        Self::IllConditioned {
            product: product.clone(),
            reason: reason.into(),
        }
    }
}
