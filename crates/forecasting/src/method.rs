//! The fit/predict contract every forecasting method implements.

use stockplan_core::{ModelName, ProductKey, TimeSeriesPoint, clamp_non_negative};

use crate::error::ForecastError;

/// A per-product forecasting method.
///
/// Contract shared by every method so the evaluation engine and the
/// orchestrator can treat them interchangeably:
/// - `fit` consumes a chronologically ordered history and replaces the
///   product's state. On failure the product is recorded as unfit and the
///   error is returned for reporting only.
/// - `predict` returns exactly `periods` non-negative values, all zeros for a
///   product that is unknown or unfit.
pub trait ForecastMethod {
    fn name(&self) -> ModelName;

    fn fit(&mut self, history: &[TimeSeriesPoint], product: &ProductKey) -> Result<(), ForecastError>;

    fn predict(&self, product: &ProductKey, periods: usize) -> Vec<f64>;

    /// Drop all fitted state.
    fn reset(&mut self);
}

/// Quantities of a history, clamped into the non-negative domain.
pub(crate) fn quantities(history: &[TimeSeriesPoint]) -> Vec<f64> {
    history.iter().map(|p| clamp_non_negative(p.quantity)).collect()
}

/// Clamp a raw model output to `periods` non-negative values.
pub(crate) fn finalize(raw: impl Iterator<Item = f64>, periods: usize) -> Vec<f64> {
    let mut out: Vec<f64> = raw.take(periods).map(clamp_non_negative).collect();
    out.resize(periods, 0.0);
    out
}

pub(crate) fn zeros(periods: usize) -> Vec<f64> {
    vec![0.0; periods]
}
