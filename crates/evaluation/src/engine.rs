//! Per-(product, model) evaluation store and chronological cross-validation.

use std::collections::BTreeMap;

use serde::Serialize;
use stockplan_core::{ModelName, ProductKey, TimeSeriesPoint};
use stockplan_forecasting::ForecastMethod;
use tracing::{debug, warn};

use crate::metrics::Metrics;

/// Default share of a history used for fitting in [`EvaluationEngine::cross_validate`].
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// Shortest history `cross_validate` will attempt to score.
pub const MIN_CROSS_VALIDATION_POINTS: usize = 10;

/// Score of one model for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    #[serde(rename = "unified_code")]
    pub product: ProductKey,
    #[serde(rename = "model_name")]
    pub model: ModelName,
    #[serde(flatten)]
    pub metrics: Metrics,
}

impl EvaluationResult {
    pub fn is_scored(&self) -> bool {
        self.metrics.is_scored()
    }
}

/// Metric engine plus the last-write-wins result store.
///
/// The store is keyed by the structured `(product, model)` pair, so
/// identifiers containing any delimiter cannot collide.
#[derive(Debug, Clone, Default)]
pub struct EvaluationEngine {
    results: BTreeMap<(ProductKey, ModelName), EvaluationResult>,
}

impl EvaluationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score `predicted` against `actual` and store the result.
    ///
    /// An evaluation without any valid comparison point still stores the
    /// worst-case sentinel for the key, overwriting an earlier score.
    pub fn evaluate(
        &mut self,
        actual: &[TimeSeriesPoint],
        predicted: &[f64],
        model: &ModelName,
        product: &ProductKey,
    ) -> EvaluationResult {
        let actual: Vec<f64> = actual.iter().map(|p| p.quantity).collect();
        let metrics = Metrics::compute(&actual, predicted);
        if !metrics.is_scored() {
            debug!(product = %product, model = %model, "no valid comparison points; storing worst-case metrics");
        }
        self.store(product, model, metrics)
    }

    /// Single chronological train/test split (no shuffling).
    ///
    /// Fits `method` on the first `train_fraction` of `history`, predicts the
    /// held-out length and scores it. Fails closed to the sentinel when the
    /// history is too short, the split leaves nothing to test, or fitting fails.
    pub fn cross_validate<M>(
        &mut self,
        history: &[TimeSeriesPoint],
        method: &mut M,
        product: &ProductKey,
        train_fraction: f64,
    ) -> EvaluationResult
    where
        M: ForecastMethod + ?Sized,
    {
        let model = method.name();

        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            warn!(product = %product, model = %model, train_fraction, "train fraction outside (0, 1); scoring as worst case");
            return self.store(product, &model, Metrics::worst());
        }

        if history.len() < MIN_CROSS_VALIDATION_POINTS {
            debug!(product = %product, model = %model, points = history.len(), "history too short to cross-validate");
            return self.store(product, &model, Metrics::worst());
        }

        let split = (history.len() as f64 * train_fraction).floor() as usize;
        let (train, test) = history.split_at(split.min(history.len()));
        if test.is_empty() {
            return self.store(product, &model, Metrics::worst());
        }

        if let Err(e) = method.fit(train, product) {
            debug!(product = %product, model = %model, error = %e, "fit failed during cross-validation");
            return self.store(product, &model, Metrics::worst());
        }

        let predicted = method.predict(product, test.len());
        self.evaluate(test, &predicted, &model, product)
    }

    pub fn result(&self, product: &ProductKey, model: &ModelName) -> Option<&EvaluationResult> {
        self.results.get(&(product.clone(), model.clone()))
    }

    /// All results for `product`, in model-name order.
    pub fn results_for<'a>(&'a self, product: &'a ProductKey) -> impl Iterator<Item = &'a EvaluationResult> + 'a {
        self.results
            .iter()
            .filter(move |((p, _), _)| p == product)
            .map(|(_, r)| r)
    }

    /// Products with at least one stored result, in key order.
    pub fn products(&self) -> Vec<ProductKey> {
        let mut out: Vec<ProductKey> = Vec::new();
        for (p, _) in self.results.keys() {
            if out.last() != Some(p) {
                out.push(p.clone());
            }
        }
        out
    }

    /// Every stored result, ordered by `(product, model)`.
    pub fn summary(&self) -> Vec<EvaluationResult> {
        self.results.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    fn store(&mut self, product: &ProductKey, model: &ModelName, metrics: Metrics) -> EvaluationResult {
        let result = EvaluationResult {
            product: product.clone(),
            model: model.clone(),
            metrics,
        };
        self.results
            .insert((product.clone(), model.clone()), result.clone());
        result
    }
}
