//! Constant baselines: mean, median and last observed value.

use stockplan_core::{ModelName, ProductKey, TimeSeriesPoint};
use tracing::debug;

use crate::error::ForecastError;
use crate::method::{ForecastMethod, finalize, quantities, zeros};
use crate::stats::{mean, median};
use crate::store::ModelStore;

/// Constant statistic repeated over the horizon.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Statistic {
    Mean,
    Median,
    Last,
}

impl Statistic {
    fn model_name(self) -> &'static str {
        match self {
            Statistic::Mean => "baseline_mean",
            Statistic::Median => "baseline_median",
            Statistic::Last => "baseline_last",
        }
    }

    fn compute(self, xs: &[f64]) -> f64 {
        match self {
            Statistic::Mean => mean(xs),
            Statistic::Median => median(xs),
            Statistic::Last => xs.last().copied().unwrap_or(0.0),
        }
    }
}

/// Baseline method: forecast a single summary statistic of the history.
#[derive(Debug, Clone)]
pub struct BaselineMethod {
    statistic: Statistic,
    store: ModelStore<f64>,
}

impl BaselineMethod {
    pub fn new(statistic: Statistic) -> Self {
        Self::with_store(statistic, ModelStore::new())
    }

    pub fn with_store(statistic: Statistic, store: ModelStore<f64>) -> Self {
        Self { statistic, store }
    }

    pub fn store(&self) -> &ModelStore<f64> {
        &self.store
    }
}

impl ForecastMethod for BaselineMethod {
    fn name(&self) -> ModelName {
        ModelName::from_static(self.statistic.model_name())
    }

    fn fit(&mut self, history: &[TimeSeriesPoint], product: &ProductKey) -> Result<(), ForecastError> {
        let ys = quantities(history);
        if ys.is_empty() {
            self.store.record_unfit(product);
            debug!(product = %product, model = %self.name(), "empty history; recorded as unfit");
            return Err(ForecastError::insufficient(product, 0, 1));
        }
        self.store.record_fit(product, self.statistic.compute(&ys));
        Ok(())
    }

    fn predict(&self, product: &ProductKey, periods: usize) -> Vec<f64> {
        match self.store.fitted(product) {
            Some(value) => finalize(std::iter::repeat(*value), periods),
            None => zeros(periods),
        }
    }

    fn reset(&mut self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn history(product: &ProductKey, values: &[f64]) -> Vec<TimeSeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(start + Duration::days(i as i64), product.clone(), *v))
            .collect()
    }

    #[test]
    fn each_statistic_forecasts_a_constant() {
        let p = ProductKey::new("P").unwrap();
        let h = history(&p, &[1.0, 2.0, 9.0, 4.0]);

        let mut mean = BaselineMethod::new(Statistic::Mean);
        mean.fit(&h, &p).unwrap();
        assert_eq!(mean.predict(&p, 3), vec![4.0, 4.0, 4.0]);

        let mut median = BaselineMethod::new(Statistic::Median);
        median.fit(&h, &p).unwrap();
        assert_eq!(median.predict(&p, 2), vec![3.0, 3.0]);

        let mut last = BaselineMethod::new(Statistic::Last);
        last.fit(&h, &p).unwrap();
        assert_eq!(last.predict(&p, 1), vec![4.0]);
        assert_eq!(last.name().as_str(), "baseline_last");
    }

    #[test]
    fn empty_history_is_unfit_and_forecasts_zeros() {
        let p = ProductKey::new("P").unwrap();
        let mut m = BaselineMethod::new(Statistic::Mean);

        let err = m.fit(&[], &p).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientHistory { found: 0, .. }));
        assert_eq!(m.predict(&p, 4), vec![0.0; 4]);
    }

    #[test]
    fn injected_store_is_used_for_prediction() {
        let p = ProductKey::new("P").unwrap();
        let mut store = ModelStore::new();
        store.record_fit(&p, 7.0);

        let mut m = BaselineMethod::with_store(Statistic::Mean, store);
        assert_eq!(m.predict(&p, 2), vec![7.0, 7.0]);

        m.reset();
        assert_eq!(m.predict(&p, 2), vec![0.0, 0.0]);
    }
}
