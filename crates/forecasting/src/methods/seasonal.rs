//! Weekly seasonal naive profile.

use stockplan_core::{ModelName, ProductKey, TimeSeriesPoint};
use tracing::debug;

use crate::error::ForecastError;
use crate::method::{ForecastMethod, finalize, quantities, zeros};
use crate::stats::mean;
use crate::store::ModelStore;

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalProfile {
    /// Mean quantity per position in the season.
    pub profile: Vec<f64>,
    /// Season position of the first forecast period.
    pub next_phase: usize,
}

/// Seasonal profile method: each future period repeats the average of the
/// same season position in the history (weekly for daily data by default).
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    period: usize,
    store: ModelStore<SeasonalProfile>,
}

impl SeasonalNaive {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            store: ModelStore::new(),
        }
    }

    pub fn weekly() -> Self {
        Self::new(7)
    }

    pub fn with_store(mut self, store: ModelStore<SeasonalProfile>) -> Self {
        self.store = store;
        self
    }
}

impl ForecastMethod for SeasonalNaive {
    fn name(&self) -> ModelName {
        ModelName::from_static("seasonal_naive")
    }

    fn fit(&mut self, history: &[TimeSeriesPoint], product: &ProductKey) -> Result<(), ForecastError> {
        if self.period == 0 {
            self.store.record_unfit(product);
            return Err(ForecastError::ill_conditioned(product, "season period must be >= 1"));
        }

        let ys = quantities(history);
        if ys.len() < self.period {
            self.store.record_unfit(product);
            debug!(product = %product, model = %self.name(), points = ys.len(), "less than one season; recorded as unfit");
            return Err(ForecastError::insufficient(product, ys.len(), self.period));
        }

        let mut buckets = vec![Vec::new(); self.period];
        for (i, y) in ys.iter().enumerate() {
            buckets[i % self.period].push(*y);
        }

        self.store.record_fit(
            product,
            SeasonalProfile {
                profile: buckets.iter().map(|b| mean(b)).collect(),
                next_phase: ys.len() % self.period,
            },
        );
        Ok(())
    }

    fn predict(&self, product: &ProductKey, periods: usize) -> Vec<f64> {
        let Some(state) = self.store.fitted(product) else {
            return zeros(periods);
        };
        let season = state.profile.len();
        let raw = (0..periods).map(|h| state.profile[(state.next_phase + h) % season]);
        finalize(raw, periods)
    }

    fn reset(&mut self) {
        self.store.clear();
    }
}
