//! Linear trend with optional weekday effects.

use chrono::{Datelike, Duration, NaiveDate};
use stockplan_core::{ModelName, ProductKey, TimeSeriesPoint};
use tracing::debug;

use crate::error::ForecastError;
use crate::method::{ForecastMethod, finalize, quantities, zeros};
use crate::stats::{linear_fit, mean, sum_sq};
use crate::store::ModelStore;

/// Fitted trend line plus optional day-of-week effects.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendState {
    pub intercept: f64,
    pub slope: f64,
    /// Number of fitted points; the first forecast is at time index `len`.
    pub len: usize,
    pub last_date: NaiveDate,
    /// Mean residual per weekday (Monday first), kept only when it pays off.
    pub weekday_effects: Option<[f64; 7]>,
}

/// Least-squares trend regression with feature selection.
///
/// The time index is always a regressor. Weekday indicators are added only
/// when they cut the residual sum of squares by at least `min_gain` and the
/// history spans at least two full weeks.
#[derive(Debug, Clone)]
pub struct LinearTrend {
    min_gain: f64,
    store: ModelStore<TrendState>,
}

impl LinearTrend {
    pub fn new() -> Self {
        Self {
            min_gain: 0.05,
            store: ModelStore::new(),
        }
    }

    pub fn with_store(mut self, store: ModelStore<TrendState>) -> Self {
        self.store = store;
        self
    }

    pub fn with_min_gain(mut self, min_gain: f64) -> Self {
        self.min_gain = min_gain;
        self
    }

    pub fn store(&self) -> &ModelStore<TrendState> {
        &self.store
    }
}

impl Default for LinearTrend {
    fn default() -> Self {
        Self::new()
    }
}

fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

fn select_weekday_effects(
    history: &[TimeSeriesPoint],
    residuals: &[f64],
    min_gain: f64,
) -> Option<[f64; 7]> {
    if history.len() < 14 {
        return None;
    }

    let mut buckets: [Vec<f64>; 7] = Default::default();
    for (point, r) in history.iter().zip(residuals) {
        buckets[weekday_index(point.date)].push(*r);
    }
    let mut effects = [0.0; 7];
    for (effect, bucket) in effects.iter_mut().zip(&buckets) {
        *effect = mean(bucket);
    }

    let sse_base = sum_sq(residuals.iter().copied());
    if sse_base <= f64::EPSILON {
        return None;
    }
    let sse_adjusted = sum_sq(
        history
            .iter()
            .zip(residuals)
            .map(|(p, r)| r - effects[weekday_index(p.date)]),
    );

    ((sse_base - sse_adjusted) / sse_base >= min_gain).then_some(effects)
}

impl ForecastMethod for LinearTrend {
    fn name(&self) -> ModelName {
        ModelName::from_static("linear_trend")
    }

    fn fit(&mut self, history: &[TimeSeriesPoint], product: &ProductKey) -> Result<(), ForecastError> {
        let ys = quantities(history);
        let (Some((intercept, slope)), Some(last)) = (linear_fit(&ys), history.last()) else {
            self.store.record_unfit(product);
            debug!(product = %product, model = %self.name(), points = ys.len(), "history too short; recorded as unfit");
            return Err(ForecastError::insufficient(product, ys.len(), 2));
        };

        let residuals: Vec<f64> = ys
            .iter()
            .enumerate()
            .map(|(t, y)| y - (intercept + slope * t as f64))
            .collect();

        let weekday_effects = select_weekday_effects(history, &residuals, self.min_gain);

        self.store.record_fit(
            product,
            TrendState {
                intercept,
                slope,
                len: ys.len(),
                last_date: last.date,
                weekday_effects,
            },
        );
        Ok(())
    }

    fn predict(&self, product: &ProductKey, periods: usize) -> Vec<f64> {
        let Some(state) = self.store.fitted(product) else {
            return zeros(periods);
        };

        let raw = (0..periods).map(|h| {
            let t = (state.len + h) as f64;
            let date = state.last_date + Duration::days(h as i64 + 1);
            let effect = state
                .weekday_effects
                .map_or(0.0, |effects| effects[weekday_index(date)]);
            state.intercept + state.slope * t + effect
        });
        finalize(raw, periods)
    }

    fn reset(&mut self) {
        self.store.clear();
    }
}
