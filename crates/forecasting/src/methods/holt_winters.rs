//! Additive Holt-Winters exponential smoothing.

use stockplan_core::{ModelName, ProductKey, TimeSeriesPoint};
use tracing::debug;

use crate::error::ForecastError;
use crate::method::{ForecastMethod, finalize, quantities, zeros};
use crate::stats::mean;
use crate::store::ModelStore;

#[derive(Debug, Clone, PartialEq)]
pub struct HoltWintersState {
    pub level: f64,
    pub trend: f64,
    /// Additive seasonal components indexed by absolute position modulo period.
    pub season: Vec<f64>,
    pub len: usize,
}

/// Additive trend-and-seasonality exponential smoothing (Holt-Winters).
///
/// Initialisation uses the first two seasons: level = mean of season one,
/// trend = per-step change between the two season means, seasonal components
/// = deviations of season one from its mean.
#[derive(Debug, Clone)]
pub struct HoltWinters {
    period: usize,
    alpha: f64,
    beta: f64,
    gamma: f64,
    store: ModelStore<HoltWintersState>,
}

impl HoltWinters {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            alpha: 0.3,
            beta: 0.05,
            gamma: 0.2,
            store: ModelStore::new(),
        }
    }

    pub fn weekly() -> Self {
        Self::new(7)
    }

    pub fn with_smoothing(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self.gamma = gamma;
        self
    }

    pub fn with_store(mut self, store: ModelStore<HoltWintersState>) -> Self {
        self.store = store;
        self
    }

    fn smoothing_is_valid(&self) -> bool {
        [self.alpha, self.beta, self.gamma]
            .iter()
            .all(|c| c.is_finite() && *c > 0.0 && *c <= 1.0)
    }
}

impl ForecastMethod for HoltWinters {
    fn name(&self) -> ModelName {
        ModelName::from_static("holt_winters")
    }

    fn fit(&mut self, history: &[TimeSeriesPoint], product: &ProductKey) -> Result<(), ForecastError> {
        if self.period == 0 || !self.smoothing_is_valid() {
            self.store.record_unfit(product);
            return Err(ForecastError::ill_conditioned(
                product,
                "period must be >= 1 and smoothing coefficients in (0, 1]",
            ));
        }

        let ys = quantities(history);
        let m = self.period;
        if ys.len() < 2 * m {
            self.store.record_unfit(product);
            debug!(product = %product, model = %self.name(), points = ys.len(), "less than two seasons; recorded as unfit");
            return Err(ForecastError::insufficient(product, ys.len(), 2 * m));
        }

        let first = mean(&ys[..m]);
        let second = mean(&ys[m..2 * m]);
        let mut level = first;
        let mut trend = (second - first) / m as f64;
        let mut season: Vec<f64> = ys[..m].iter().map(|y| y - first).collect();

        for (t, y) in ys.iter().enumerate().skip(m) {
            let idx = t % m;
            let prev_level = level;
            level = self.alpha * (y - season[idx]) + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - prev_level) + (1.0 - self.beta) * trend;
            season[idx] = self.gamma * (y - level) + (1.0 - self.gamma) * season[idx];
        }

        self.store.record_fit(
            product,
            HoltWintersState {
                level,
                trend,
                season,
                len: ys.len(),
            },
        );
        Ok(())
    }

    fn predict(&self, product: &ProductKey, periods: usize) -> Vec<f64> {
        let Some(state) = self.store.fitted(product) else {
            return zeros(periods);
        };
        let m = state.season.len();
        let raw = (0..periods).map(|h| {
            let steps = (h + 1) as f64;
            state.level + steps * state.trend + state.season[(state.len + h) % m]
        });
        finalize(raw, periods)
    }

    fn reset(&mut self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn history(product: &ProductKey, values: impl IntoIterator<Item = f64>) -> Vec<TimeSeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(start + Duration::days(i as i64), product.clone(), v))
            .collect()
    }

    #[test]
    fn reproduces_a_stable_seasonal_pattern() {
        let p = ProductKey::new("P").unwrap();
        let pattern = [10.0, 20.0, 30.0];
        let mut m = HoltWinters::new(3);
        m.fit(&history(&p, pattern.iter().cycle().take(30).copied()), &p).unwrap();

        let out = m.predict(&p, 3);
        for (got, want) in out.iter().zip(pattern) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
    }

    #[test]
    fn requires_two_full_seasons() {
        let p = ProductKey::new("P").unwrap();
        let mut m = HoltWinters::weekly();
        let err = m.fit(&history(&p, vec![1.0; 13]), &p).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientHistory { required: 14, .. }));
        assert_eq!(m.predict(&p, 2), vec![0.0, 0.0]);
    }

    #[test]
    fn invalid_smoothing_is_ill_conditioned() {
        let p = ProductKey::new("P").unwrap();
        let mut m = HoltWinters::new(2).with_smoothing(0.0, 0.1, 0.1);
        let err = m.fit(&history(&p, vec![1.0; 10]), &p).unwrap_err();
        assert!(matches!(err, ForecastError::IllConditioned { .. }));
    }
}
