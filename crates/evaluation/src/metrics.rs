//! Accuracy metrics over filtered comparison points.

use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accuracy of one prediction against actuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mae: f64,
    pub rmse: f64,
    /// Mean absolute percentage error, in percent.
    pub mape: f64,
    /// Explained variance, `1 - SS_res / SS_tot`.
    pub r2: f64,
    /// Comparison points that survived filtering.
    pub points: usize,
}

impl Metrics {
    /// Sentinel for "nothing to compare": worst possible on every metric.
    pub fn worst() -> Self {
        Self {
            mae: f64::INFINITY,
            rmse: f64::INFINITY,
            mape: f64::INFINITY,
            r2: f64::NEG_INFINITY,
            points: 0,
        }
    }

    /// Compare `actual` against `predicted`.
    ///
    /// Both sequences are truncated to their common length. A point is kept
    /// only when the actual is finite and positive and the prediction finite.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        let pairs: Vec<(f64, f64)> = actual
            .iter()
            .zip(predicted)
            .filter(|(a, p)| a.is_finite() && **a > 0.0 && p.is_finite())
            .map(|(a, p)| (*a, *p))
            .collect();

        if pairs.is_empty() {
            return Self::worst();
        }

        let n = pairs.len() as f64;
        let mae = pairs.iter().map(|(a, p)| (a - p).abs()).sum::<f64>() / n;
        let mse = pairs.iter().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / n;
        let mape = pairs.iter().map(|(a, p)| ((a - p) / a).abs()).sum::<f64>() / n * 100.0;

        let mean_actual = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
        let ss_res: f64 = pairs.iter().map(|(a, p)| (a - p).powi(2)).sum();
        let ss_tot: f64 = pairs.iter().map(|(a, _)| (a - mean_actual).powi(2)).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { f64::NEG_INFINITY };

        Self {
            mae,
            rmse: mse.sqrt(),
            mape,
            r2,
            points: pairs.len(),
        }
    }

    pub fn is_scored(&self) -> bool {
        self.points > 0
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mae => self.mae,
            Metric::Rmse => self.rmse,
            Metric::Mape => self.mape,
            Metric::R2 => self.r2,
        }
    }
}

/// Metric used to rank models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Mae,
    Rmse,
    Mape,
    R2,
}

impl Metric {
    /// Error-type metrics are minimised; explained variance is maximised.
    pub fn lower_is_better(self) -> bool {
        !matches!(self, Metric::R2)
    }

    /// Ordering where `Less` means `a` is the better score.
    pub fn rank(self, a: f64, b: f64) -> Ordering {
        if self.lower_is_better() {
            a.total_cmp(&b)
        } else {
            b.total_cmp(&a)
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Mae => "mae",
            Metric::Rmse => "rmse",
            Metric::Mape => "mape",
            Metric::R2 => "r2",
        }
    }
}

impl core::fmt::Display for Metric {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric {0:?} (expected mae, rmse, mape or r2)")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mae" => Ok(Metric::Mae),
            "rmse" => Ok(Metric::Rmse),
            "mape" => Ok(Metric::Mape),
            "r2" => Ok(Metric::R2),
            _ => Err(UnknownMetric(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_all_metrics_on_valid_points() {
        let m = Metrics::compute(&[10.0, 20.0, 30.0], &[12.0, 18.0, 33.0]);
        assert_eq!(m.points, 3);
        assert!((m.mae - 7.0 / 3.0).abs() < 1e-9);
        assert!((m.rmse - (17.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((m.mape - (20.0 + 10.0 + 10.0) / 3.0).abs() < 1e-9);
        assert!((m.r2 - (1.0 - 17.0 / 200.0)).abs() < 1e-9);
    }

    #[test]
    fn truncates_and_filters_invalid_points() {
        // 0 actual, NaN prediction and the tail beyond the shorter series are dropped.
        let m = Metrics::compute(&[0.0, 10.0, 5.0, 7.0, 9.0], &[1.0, 10.0, f64::NAN, 8.0]);
        assert_eq!(m.points, 2);
        assert!((m.mae - 0.5).abs() < 1e-9);
    }

    #[test]
    fn no_valid_points_yields_sentinel() {
        assert_eq!(Metrics::compute(&[0.0, -1.0], &[1.0, 1.0]), Metrics::worst());
        assert_eq!(Metrics::compute(&[], &[]), Metrics::worst());
        assert!(!Metrics::worst().is_scored());
    }

    #[test]
    fn constant_actuals_have_undefined_explained_variance() {
        let m = Metrics::compute(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]);
        assert_eq!(m.r2, f64::NEG_INFINITY);
        assert_eq!(m.mae, 0.0);
    }

    #[test]
    fn metric_parsing_and_direction() {
        assert_eq!("MAPE".parse::<Metric>().unwrap(), Metric::Mape);
        assert!("smape".parse::<Metric>().is_err());
        assert_eq!(Metric::Mae.rank(1.0, 2.0), Ordering::Less);
        assert_eq!(Metric::R2.rank(0.9, 0.1), Ordering::Less);
    }
}
