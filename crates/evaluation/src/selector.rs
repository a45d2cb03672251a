//! Per-product model selection over stored evaluation results.

use serde::Serialize;
use stockplan_core::{ModelName, ProductKey};

use crate::engine::{EvaluationEngine, EvaluationResult};
use crate::metrics::Metric;

/// Winning model of one product, with the score that won.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestModel {
    pub best_model: ModelName,
    #[serde(flatten)]
    pub result: EvaluationResult,
}

impl EvaluationEngine {
    /// Pick the best-scoring model for `product`.
    ///
    /// Error metrics are minimised and `r2` is maximised. Unscored (sentinel)
    /// results never win; `None` means no scored evaluation exists and the
    /// caller must leave the product out rather than guess a model.
    ///
    /// Ties go to the lexicographically smallest model name.
    pub fn select_best(&self, product: &ProductKey, metric: Metric) -> Option<ModelName> {
        self.best_result(product, metric).map(|r| r.model.clone())
    }

    fn best_result<'a>(&'a self, product: &'a ProductKey, metric: Metric) -> Option<&'a EvaluationResult> {
        let mut best: Option<&'a EvaluationResult> = None;
        for candidate in self.results_for(product).filter(|r| r.is_scored()) {
            let score = candidate.metrics.get(metric);
            match best {
                Some(current) if !metric.rank(score, current.metrics.get(metric)).is_lt() => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    /// Winning model and metrics for every evaluated product.
    pub fn best_models_summary(&self, metric: Metric) -> Vec<BestModel> {
        self.products()
            .iter()
            .filter_map(|p| self.best_result(p, metric))
            .map(|r| BestModel {
                best_model: r.model.clone(),
                result: r.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use stockplan_core::TimeSeriesPoint;

    fn key(s: &str) -> ProductKey {
        ProductKey::new(s).unwrap()
    }

    fn model(s: &str) -> ModelName {
        ModelName::new(s).unwrap()
    }

    fn series(product: &ProductKey, values: &[f64]) -> Vec<TimeSeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(start + Duration::days(i as i64), product.clone(), *v))
            .collect()
    }

    #[test]
    fn lowest_error_wins_and_r2_is_maximised() {
        let p = key("P");
        let actual = series(&p, &[10.0, 20.0, 30.0]);
        let mut engine = EvaluationEngine::new();
        engine.evaluate(&actual, &[11.0, 19.0, 31.0], &model("close"), &p);
        engine.evaluate(&actual, &[20.0, 20.0, 20.0], &model("flat"), &p);

        for metric in [Metric::Mae, Metric::Rmse, Metric::Mape, Metric::R2] {
            assert_eq!(engine.select_best(&p, metric), Some(model("close")), "{metric}");
        }
    }

    #[test]
    fn unknown_product_has_no_winner() {
        let engine = EvaluationEngine::new();
        assert_eq!(engine.select_best(&key("nope"), Metric::Mape), None);
    }

    #[test]
    fn sentinel_only_product_has_no_winner() {
        let p = key("P");
        let mut engine = EvaluationEngine::new();
        engine.evaluate(&series(&p, &[0.0]), &[1.0], &model("a"), &p);
        assert_eq!(engine.select_best(&p, Metric::Mape), None);
        assert!(engine.best_models_summary(Metric::Mape).is_empty());
    }

    #[test]
    fn ties_resolve_to_smallest_model_name() {
        let p = key("P");
        let actual = series(&p, &[10.0]);
        let mut engine = EvaluationEngine::new();
        engine.evaluate(&actual, &[12.0], &model("zeta"), &p);
        engine.evaluate(&actual, &[8.0], &model("alpha"), &p);
        assert_eq!(engine.select_best(&p, Metric::Mae), Some(model("alpha")));
    }

    #[test]
    fn best_models_summary_lists_each_product_once() {
        let mut engine = EvaluationEngine::new();
        for (p, m, pred) in [("A", "x", 9.0), ("A", "y", 10.0), ("B", "x", 10.0), ("B", "y", 4.0)] {
            let p = key(p);
            engine.evaluate(&series(&p, &[10.0]), &[pred], &model(m), &p);
        }

        let summary = engine.best_models_summary(Metric::Mae);
        let winners: Vec<(&str, &str)> = summary
            .iter()
            .map(|b| (b.result.product.as_str(), b.best_model.as_str()))
            .collect();
        assert_eq!(winners, vec![("A", "y"), ("B", "x")]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a model without valid points never beats one with at least one.
            #[test]
            fn sentinel_never_beats_a_scored_model(
                actual in prop::collection::vec(0.1f64..1000.0, 1..30),
                noise in prop::collection::vec(-500.0f64..500.0, 30),
            ) {
                let p = key("P");
                let history = series(&p, &actual);
                let predicted: Vec<f64> = actual.iter().zip(&noise).map(|(a, n)| a + n).collect();

                let mut engine = EvaluationEngine::new();
                engine.evaluate(&history, &predicted, &model("scored"), &p);
                engine.evaluate(&history, &[], &model("empty"), &p);

                prop_assert!(!engine.result(&p, &model("empty")).unwrap().is_scored());
                for metric in [Metric::Mae, Metric::Rmse, Metric::Mape, Metric::R2] {
                    prop_assert_eq!(engine.select_best(&p, metric), Some(model("scored")));
                }
            }

            /// Property: rmse dominates mae on any scored comparison.
            #[test]
            fn rmse_is_never_below_mae(
                pairs in prop::collection::vec((0.1f64..1000.0, 0.0f64..1000.0), 1..50),
            ) {
                let (actual, predicted): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
                let m = crate::metrics::Metrics::compute(&actual, &predicted);
                prop_assert!(m.rmse + 1e-9 >= m.mae);
            }
        }
    }
}
