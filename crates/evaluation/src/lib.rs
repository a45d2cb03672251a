//! `stockplan-evaluation`
//!
//! **Responsibility:** score forecasting methods against held-out history and
//! pick the most trustworthy one per product.
//!
//! - Unscoreable comparisons resolve to worst-case sentinel metrics, never errors.
//! - Results are stored under a structured `(product, model)` key; the latest
//!   evaluation of a key wins.

pub mod engine;
pub mod metrics;
pub mod selector;

pub use engine::{EvaluationEngine, EvaluationResult};
pub use metrics::{Metric, Metrics, UnknownMetric};
pub use selector::BestModel;
