//! `stockplan-forecasting`
//!
//! **Responsibility:** the forecasting-method boundary.
//!
//! Every method honours the same two-call contract (`fit`, then `predict`) and
//! keeps its fitted state in an explicitly owned, per-product [`ModelStore`].
//! Methods never fail a pipeline: a product that cannot be fitted is recorded
//! as unfit and predicts zeros.

pub mod error;
pub mod method;
pub mod methods;
pub mod registry;
pub mod stats;
pub mod store;

pub use error::ForecastError;
pub use method::ForecastMethod;
pub use methods::{BaselineMethod, HoltWinters, LinearTrend, SeasonalNaive, Statistic};
pub use registry::{MethodKind, MethodRegistry};
pub use store::{FitState, ModelStore};
