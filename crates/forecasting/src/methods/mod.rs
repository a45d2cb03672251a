//! Concrete forecasting methods.

pub mod baseline;
pub mod holt_winters;
pub mod seasonal;
pub mod trend;

pub use baseline::{BaselineMethod, Statistic};
pub use holt_winters::HoltWinters;
pub use seasonal::SeasonalNaive;
pub use trend::LinearTrend;
