//! Run configuration and its command-line surface.

use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use stockplan_core::{DomainError, Marketplace, ProductKey};
use stockplan_evaluation::Metric;
use stockplan_evaluation::engine::DEFAULT_TRAIN_FRACTION;
use stockplan_observability::LogFormat;
use stockplan_shipments::DEFAULT_COVERAGE_COEFFICIENT;

pub const DEFAULT_HORIZON_MONTHS: u32 = 18;

/// Forecast days per horizon month.
pub const DAYS_PER_MONTH: u32 = 30;

/// Longest accepted forecast horizon (ten years).
pub const MAX_HORIZON_MONTHS: u32 = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MarketplaceSelection {
    Wb,
    Ozon,
    #[default]
    Both,
}

impl MarketplaceSelection {
    pub fn marketplaces(self) -> Vec<Marketplace> {
        match self {
            Self::Wb => vec![Marketplace::wildberries()],
            Self::Ozon => vec![Marketplace::ozon()],
            Self::Both => vec![Marketplace::wildberries(), Marketplace::ozon()],
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("coverage coefficient must be finite and positive, got {0}")]
    InvalidCoverage(f64),

    #[error("train fraction must lie strictly between 0 and 1, got {0}")]
    InvalidTrainFraction(f64),

    #[error("forecast horizon must lie between 1 and {MAX_HORIZON_MONTHS} months, got {0}")]
    InvalidHorizon(u32),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Settings of one planner run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Directory holding the normalized input tables.
    pub data_path: PathBuf,
    /// Directory of the forecast ledger.
    pub ledger_path: PathBuf,
    /// Where per-marketplace result tables are written, if anywhere.
    pub output_dir: Option<PathBuf>,
    pub horizon_months: u32,
    pub coverage_coefficient: f64,
    /// Metric used to pick the winning model per product.
    pub metric: Metric,
    pub train_fraction: f64,
    /// Box size for products without their own entry (24 when unset).
    pub default_box_size: Option<NonZeroU32>,
    pub marketplaces: MarketplaceSelection,
    /// Restrict the run to one product.
    pub product: Option<ProductKey>,
    pub save_results: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data"),
            ledger_path: PathBuf::from("forecast_history"),
            output_dir: None,
            horizon_months: DEFAULT_HORIZON_MONTHS,
            coverage_coefficient: DEFAULT_COVERAGE_COEFFICIENT,
            metric: Metric::Mape,
            train_fraction: DEFAULT_TRAIN_FRACTION,
            default_box_size: None,
            marketplaces: MarketplaceSelection::Both,
            product: None,
            save_results: true,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.coverage_coefficient.is_finite() || self.coverage_coefficient <= 0.0 {
            return Err(ConfigError::InvalidCoverage(self.coverage_coefficient));
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(ConfigError::InvalidTrainFraction(self.train_fraction));
        }
        if !(1..=MAX_HORIZON_MONTHS).contains(&self.horizon_months) {
            return Err(ConfigError::InvalidHorizon(self.horizon_months));
        }
        Ok(())
    }

    /// Number of daily forecast values per product.
    pub fn horizon_days(&self) -> usize {
        self.horizon_months as usize * DAYS_PER_MONTH as usize
    }
}

/// Forecast marketplace demand and plan warehouse shipments.
#[derive(Parser, Debug)]
#[command(name = "stockplan")]
#[command(about = "Forecast marketplace demand and plan warehouse shipments")]
#[command(version)]
pub struct Cli {
    /// Directory with the normalized input tables
    #[arg(long, env = "STOCKPLAN_DATA_PATH", default_value = "data")]
    pub data_path: PathBuf,

    /// Directory of the forecast ledger
    #[arg(long, env = "STOCKPLAN_LEDGER_PATH", default_value = "forecast_history")]
    pub ledger_path: PathBuf,

    /// Write forecast, shipment and evaluation tables here
    #[arg(long, env = "STOCKPLAN_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Marketplace(s) to plan
    #[arg(long, env = "STOCKPLAN_MARKETPLACE", value_enum, default_value_t = MarketplaceSelection::Both)]
    pub marketplace: MarketplaceSelection,

    /// Forecast horizon in months
    #[arg(long, env = "STOCKPLAN_MONTHS", default_value_t = DEFAULT_HORIZON_MONTHS)]
    pub months: u32,

    /// Only plan this unified product code
    #[arg(long, env = "STOCKPLAN_PRODUCT")]
    pub product: Option<String>,

    /// Target stock as a multiple of monthly demand
    #[arg(long, env = "STOCKPLAN_COVERAGE", default_value_t = DEFAULT_COVERAGE_COEFFICIENT)]
    pub coverage: f64,

    /// Model selection metric (mae, rmse, mape, r2)
    #[arg(long, env = "STOCKPLAN_METRIC", default_value = "mape")]
    pub metric: Metric,

    /// Share of history used for fitting during evaluation
    #[arg(long, env = "STOCKPLAN_TRAIN_FRACTION", default_value_t = DEFAULT_TRAIN_FRACTION)]
    pub train_fraction: f64,

    /// Box size for products without their own entry
    #[arg(long, env = "STOCKPLAN_BOX_SIZE")]
    pub box_size: Option<NonZeroU32>,

    /// Do not write snapshots to the ledger
    #[arg(long, env = "STOCKPLAN_NO_SAVE")]
    pub no_save: bool,

    /// Log output format (json or pretty)
    #[arg(long, env = "STOCKPLAN_LOG_FORMAT", default_value = "json")]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        let config = PipelineConfig {
            data_path: self.data_path,
            ledger_path: self.ledger_path,
            output_dir: self.output_dir,
            horizon_months: self.months,
            coverage_coefficient: self.coverage,
            metric: self.metric,
            train_fraction: self.train_fraction,
            default_box_size: self.box_size,
            marketplaces: self.marketplace,
            product: self.product.map(ProductKey::new).transpose()?,
            save_results: !self.no_save,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.horizon_days(), 540);
        assert_eq!(config.metric, Metric::Mape);
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let bad = PipelineConfig {
            coverage_coefficient: 0.0,
            ..PipelineConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::InvalidCoverage(0.0)));

        let bad = PipelineConfig {
            train_fraction: 1.0,
            ..PipelineConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::InvalidTrainFraction(1.0)));

        let bad = PipelineConfig {
            horizon_months: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::InvalidHorizon(0)));

        let bad = PipelineConfig {
            horizon_months: u32::MAX,
            ..PipelineConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::InvalidHorizon(u32::MAX)));

        let longest = PipelineConfig {
            horizon_months: MAX_HORIZON_MONTHS,
            ..PipelineConfig::default()
        };
        assert_eq!(longest.validate(), Ok(()));
        assert_eq!(longest.horizon_days(), 3600);
    }

    #[test]
    fn cli_maps_onto_config() {
        let cli = Cli::try_parse_from([
            "stockplan",
            "--marketplace",
            "ozon",
            "--months",
            "3",
            "--product",
            "SKU-1",
            "--metric",
            "rmse",
            "--box-size",
            "12",
            "--no-save",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();
        assert_eq!(config.marketplaces.marketplaces(), vec![Marketplace::ozon()]);
        assert_eq!(config.horizon_months, 3);
        assert_eq!(config.product, Some(ProductKey::new("SKU-1").unwrap()));
        assert_eq!(config.metric, Metric::Rmse);
        assert_eq!(config.default_box_size, NonZeroU32::new(12));
        assert!(!config.save_results);
        assert_eq!(config.coverage_coefficient, DEFAULT_COVERAGE_COEFFICIENT);
    }

    #[test]
    fn cli_rejects_invalid_values() {
        assert!(Cli::try_parse_from(["stockplan", "--metric", "accuracy"]).is_err());
        assert!(Cli::try_parse_from(["stockplan", "--box-size", "0"]).is_err());

        let cli = Cli::try_parse_from(["stockplan", "--coverage=-1"]).unwrap();
        assert!(matches!(cli.into_config(), Err(ConfigError::InvalidCoverage(_))));

        let cli = Cli::try_parse_from(["stockplan", "--months", "4294967295"]).unwrap();
        assert!(matches!(cli.into_config(), Err(ConfigError::InvalidHorizon(_))));
    }
}
