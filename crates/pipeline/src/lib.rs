//! Orchestration of the planner: configuration, table ingestion and the
//! per-marketplace run (fit, evaluate, select, constrain, ship, persist).

pub mod config;
pub mod ingest;
pub mod orchestrator;
pub mod output;

pub use config::{Cli, ConfigError, MarketplaceSelection, PipelineConfig};
pub use ingest::{DataSet, IngestError, aggregate_sales};
pub use orchestrator::{Pipeline, PipelineError, RunOutcome};
