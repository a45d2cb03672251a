//! Per-marketplace planning run.
//!
//! For every product of a marketplace: cross-validate and fit each registered
//! method, forecast the horizon, and keep the winner under the configured
//! metric. The winning forecasts are constrained, converted to shipments, and
//! optionally persisted to the ledger.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{Days, Local, NaiveDateTime};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use stockplan_constraints::ConstraintEngine;
use stockplan_core::{
    ForecastRecord, Marketplace, ModelName, ProductKey, ShipmentRecord, TimeSeriesPoint,
};
use stockplan_evaluation::{BestModel, EvaluationEngine, EvaluationResult};
use stockplan_forecasting::{ForecastMethod, MethodRegistry};
use stockplan_ledger::{ForecastLedger, LedgerError, RunId};
use stockplan_shipments::{CoverageAnalysis, ShipmentCalculator, ShipmentError, analyze_coverage};

use crate::config::{ConfigError, PipelineConfig};
use crate::ingest::{DataSet, IngestError};
use crate::output;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Shipment(#[from] ShipmentError),

    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Everything produced for one marketplace.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub marketplace: Marketplace,
    /// Forecast of every method, keyed by method name.
    pub candidates: BTreeMap<ModelName, Vec<ForecastRecord>>,
    /// Winning forecast per product; rows carry the winning model's name.
    pub best: Vec<ForecastRecord>,
    /// `best` after withdraw and defecture constraints.
    pub constrained: Vec<ForecastRecord>,
    /// Final shipments (constrained and box-rounded).
    pub shipments: Vec<ShipmentRecord>,
    pub evaluations: Vec<EvaluationResult>,
    pub best_models: Vec<BestModel>,
    pub coverage: CoverageAnalysis,
    /// Ledger snapshots written by this run.
    pub saved: Vec<RunId>,
}

impl RunOutcome {
    pub fn product_count(&self) -> usize {
        self.constrained
            .iter()
            .map(|r| &r.product)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn total_forecast(&self) -> f64 {
        self.constrained.iter().map(|r| r.quantity).sum()
    }

    pub fn total_shipment(&self) -> f64 {
        self.shipments.iter().map(|r| r.shipment).sum()
    }

    pub fn warehouse_count(&self) -> usize {
        self.shipments
            .iter()
            .map(|r| &r.warehouse)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Distinct models that won at least one product.
    pub fn selected_models(&self) -> Vec<ModelName> {
        self.best_models
            .iter()
            .map(|b| b.best_model.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Group a product-sorted series into per-product histories.
fn histories(
    sales: &[TimeSeriesPoint],
    only: Option<&ProductKey>,
) -> BTreeMap<ProductKey, Vec<TimeSeriesPoint>> {
    let mut out: BTreeMap<ProductKey, Vec<TimeSeriesPoint>> = BTreeMap::new();
    for p in sales.iter().filter(|p| only.is_none_or(|o| *o == p.product)) {
        out.entry(p.product.clone()).or_default().push(p.clone());
    }
    for series in out.values_mut() {
        series.sort_by_key(|p| p.date);
    }
    out
}

pub struct Pipeline {
    config: PipelineConfig,
    ledger: Option<ForecastLedger>,
}

impl Pipeline {
    /// Validate `config` and open the ledger when results are saved.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let ledger = if config.save_results {
            Some(ForecastLedger::open(&config.ledger_path)?)
        } else {
            None
        };
        Ok(Self { config, ledger })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn ledger(&self) -> Option<&ForecastLedger> {
        self.ledger.as_ref()
    }

    /// Plan every configured marketplace, stamping snapshots with the current
    /// local time.
    pub fn run(&self, data: &DataSet) -> Result<Vec<RunOutcome>, PipelineError> {
        self.run_at(data, Local::now().naive_local())
    }

    pub fn run_at(
        &self,
        data: &DataSet,
        timestamp: NaiveDateTime,
    ) -> Result<Vec<RunOutcome>, PipelineError> {
        let mut outcomes = Vec::new();
        for marketplace in self.config.marketplaces.marketplaces() {
            let outcome = self.run_marketplace(data, &marketplace, timestamp)?;
            if let Some(dir) = &self.config.output_dir {
                let written = output::write_outcome(dir, &outcome)?;
                debug!(marketplace = %marketplace, files = written.len(), "result tables written");
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    pub fn run_marketplace(
        &self,
        data: &DataSet,
        marketplace: &Marketplace,
        timestamp: NaiveDateTime,
    ) -> Result<RunOutcome, PipelineError> {
        let sales = data.sales(marketplace);
        let histories = histories(sales, self.config.product.as_ref());
        if histories.is_empty() {
            warn!(marketplace = %marketplace, "no sales history to forecast");
        }

        let mut registry = MethodRegistry::standard();
        let mut engine = EvaluationEngine::new();
        let mut candidates: BTreeMap<ModelName, Vec<ForecastRecord>> = BTreeMap::new();
        let mut best = Vec::new();

        for (product, history) in &histories {
            let forecasts = self.forecast_product(&mut registry, &mut engine, product, history);
            match engine.select_best(product, self.config.metric) {
                Some(winner) => {
                    debug!(product = %product, model = %winner, "model selected");
                    best.extend(forecasts.get(&winner).into_iter().flatten().cloned());
                }
                None => warn!(product = %product, "no scored model; product left out of the plan"),
            }
            for (model, rows) in forecasts {
                candidates.entry(model).or_default().extend(rows);
            }
        }

        let constraints = self.constraint_engine(data);
        let constrained = constraints.constrain_forecast(best.clone());

        let calculator = ShipmentCalculator::new(self.config.coverage_coefficient)?;
        let stocks = data.stocks(marketplace);
        let shipments = if stocks.is_empty() {
            warn!(marketplace = %marketplace, "no stock data; shipments not calculated");
            Vec::new()
        } else {
            constraints.constrain_shipments(calculator.calculate(&constrained, stocks))
        };

        let mut outcome = RunOutcome {
            marketplace: marketplace.clone(),
            candidates,
            best,
            constrained,
            shipments,
            evaluations: engine.summary(),
            best_models: engine.best_models_summary(self.config.metric),
            coverage: analyze_coverage(sales, stocks, None),
            saved: Vec::new(),
        };

        if let Some(ledger) = &self.ledger {
            outcome.saved = self.persist(ledger, &outcome, timestamp)?;
        }

        info!(
            marketplace = %marketplace,
            products = outcome.product_count(),
            total_forecast = outcome.total_forecast(),
            total_shipment = outcome.total_shipment(),
            warehouses = outcome.warehouse_count(),
            "marketplace planned"
        );
        Ok(outcome)
    }

    /// Cross-validate, refit on the full history and forecast with every method.
    fn forecast_product(
        &self,
        registry: &mut MethodRegistry,
        engine: &mut EvaluationEngine,
        product: &ProductKey,
        history: &[TimeSeriesPoint],
    ) -> BTreeMap<ModelName, Vec<ForecastRecord>> {
        let Some(last) = history.last().map(|p| p.date) else {
            return BTreeMap::new();
        };
        let periods = self.config.horizon_days();

        let mut out = BTreeMap::new();
        for method in registry.iter_mut() {
            let model = method.name();
            engine.cross_validate(history, method, product, self.config.train_fraction);

            if let Err(e) = method.fit(history, product) {
                warn!(product = %product, model = %model, error = %e, "model unfit; forecasting zeros");
            }
            let rows: Vec<ForecastRecord> = method
                .predict(product, periods)
                .into_iter()
                .enumerate()
                .filter_map(|(i, quantity)| {
                    let date = last.checked_add_days(Days::new(i as u64 + 1))?;
                    Some(ForecastRecord {
                        date,
                        product: product.clone(),
                        quantity,
                        model: model.clone(),
                    })
                })
                .collect();
            out.insert(model, rows);
        }
        out
    }

    fn constraint_engine(&self, data: &DataSet) -> ConstraintEngine {
        let mut box_sizes = data.box_sizes().clone();
        if let Some(size) = self.config.default_box_size {
            box_sizes = box_sizes.with_default(size);
        }
        ConstraintEngine::new()
            .with_withdraw(data.withdraw())
            .with_defecture(data.defecture())
            .with_box_sizes(box_sizes)
            .with_pools(data.stock_pools())
    }

    fn persist(
        &self,
        ledger: &ForecastLedger,
        outcome: &RunOutcome,
        timestamp: NaiveDateTime,
    ) -> Result<Vec<RunId>, LedgerError> {
        let mp = &outcome.marketplace;
        let mut saved = Vec::new();

        for (model, rows) in &outcome.candidates {
            let products: BTreeSet<_> = rows.iter().map(|r| &r.product).collect();
            let metadata = json!({
                "forecast_months": self.config.horizon_months,
                "products_count": products.len(),
            });
            saved.push(ledger.save(rows, model, mp, timestamp, Some(&metadata))?);
        }

        let metadata = json!({
            "forecast_months": self.config.horizon_months,
            "products_count": outcome.product_count(),
            "selected_models": outcome.selected_models(),
            "metric": self.config.metric,
            "coverage_coefficient": self.config.coverage_coefficient,
        });
        let best = ModelName::best();
        saved.push(ledger.save(&outcome.constrained, &best, mp, timestamp, Some(&metadata))?);
        Ok(saved)
    }
}
