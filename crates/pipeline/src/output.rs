//! Result tables written next to a run when an output directory is set.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use stockplan_core::{ModelName, ProductKey};
use stockplan_evaluation::{BestModel, EvaluationResult};

use crate::orchestrator::{PipelineError, RunOutcome};

/// Flat evaluation row; CSV cannot carry nested metrics.
#[derive(Debug, Serialize)]
struct EvaluationRow<'a> {
    unified_code: &'a ProductKey,
    model_name: &'a ModelName,
    mae: f64,
    rmse: f64,
    mape: f64,
    r2: f64,
    points: usize,
}

impl<'a> From<&'a EvaluationResult> for EvaluationRow<'a> {
    fn from(r: &'a EvaluationResult) -> Self {
        Self {
            unified_code: &r.product,
            model_name: &r.model,
            mae: r.metrics.mae,
            rmse: r.metrics.rmse,
            mape: r.metrics.mape,
            r2: r.metrics.r2,
            points: r.metrics.points,
        }
    }
}

#[derive(Debug, Serialize)]
struct BestModelRow<'a> {
    unified_code: &'a ProductKey,
    best_model: &'a ModelName,
    mae: f64,
    rmse: f64,
    mape: f64,
    r2: f64,
}

impl<'a> From<&'a BestModel> for BestModelRow<'a> {
    fn from(b: &'a BestModel) -> Self {
        Self {
            unified_code: &b.result.product,
            best_model: &b.best_model,
            mae: b.result.metrics.mae,
            rmse: b.result.metrics.rmse,
            mape: b.result.metrics.mape,
            r2: b.result.metrics.r2,
        }
    }
}

fn write_rows<T: Serialize>(
    path: PathBuf,
    rows: impl IntoIterator<Item = T>,
) -> Result<PathBuf, PipelineError> {
    let output_err = |source| PipelineError::Output {
        path: path.clone(),
        source,
    };
    let mut writer = csv::Writer::from_path(&path).map_err(output_err)?;
    for row in rows {
        writer.serialize(row).map_err(output_err)?;
    }
    writer.flush().map_err(|e| output_err(e.into()))?;
    Ok(path)
}

/// Write `<mp>_forecast.csv`, `<mp>_shipments.csv`, `<mp>_model_evaluation.csv`
/// and `<mp>_best_models.csv` into `dir`.
pub fn write_outcome(dir: &Path, outcome: &RunOutcome) -> Result<Vec<PathBuf>, PipelineError> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::Output {
        path: dir.to_path_buf(),
        source: e.into(),
    })?;
    let mp = &outcome.marketplace;

    Ok(vec![
        write_rows(dir.join(format!("{mp}_forecast.csv")), &outcome.constrained)?,
        write_rows(dir.join(format!("{mp}_shipments.csv")), &outcome.shipments)?,
        write_rows(
            dir.join(format!("{mp}_model_evaluation.csv")),
            outcome.evaluations.iter().map(EvaluationRow::from),
        )?,
        write_rows(
            dir.join(format!("{mp}_best_models.csv")),
            outcome.best_models.iter().map(BestModelRow::from),
        )?,
    ])
}
