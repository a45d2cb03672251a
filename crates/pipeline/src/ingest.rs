//! Loading of the normalized input tables.
//!
//! | file | columns |
//! |---|---|
//! | `<mp>_sales.csv` | `date,unified_code,quantity` |
//! | `<mp>_stocks.csv`, `our_stocks.csv` | `date,warehouse,unified_code,stock` |
//! | `withdraw.csv` | `unified_code` |
//! | `defecture.csv` | `unified_code,end_date` (end date may be empty) |
//! | `box_sizes.csv` | `unified_code,box_size` |
//!
//! Every table is optional; a missing file loads as empty. Only a missing data
//! directory or a malformed table is an error.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use stockplan_constraints::{BoxSizes, StockPools};
use stockplan_core::{
    DefectureEntry, Marketplace, ProductKey, StockRecord, TimeSeriesPoint, WarehouseId,
    WithdrawEntry,
};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("data directory {0} does not exist")]
    MissingDataDir(PathBuf),

    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid row in {path}: {reason}")]
    InvalidRow { path: PathBuf, reason: String },
}

#[derive(Debug, Deserialize)]
struct SalesRow {
    date: NaiveDate,
    unified_code: ProductKey,
    quantity: f64,
}

#[derive(Debug, Deserialize)]
struct StockRow {
    date: NaiveDate,
    warehouse: WarehouseId,
    unified_code: ProductKey,
    stock: f64,
}

impl From<StockRow> for StockRecord {
    fn from(row: StockRow) -> Self {
        StockRecord::new(row.date, row.warehouse, row.unified_code, row.stock)
    }
}

#[derive(Debug, Deserialize)]
struct BoxSizeRow {
    unified_code: ProductKey,
    box_size: u32,
}

/// Sum duplicate `(date, product)` points and sort by product, then date.
pub fn aggregate_sales(points: impl IntoIterator<Item = TimeSeriesPoint>) -> Vec<TimeSeriesPoint> {
    let mut sums: BTreeMap<(ProductKey, NaiveDate), f64> = BTreeMap::new();
    for p in points {
        *sums.entry((p.product, p.date)).or_insert(0.0) += p.quantity;
    }
    sums.into_iter()
        .map(|((product, date), quantity)| TimeSeriesPoint::new(date, product, quantity))
        .collect()
}

/// `None` when the file does not exist.
fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, IngestError> {
    if !path.exists() {
        debug!(path = %path.display(), "optional table not present");
        return Ok(None);
    }
    let csv_err = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_err)?;
    debug!(path = %path.display(), rows = rows.len(), "table loaded");
    Ok(Some(rows))
}

/// All input tables of a run.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    sales: BTreeMap<Marketplace, Vec<TimeSeriesPoint>>,
    stocks: BTreeMap<Marketplace, Vec<StockRecord>>,
    our_stocks: Vec<StockRecord>,
    withdraw: Vec<WithdrawEntry>,
    defecture: Vec<DefectureEntry>,
    box_sizes: BoxSizes,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the tables of `marketplaces` plus the shared tables from `dir`.
    pub fn load(dir: &Path, marketplaces: &[Marketplace]) -> Result<Self, IngestError> {
        if !dir.is_dir() {
            return Err(IngestError::MissingDataDir(dir.to_path_buf()));
        }

        let mut data = Self::new();
        for mp in marketplaces {
            let sales: Vec<SalesRow> =
                read_table(&dir.join(format!("{mp}_sales.csv")))?.unwrap_or_default();
            data = data.with_sales(
                mp.clone(),
                sales
                    .into_iter()
                    .map(|r| TimeSeriesPoint::new(r.date, r.unified_code, r.quantity)),
            );

            let stocks: Vec<StockRow> =
                read_table(&dir.join(format!("{mp}_stocks.csv")))?.unwrap_or_default();
            data = data.with_stocks(mp.clone(), stocks.into_iter().map(StockRecord::from).collect());
        }

        let our: Vec<StockRow> = read_table(&dir.join("our_stocks.csv"))?.unwrap_or_default();
        data.our_stocks = our.into_iter().map(StockRecord::from).collect();
        data.withdraw = read_table(&dir.join("withdraw.csv"))?.unwrap_or_default();
        data.defecture = read_table(&dir.join("defecture.csv"))?.unwrap_or_default();

        let path = dir.join("box_sizes.csv");
        let rows: Vec<BoxSizeRow> = read_table(&path)?.unwrap_or_default();
        for row in rows {
            let size = NonZeroU32::new(row.box_size).ok_or_else(|| IngestError::InvalidRow {
                path: path.clone(),
                reason: format!("box size of {} is zero", row.unified_code),
            })?;
            data.box_sizes.insert(row.unified_code, size);
        }

        info!(
            dir = %dir.display(),
            marketplaces = data.sales.len(),
            withdraw = data.withdraw.len(),
            defecture = data.defecture.len(),
            box_sizes = data.box_sizes.len(),
            "input tables loaded"
        );
        Ok(data)
    }

    /// Duplicate `(date, product)` points are summed.
    pub fn with_sales(
        mut self,
        marketplace: Marketplace,
        points: impl IntoIterator<Item = TimeSeriesPoint>,
    ) -> Self {
        self.sales.insert(marketplace, aggregate_sales(points));
        self
    }

    pub fn with_stocks(mut self, marketplace: Marketplace, records: Vec<StockRecord>) -> Self {
        self.stocks.insert(marketplace, records);
        self
    }

    pub fn with_our_stocks(mut self, records: Vec<StockRecord>) -> Self {
        self.our_stocks = records;
        self
    }

    pub fn with_withdraw(mut self, entries: Vec<WithdrawEntry>) -> Self {
        self.withdraw = entries;
        self
    }

    pub fn with_defecture(mut self, entries: Vec<DefectureEntry>) -> Self {
        self.defecture = entries;
        self
    }

    pub fn with_box_sizes(mut self, box_sizes: BoxSizes) -> Self {
        self.box_sizes = box_sizes;
        self
    }

    /// Sales of `marketplace`, sorted by product then date.
    pub fn sales(&self, marketplace: &Marketplace) -> &[TimeSeriesPoint] {
        self.sales.get(marketplace).map_or(&[], Vec::as_slice)
    }

    pub fn stocks(&self, marketplace: &Marketplace) -> &[StockRecord] {
        self.stocks.get(marketplace).map_or(&[], Vec::as_slice)
    }

    pub fn our_stocks(&self) -> &[StockRecord] {
        &self.our_stocks
    }

    pub fn withdraw(&self) -> &[WithdrawEntry] {
        &self.withdraw
    }

    pub fn defecture(&self) -> &[DefectureEntry] {
        &self.defecture
    }

    pub fn box_sizes(&self) -> &BoxSizes {
        &self.box_sizes
    }

    /// Every marketplace stock table plus internal stock.
    pub fn stock_pools(&self) -> StockPools {
        let pools = self
            .stocks
            .iter()
            .fold(StockPools::new(), |pools, (mp, records)| {
                pools.with_marketplace(mp.clone(), records)
            });
        pools.with_internal(&self.our_stocks)
    }
}
