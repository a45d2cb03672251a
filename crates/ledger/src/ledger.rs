//! File-backed forecast ledger.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use stockplan_core::{ForecastRecord, Marketplace, ModelName};

use crate::error::LedgerError;
use crate::query::{HistoryRecord, RunFilter};
use crate::run::{ForecastRun, RunId};

/// Append-only store of forecast snapshots in one directory.
///
/// ## Write semantics
///
/// `save()` never overwrites: files are opened with `create_new`, so a second
/// save under the same identity fails with [`LedgerError::SnapshotExists`].
/// A failed save removes whatever it created, so no partial snapshot is
/// ever listed.
///
/// ## Read semantics
///
/// - `load()` returns `None` when the snapshot is missing or unreadable.
/// - "Latest" is the most recently written snapshot (table modification
///   time), ties broken by the timestamp encoded in the identity. A
///   back-dated save is still the latest one.
/// - `list_runs()` and `history()` skip files they cannot parse.
#[derive(Debug, Clone)]
pub struct ForecastLedger {
    dir: PathBuf,
}

impl ForecastLedger {
    /// Open (creating if needed) the ledger directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn create_new(&self, name: &str, id: &RunId) -> Result<File, LedgerError> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.dir.join(name))
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => LedgerError::SnapshotExists(id.clone()),
                _ => LedgerError::Io(e),
            })
    }

    /// Persist `forecast` as a new snapshot.
    pub fn save(
        &self,
        forecast: &[ForecastRecord],
        model: &ModelName,
        marketplace: &Marketplace,
        timestamp: NaiveDateTime,
        metadata: Option<&JsonValue>,
    ) -> Result<RunId, LedgerError> {
        let id = RunId::new(marketplace.clone(), model.clone(), timestamp);

        let file = self.create_new(&id.csv_file_name(), &id)?;
        if let Err(err) = self.write_snapshot(file, &id, forecast, metadata) {
            self.discard(&id.csv_file_name());
            return Err(err);
        }

        info!(run = %id, rows = forecast.len(), "forecast snapshot saved");
        Ok(id)
    }

    fn write_snapshot(
        &self,
        file: File,
        id: &RunId,
        forecast: &[ForecastRecord],
        metadata: Option<&JsonValue>,
    ) -> Result<(), LedgerError> {
        let mut writer = csv::Writer::from_writer(file);
        for record in forecast {
            writer.serialize(record)?;
        }
        writer.flush()?;
        drop(writer);

        let Some(metadata) = metadata else {
            return Ok(());
        };
        let mut file = self.create_new(&id.meta_file_name(), id)?;
        let written = serde_json::to_writer_pretty(&mut file, metadata)
            .map_err(LedgerError::from)
            .and_then(|()| file.write_all(b"\n").map_err(LedgerError::from));
        if written.is_err() {
            drop(file);
            self.discard(&id.meta_file_name());
        }
        written
    }

    /// Remove a file left behind by a failed save.
    fn discard(&self, name: &str) {
        if let Err(err) = fs::remove_file(self.dir.join(name)) {
            warn!(file = name, error = %err, "could not remove partial snapshot file");
        }
    }

    /// Exact snapshot, or the most recent one for `(marketplace, model)` when
    /// `timestamp` is `None`.
    pub fn load(
        &self,
        marketplace: &Marketplace,
        model: &ModelName,
        timestamp: Option<NaiveDateTime>,
    ) -> Option<ForecastRun> {
        let id = match timestamp {
            Some(ts) => RunId::new(marketplace.clone(), model.clone(), ts),
            None => self.latest(marketplace, model)?,
        };

        match self.read_records(&id) {
            Ok(records) => Some(ForecastRun {
                metadata: self.metadata(&id),
                id,
                records,
            }),
            Err(err) => {
                warn!(run = %id, error = %err, "forecast snapshot unavailable");
                None
            }
        }
    }

    fn latest(&self, marketplace: &Marketplace, model: &ModelName) -> Option<RunId> {
        let filter = RunFilter::all()
            .with_marketplace(marketplace.clone())
            .with_model(model.clone());
        match self.list_runs(&filter) {
            Ok(runs) => runs
                .into_iter()
                .map(|id| (self.written_at(&id), id))
                .max_by(|(wa, a), (wb, b)| wa.cmp(wb).then_with(|| a.timestamp.cmp(&b.timestamp)))
                .map(|(_, id)| id),
            Err(err) => {
                warn!(error = %err, "ledger directory unreadable");
                None
            }
        }
    }

    fn written_at(&self, id: &RunId) -> Option<SystemTime> {
        fs::metadata(self.dir.join(id.csv_file_name()))
            .and_then(|meta| meta.modified())
            .ok()
    }

    fn read_records(&self, id: &RunId) -> Result<Vec<ForecastRecord>, LedgerError> {
        let mut reader = csv::Reader::from_path(self.dir.join(id.csv_file_name()))?;
        reader
            .deserialize()
            .map(|row| row.map_err(LedgerError::from))
            .collect()
    }

    /// Sidecar document of `id`; an empty object when absent or unreadable.
    pub fn metadata(&self, id: &RunId) -> JsonValue {
        let path = self.dir.join(id.meta_file_name());
        let parsed = fs::read_to_string(&path)
            .map_err(LedgerError::from)
            .and_then(|text| serde_json::from_str(&text).map_err(LedgerError::from));
        let empty = || JsonValue::Object(serde_json::Map::new());
        match parsed {
            Ok(value) => value,
            Err(LedgerError::Io(e)) if e.kind() == ErrorKind::NotFound => empty(),
            Err(err) => {
                warn!(run = %id, error = %err, "snapshot metadata unreadable");
                empty()
            }
        }
    }

    /// Snapshot identities matching `filter`, ordered by timestamp then name.
    ///
    /// Fails only when the directory itself cannot be read.
    pub fn list_runs(&self, filter: &RunFilter) -> Result<Vec<RunId>, LedgerError> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            match RunId::from_csv_file_name(name) {
                Some(Ok(id)) if filter.matches_run(&id) => runs.push(id),
                Some(Ok(_)) | None => {}
                Some(Err(err)) => debug!(file = name, error = %err, "skipping foreign file"),
            }
        }
        runs.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.marketplace.cmp(&b.marketplace))
                .then_with(|| a.model.cmp(&b.model))
        });
        Ok(runs)
    }

    /// All rows of all matching snapshots, annotated with their run identity.
    pub fn history(&self, filter: &RunFilter) -> Result<Vec<HistoryRecord>, LedgerError> {
        let mut out = Vec::new();
        for id in self.list_runs(filter)? {
            match self.read_records(&id) {
                Ok(records) => out.extend(
                    records
                        .into_iter()
                        .filter(|r| filter.matches_record(r))
                        .map(|record| HistoryRecord {
                            run: id.clone(),
                            record,
                        }),
                ),
                Err(err) => warn!(run = %id, error = %err, "skipping unreadable snapshot"),
            }
        }
        Ok(out)
    }
}
