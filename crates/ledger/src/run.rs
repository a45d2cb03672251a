//! Snapshot identity and contents.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockplan_core::{ForecastRecord, Marketplace, ModelName};

use crate::error::LedgerError;

/// Timestamp layout used inside snapshot file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const CSV_SUFFIX: &str = ".csv";
const META_SUFFIX: &str = ".meta.json";

/// Identity of one saved forecast run.
///
/// ## Encoding
///
/// A run is stored under the file stem `{marketplace}.{model}.{timestamp}`.
/// Marketplace and model names cannot contain `.`, so the stem splits back
/// into exactly three parts. Timestamps have second precision.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId {
    pub marketplace: Marketplace,
    #[serde(rename = "model_name")]
    pub model: ModelName,
    pub timestamp: NaiveDateTime,
}

impl RunId {
    /// Sub-second precision is dropped so the identity survives a round trip
    /// through the file name.
    pub fn new(marketplace: Marketplace, model: ModelName, timestamp: NaiveDateTime) -> Self {
        Self {
            marketplace,
            model,
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
        }
    }

    pub fn file_stem(&self) -> String {
        format!(
            "{}.{}.{}",
            self.marketplace,
            self.model,
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }

    pub fn csv_file_name(&self) -> String {
        format!("{}{CSV_SUFFIX}", self.file_stem())
    }

    pub fn meta_file_name(&self) -> String {
        format!("{}{META_SUFFIX}", self.file_stem())
    }

    pub fn parse_stem(stem: &str) -> Result<Self, LedgerError> {
        let mut parts = stem.split('.');
        let (Some(marketplace), Some(model), Some(timestamp), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(LedgerError::invalid_identity(format!(
                "{stem:?} is not marketplace.model.timestamp"
            )));
        };

        let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| LedgerError::invalid_identity(format!("{stem:?}: {e}")))?;
        Ok(Self {
            marketplace: Marketplace::new(marketplace)?,
            model: ModelName::new(model)?,
            timestamp,
        })
    }

    /// Parse a snapshot table file name; `None` for any other file.
    pub fn from_csv_file_name(name: &str) -> Option<Result<Self, LedgerError>> {
        name.strip_suffix(CSV_SUFFIX).map(Self::parse_stem)
    }
}

impl core::fmt::Display for RunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.file_stem())
    }
}

/// A loaded snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRun {
    pub id: RunId,
    pub records: Vec<ForecastRecord>,
    /// Sidecar document; an empty object when the run has none.
    pub metadata: JsonValue,
}
