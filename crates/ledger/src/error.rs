use thiserror::Error;

use stockplan_core::DomainError;

use crate::run::RunId;

/// Ledger operation error.
///
/// These are storage errors. A single unreadable snapshot is not an error for
/// listing operations: it is skipped and logged.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("ledger metadata error: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot with the same identity already exists; snapshots are never
    /// overwritten.
    #[error("snapshot already exists: {0}")]
    SnapshotExists(RunId),

    #[error("invalid snapshot identity: {0}")]
    InvalidIdentity(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl LedgerError {
    pub fn invalid_identity(msg: impl Into<String>) -> Self {
        Self::InvalidIdentity(msg.into())
    }
}
