use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShipmentError {
    #[error("coverage coefficient must be finite and positive, got {0}")]
    InvalidCoverage(f64),
}
