//! Strongly-typed identifiers used across the planner.
//!
//! Product and warehouse keys are opaque: anything non-empty is accepted.
//! Model and marketplace names additionally form the identity of a ledger
//! snapshot, so they are restricted to `[A-Za-z0-9_-]` and can be embedded in a
//! file name and parsed back without ambiguity.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Canonical cross-marketplace product identifier ("unified code").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductKey(String);

/// Identifier of a physical warehouse inside a marketplace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WarehouseId(String);

/// Name of a forecasting method (or of a derived series such as `best`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelName(String);

/// Sales channel whose warehouses are replenished (e.g. `wb`, `ozon`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Marketplace(String);

fn validate_opaque(name: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_id(format!("{name} cannot be empty")));
    }
    Ok(())
}

fn validate_identity(name: &str, value: &str) -> Result<(), DomainError> {
    validate_opaque(name, value)?;
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(DomainError::invalid_id(format!(
            "{name} {value:?} contains reserved character {c:?}"
        )));
    }
    Ok(())
}

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal, $validate:path) => {
        impl $t {
            /// Validate and wrap an identifier.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                $validate($name, &value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_string_newtype!(ProductKey, "ProductKey", validate_opaque);
impl_string_newtype!(WarehouseId, "WarehouseId", validate_opaque);
impl_string_newtype!(ModelName, "ModelName", validate_identity);
impl_string_newtype!(Marketplace, "Marketplace", validate_identity);

impl Marketplace {
    pub fn wildberries() -> Self {
        Self("wb".to_string())
    }

    pub fn ozon() -> Self {
        Self("ozon".to_string())
    }
}

impl ModelName {
    /// Build a name from a literal known to be valid.
    ///
    /// # Panics
    /// If `name` is not a valid identity (a programming error, not input).
    pub fn from_static(name: &'static str) -> Self {
        match Self::new(name) {
            Ok(n) => n,
            Err(e) => panic!("invalid static model name: {e}"),
        }
    }

    /// Name under which the per-product winning forecast is stored.
    pub fn best() -> Self {
        Self("best".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_key_is_opaque() {
        let key = ProductKey::new("SKU_01.a/b").unwrap();
        assert_eq!(key.as_str(), "SKU_01.a/b");
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(ProductKey::new("  ").is_err());
        assert!(WarehouseId::new("").is_err());
        assert!(ModelName::new("").is_err());
    }

    #[test]
    fn model_name_rejects_separator_characters() {
        assert!(ModelName::new("baseline_mean").is_ok());
        assert!(ModelName::new("holt-winters").is_ok());

        let err = ModelName::new("Baseline (mean)").unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
        assert!(Marketplace::new("wb.ru").is_err());
    }

    #[test]
    #[should_panic(expected = "invalid static model name")]
    fn from_static_panics_on_invalid_literal() {
        let _ = ModelName::from_static("not valid");
    }

    #[test]
    fn serde_round_trip_validates() {
        let json = serde_json::to_string(&ModelName::new("linear_trend").unwrap()).unwrap();
        assert_eq!(json, "\"linear_trend\"");

        let bad: Result<ModelName, _> = serde_json::from_str("\"a.b\"");
        assert!(bad.is_err());
    }
}
