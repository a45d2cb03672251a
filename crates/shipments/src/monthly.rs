//! Monthly bucketing of daily forecasts.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use stockplan_core::{ForecastRecord, ProductKey, clamp_non_negative};

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Sum forecast quantities per `(month, product)`.
///
/// Iteration order of the result is month first, then product.
pub fn monthly_demand(forecast: &[ForecastRecord]) -> BTreeMap<(NaiveDate, ProductKey), f64> {
    let mut out: BTreeMap<(NaiveDate, ProductKey), f64> = BTreeMap::new();
    for r in forecast {
        *out.entry((month_start(r.date), r.product.clone()))
            .or_insert(0.0) += clamp_non_negative(r.quantity);
    }
    out
}
