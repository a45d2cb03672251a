//! Model comparison across saved snapshots.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use stockplan_core::{Marketplace, ModelName, ProductKey, TimeSeriesPoint};

use crate::error::LedgerError;
use crate::ledger::ForecastLedger;
use crate::query::RunFilter;

/// A series in a comparison table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Series {
    Model(ModelName),
    /// Observed sales.
    Actual,
}

impl core::fmt::Display for Series {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Series::Model(name) => f.write_str(name.as_str()),
            Series::Actual => f.write_str("Actual"),
        }
    }
}

impl Serialize for Series {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub date: NaiveDate,
    pub series: Series,
    pub quantity: f64,
}

impl ForecastLedger {
    /// Mean forecast per `(model, date)` over every snapshot of `marketplace`
    /// for `product`, optionally followed by the observed `actual` series.
    ///
    /// Rows are ordered by series (models by name, `Actual` last) then date.
    pub fn compare(
        &self,
        marketplace: &Marketplace,
        product: &ProductKey,
        actual: Option<&[TimeSeriesPoint]>,
    ) -> Result<Vec<ComparisonRow>, LedgerError> {
        let filter = RunFilter::all()
            .with_marketplace(marketplace.clone())
            .with_product(product.clone());

        let mut sums: BTreeMap<(Series, NaiveDate), (f64, usize)> = BTreeMap::new();
        for h in self.history(&filter)? {
            let slot = sums
                .entry((Series::Model(h.run.model), h.record.date))
                .or_insert((0.0, 0));
            slot.0 += h.record.quantity;
            slot.1 += 1;
        }

        let mut rows: Vec<ComparisonRow> = sums
            .into_iter()
            .map(|((series, date), (sum, n))| ComparisonRow {
                date,
                series,
                quantity: sum / n as f64,
            })
            .collect();

        if let Some(actual) = actual {
            let mut observed: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            for p in actual.iter().filter(|p| p.product == *product) {
                *observed.entry(p.date).or_insert(0.0) += p.quantity;
            }
            rows.extend(observed.into_iter().map(|(date, quantity)| ComparisonRow {
                date,
                series: Series::Actual,
                quantity,
            }));
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockplan_core::ForecastRecord;
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn key(s: &str) -> ProductKey {
        ProductKey::new(s).unwrap()
    }

    fn record(product: &str, d: u32, quantity: f64, model: &ModelName) -> ForecastRecord {
        ForecastRecord {
            date: day(d),
            product: key(product),
            quantity,
            model: model.clone(),
        }
    }

    #[test]
    fn averages_runs_and_appends_actual() {
        let dir = tempdir().unwrap();
        let ledger = ForecastLedger::open(dir.path()).unwrap();
        let wb = Marketplace::wildberries();
        let trend = ModelName::new("linear_trend").unwrap();
        let t0 = day(1).and_hms_opt(8, 0, 0).unwrap();
        let t1 = day(2).and_hms_opt(8, 0, 0).unwrap();

        ledger
            .save(&[record("P", 10, 10.0, &trend), record("Q", 10, 99.0, &trend)], &trend, &wb, t0, None)
            .unwrap();
        ledger.save(&[record("P", 10, 20.0, &trend)], &trend, &wb, t1, None).unwrap();
        // Other marketplace is not part of the comparison.
        ledger
            .save(&[record("P", 10, 1000.0, &trend)], &trend, &Marketplace::ozon(), t0, None)
            .unwrap();

        let actual = [
            TimeSeriesPoint::new(day(10), key("P"), 12.0),
            TimeSeriesPoint::new(day(10), key("Q"), 50.0),
        ];
        let rows = ledger.compare(&wb, &key("P"), Some(&actual)).unwrap();

        assert_eq!(
            rows,
            vec![
                ComparisonRow {
                    date: day(10),
                    series: Series::Model(trend.clone()),
                    quantity: 15.0,
                },
                ComparisonRow {
                    date: day(10),
                    series: Series::Actual,
                    quantity: 12.0,
                },
            ]
        );
        assert_eq!(rows[1].series.to_string(), "Actual");
    }
}
