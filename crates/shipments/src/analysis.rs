//! Historical coverage analysis.
//!
//! Looks at how much stock was held relative to sales in the past, which helps
//! pick a coverage coefficient for [`crate::ShipmentCalculator`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use stockplan_core::{ProductKey, StockRecord, TimeSeriesPoint};

/// Summary statistics over a set of ratios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl RatioStats {
    /// `None` when `values` holds no finite ratio.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        Some(Self {
            mean: sorted.iter().sum::<f64>() / n as f64,
            median,
            min: sorted[0],
            max: sorted[n - 1],
            count: n,
        })
    }
}

/// Result of [`analyze_coverage`]. Every section is optional: it is absent
/// when the inputs hold no comparable points.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageAnalysis {
    /// Stock on hand divided by sales, per `(date, product)`.
    pub coverage_ratio: Option<RatioStats>,
    /// Shipped quantity divided by sales.
    pub shipment_ratio: Option<RatioStats>,
    /// `(stock + shipment) / sales` on dates where a shipment happened.
    pub coverage_from_shipments: Option<RatioStats>,
}

type Daily = BTreeMap<(NaiveDate, ProductKey), f64>;

fn sum_points(points: &[TimeSeriesPoint]) -> Daily {
    let mut out = Daily::new();
    for p in points {
        *out.entry((p.date, p.product.clone())).or_insert(0.0) += p.quantity;
    }
    out
}

fn sum_stocks(stocks: &[StockRecord]) -> Daily {
    let mut out = Daily::new();
    for s in stocks {
        *out.entry((s.date, s.product.clone())).or_insert(0.0) += s.stock;
    }
    out
}

/// Analyse historical stock coverage.
///
/// Only `(date, product)` pairs with positive sales contribute a ratio.
/// Returns an empty analysis when either `sales` or `stocks` is empty.
pub fn analyze_coverage(
    sales: &[TimeSeriesPoint],
    stocks: &[StockRecord],
    shipments: Option<&[TimeSeriesPoint]>,
) -> CoverageAnalysis {
    if sales.is_empty() || stocks.is_empty() {
        return CoverageAnalysis::default();
    }

    let sales = sum_points(sales);
    let stocks = sum_stocks(stocks);

    let coverage: Vec<f64> = sales
        .iter()
        .filter(|&(_, &sold)| sold > 0.0)
        .filter_map(|(key, sold)| stocks.get(key).map(|stock| stock / sold))
        .collect();

    let mut analysis = CoverageAnalysis {
        coverage_ratio: RatioStats::from_values(&coverage),
        ..CoverageAnalysis::default()
    };

    let Some(shipments) = shipments.filter(|s| !s.is_empty()) else {
        return analysis;
    };

    let mut shipment_ratios = Vec::new();
    let mut post_shipment = Vec::new();
    for (key, shipped) in sum_points(shipments) {
        let Some(&sold) = sales.get(&key) else {
            continue;
        };
        if sold <= 0.0 {
            continue;
        }
        shipment_ratios.push(shipped / sold);
        if shipped > 0.0 {
            if let Some(stock) = stocks.get(&key) {
                post_shipment.push((stock + shipped) / sold);
            }
        }
    }

    analysis.shipment_ratio = RatioStats::from_values(&shipment_ratios);
    analysis.coverage_from_shipments = RatioStats::from_values(&post_shipment);
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockplan_core::WarehouseId;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sale(d: u32, product: &str, quantity: f64) -> TimeSeriesPoint {
        TimeSeriesPoint::new(date(d), ProductKey::new(product).unwrap(), quantity)
    }

    fn stock(d: u32, warehouse: &str, product: &str, stock: f64) -> StockRecord {
        StockRecord::new(
            date(d),
            WarehouseId::new(warehouse).unwrap(),
            ProductKey::new(product).unwrap(),
            stock,
        )
    }

    #[test]
    fn ratio_stats_median_handles_even_counts() {
        let stats = RatioStats::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.count, 4);

        assert!(RatioStats::from_values(&[f64::NAN]).is_none());
    }

    #[test]
    fn coverage_uses_dates_present_in_both_tables() {
        let analysis = analyze_coverage(
            &[sale(1, "P", 10.0), sale(2, "P", 5.0), sale(3, "P", 0.0)],
            &[
                stock(1, "W1", "P", 20.0),
                stock(1, "W2", "P", 10.0),
                stock(3, "W1", "P", 50.0),
            ],
            None,
        );

        // Day 1 only: day 2 has no stock row and day 3 has no sales.
        let coverage = analysis.coverage_ratio.unwrap();
        assert_eq!(coverage.count, 1);
        assert_eq!(coverage.mean, 3.0);
        assert!(analysis.shipment_ratio.is_none());
    }

    #[test]
    fn shipments_contribute_ratios_and_post_shipment_coverage() {
        let analysis = analyze_coverage(
            &[sale(1, "P", 10.0), sale(2, "P", 10.0)],
            &[stock(1, "W", "P", 5.0)],
            Some(&[sale(1, "P", 15.0), sale(2, "P", 5.0)]),
        );

        let ratios = analysis.shipment_ratio.unwrap();
        assert_eq!(ratios.count, 2);
        assert_eq!(ratios.min, 0.5);
        assert_eq!(ratios.max, 1.5);

        let post = analysis.coverage_from_shipments.unwrap();
        assert_eq!(post.count, 1);
        assert_eq!(post.mean, 2.0);
    }

    #[test]
    fn empty_inputs_give_empty_analysis() {
        assert_eq!(
            analyze_coverage(&[], &[stock(1, "W", "P", 1.0)], None),
            CoverageAnalysis::default()
        );
    }
}
