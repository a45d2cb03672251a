use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Days, NaiveDate};
use stockplan_core::{ForecastRecord, ModelName, ProductKey, StockRecord, WarehouseId};
use stockplan_shipments::ShipmentCalculator;

/// Daily forecast for `products` over `days`, stocked across `warehouses`.
fn fixture(
    products: usize,
    warehouses: usize,
    days: u64,
) -> (Vec<ForecastRecord>, Vec<StockRecord>) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut forecast = Vec::new();
    let mut stocks = Vec::new();

    for p in 0..products {
        let product = ProductKey::new(format!("SKU{p:05}")).unwrap();
        for d in 0..days {
            forecast.push(ForecastRecord {
                date: start.checked_add_days(Days::new(d)).unwrap(),
                product: product.clone(),
                quantity: ((p + d as usize) % 17) as f64,
                model: ModelName::best(),
            });
        }
        for w in 0..warehouses {
            stocks.push(StockRecord::new(
                start,
                WarehouseId::new(format!("WH{w:02}")).unwrap(),
                product.clone(),
                ((p * 7 + w * 13) % 90) as f64,
            ));
        }
    }
    (forecast, stocks)
}

fn bench_calculate(c: &mut Criterion) {
    let calculator = ShipmentCalculator::default();
    let mut group = c.benchmark_group("shipment_calculate");

    for &products in &[10usize, 100, 1000] {
        let (forecast, stocks) = fixture(products, 8, 540);
        group.throughput(Throughput::Elements(forecast.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(products),
            &(forecast, stocks),
            |b, (forecast, stocks)| {
                b.iter(|| calculator.calculate(black_box(forecast), black_box(stocks)))
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_calculate);
criterion_main!(benches);
