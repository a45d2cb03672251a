use anyhow::Context;
use clap::Parser;

use stockplan_pipeline::{Cli, DataSet, MarketplaceSelection, Pipeline};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    stockplan_observability::init(cli.log_format);

    let config = cli.into_config().context("invalid configuration")?;

    // Stock of every marketplace feeds the withdraw rule, even for a
    // single-marketplace run.
    let data = DataSet::load(&config.data_path, &MarketplaceSelection::Both.marketplaces())
        .with_context(|| format!("failed to load data from {}", config.data_path.display()))?;

    let pipeline = Pipeline::new(config).context("failed to prepare pipeline")?;
    for outcome in pipeline.run(&data)? {
        tracing::info!(
            marketplace = %outcome.marketplace,
            products = outcome.product_count(),
            total_forecast = format!("{:.0}", outcome.total_forecast()),
            total_shipment = format!("{:.0}", outcome.total_shipment()),
            warehouses = outcome.warehouse_count(),
            snapshots = outcome.saved.len(),
            "run summary"
        );
    }
    Ok(())
}
