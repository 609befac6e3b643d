// pricefeed-core/src/application/pipeline.rs

use serde::Serialize;
use std::time::Instant;

use crate::application::fetch::Fetcher;
use crate::application::load::Loader;
use crate::application::transform::{TransformReport, Transformer};
use crate::domain::config::PipelineConfig;
use crate::domain::reconcile::ReconcileSummary;
use crate::domain::snapshot::SnapshotEntry;
use crate::error::PricefeedError;
use crate::ports::connector::Connector;
use crate::ports::rates::RateProvider;
use crate::ports::source::ProductSource;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub raw: SnapshotEntry,
    pub transform: TransformReport,
    pub load: ReconcileSummary,
}

/// fetch -> transform -> load, stopping at the first failing stage.
pub async fn run_pipeline<S, R>(
    config: &PipelineConfig,
    source: S,
    rates: R,
    connector: &dyn Connector,
) -> Result<PipelineReport, PricefeedError>
where
    S: ProductSource,
    R: RateProvider,
{
    println!("🚀 Starting Pricing Pipeline...");
    let start_time = Instant::now();

    println!("🌐 Fetching product feed...");
    let raw = Fetcher::new(config, source).run().await?;
    println!("    ✅ Raw snapshot {} ({} records)", raw.id, raw.record_count);

    println!("🧮 Transforming...");
    let transform = Transformer::new(config, rates).run().await?;
    if transform.exchange_rate.is_fallback() {
        println!(
            "    ⚠️  Exchange rate unavailable, used fallback {}",
            transform.exchange_rate.value
        );
    }
    println!(
        "    ✅ Clean snapshot {} ({} records)",
        transform.snapshot_id, transform.records
    );

    println!("🗄️  Loading into product table...");
    let load = Loader::new(config, connector).run().await?;
    println!(
        "    ✅ {} inserted, {} updated, {} retired",
        load.inserted, load.updated, load.retired
    );

    println!("✨ Pipeline finished in {:.2?}", start_time.elapsed());
    Ok(PipelineReport {
        raw,
        transform,
        load,
    })
}
