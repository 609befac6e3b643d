// pricefeed/src/commands/transform.rs
//
// USE CASE: Derive a clean snapshot from the latest raw snapshot.

use anyhow::Context;
use std::path::PathBuf;

use pricefeed_core::application::Transformer;

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir)?;
    let rates = super::rate_provider(&config)?;

    println!("🧮 Transforming latest raw snapshot...");
    let report = Transformer::new(&config, rates)
        .run()
        .await
        .context("transform stage failed")?;

    if report.exchange_rate.is_fallback() {
        println!(
            "   ⚠️  Exchange rate unavailable, used fallback {}",
            report.exchange_rate.value
        );
    } else {
        println!("   💱 USD -> GBP: {}", report.exchange_rate.value);
    }
    println!(
        "✅ Clean snapshot {} written from {} ({} records)",
        report.snapshot_id, report.source_snapshot_id, report.records
    );
    Ok(())
}
