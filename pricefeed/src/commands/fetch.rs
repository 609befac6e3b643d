// pricefeed/src/commands/fetch.rs
//
// USE CASE: Pull the product feed into the Raw Store.

use anyhow::Context;
use std::path::PathBuf;

use pricefeed_core::application::Fetcher;

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir)?;
    let source = super::product_source(&config)?;

    println!("🌐 Fetching {}...", config.source_url);
    let entry = Fetcher::new(&config, source)
        .run()
        .await
        .context("fetch stage failed")?;

    println!(
        "✅ Raw snapshot {} written ({} records)",
        entry.id, entry.record_count
    );
    Ok(())
}
