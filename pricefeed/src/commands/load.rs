// pricefeed/src/commands/load.rs
//
// USE CASE: Reconcile the latest clean snapshot into the product table.

use anyhow::Context;
use std::path::PathBuf;

use pricefeed_core::application::Loader;

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir)?;
    let connector = super::open_table(&config)?;

    println!("🗄️  Loading into {}...", config.database_path);
    let summary = Loader::new(&config, &connector)
        .run()
        .await
        .context("load stage failed")?;

    println!(
        "✅ Snapshot {} reconciled: {} inserted, {} updated, {} retired",
        summary.snapshot_id, summary.inserted, summary.updated, summary.retired
    );
    Ok(())
}
