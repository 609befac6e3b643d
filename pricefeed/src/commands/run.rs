// pricefeed/src/commands/run.rs
//
// USE CASE: Run the whole pipeline.

use anyhow::Context;
use std::path::PathBuf;

use pricefeed_core::application::run_pipeline;

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    println!("⚙️  Loading configuration...");
    let config = super::load_config(&project_dir)?;
    println!("   Raw store:   {}", config.raw_store_path.display());
    println!("   Clean store: {}", config.clean_store_path.display());
    println!("   Table:       {} 🦆", config.database_path);

    let source = super::product_source(&config)?;
    let rates = super::rate_provider(&config)?;
    let connector = super::open_table(&config)?;

    run_pipeline(&config, source, rates, &connector)
        .await
        .context("pipeline failed")?;
    Ok(())
}
