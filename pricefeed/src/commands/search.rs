// pricefeed/src/commands/search.rs

use std::path::PathBuf;

use pricefeed_core::application::search_products;

use crate::output::products_table;

pub async fn execute(project_dir: PathBuf, min: f64, max: f64) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir)?;
    let connector = super::open_reader(&config).await?;

    let rows = search_products(&connector, min, max).await?;
    println!("🔎 {} products between £{:.2} and £{:.2}", rows.len(), min, max);
    println!("{}", products_table(&rows));
    Ok(())
}
