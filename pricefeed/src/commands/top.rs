// pricefeed/src/commands/top.rs

use std::path::PathBuf;

use pricefeed_core::application::top_products;

use crate::output::products_table;

pub async fn execute(project_dir: PathBuf, limit: usize) -> anyhow::Result<()> {
    let config = super::load_config(&project_dir)?;
    let connector = super::open_reader(&config).await?;

    let rows = top_products(&connector, limit).await?;
    println!("🏆 Top {} products by GBP price", limit);
    println!("{}", products_table(&rows));
    Ok(())
}
