// pricefeed/src/commands/mod.rs

pub mod fetch;
pub mod load;
pub mod run;
pub mod search;
pub mod serve;
pub mod snapshots;
pub mod top;
pub mod transform;

use anyhow::Context;
use std::path::Path;

use pricefeed_core::domain::config::{IN_MEMORY_DATABASE, PipelineConfig};
use pricefeed_core::infrastructure::adapters::{
    DuckDBConnector, HttpProductSource, HttpRateProvider,
};
use pricefeed_core::infrastructure::config::load_pipeline_config;
use pricefeed_core::ports::connector::Connector;

pub(crate) fn load_config(project_dir: &Path) -> anyhow::Result<PipelineConfig> {
    load_pipeline_config(project_dir).with_context(|| {
        format!(
            "Failed to load pipeline configuration from {:?}",
            project_dir
        )
    })
}

pub(crate) fn open_table(config: &PipelineConfig) -> anyhow::Result<DuckDBConnector> {
    let connector = DuckDBConnector::new(&config.database_path)
        .with_context(|| format!("Failed to open product table at {}", config.database_path))?;
    Ok(connector.with_lock_wait(config.lock_wait()))
}

/// Connector for query-only commands. A short-lived writer creates the schema
/// (empty table before the first load); after that each query opens the file
/// read-only, leaving the write lock free for a concurrent `load`.
pub(crate) async fn open_reader(config: &PipelineConfig) -> anyhow::Result<DuckDBConnector> {
    let writer = open_table(config)?;
    writer
        .ensure_schema()
        .await
        .with_context(|| format!("Failed to prepare product table at {}", config.database_path))?;
    if config.database_path == IN_MEMORY_DATABASE {
        return Ok(writer);
    }
    drop(writer);

    let reader = DuckDBConnector::open_read_only(&config.database_path)
        .with_context(|| format!("Failed to open product table at {}", config.database_path))?;
    Ok(reader.with_lock_wait(config.lock_wait()))
}

pub(crate) fn product_source(config: &PipelineConfig) -> anyhow::Result<HttpProductSource> {
    HttpProductSource::new(&config.source_url, config.http_timeout())
        .context("Failed to build product feed client")
}

pub(crate) fn rate_provider(config: &PipelineConfig) -> anyhow::Result<HttpRateProvider> {
    HttpRateProvider::new(&config.rate_url, config.http_timeout())
        .context("Failed to build exchange rate client")
}
