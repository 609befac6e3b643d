// pricefeed-core/src/application/fetch.rs

use serde_json::Value;
use tracing::{info, instrument};

use crate::domain::config::PipelineConfig;
use crate::domain::snapshot::{SnapshotEntry, Stage};
use crate::error::PricefeedError;
use crate::infrastructure::snapshot_store::{SnapshotMeta, SnapshotStore};
use crate::ports::source::ProductSource;

/// Pulls the product feed and records it verbatim as a Raw Store snapshot.
pub struct Fetcher<S: ProductSource> {
    raw_store: SnapshotStore,
    source: S,
}

impl<S: ProductSource> Fetcher<S> {
    pub fn new(config: &PipelineConfig, source: S) -> Self {
        Self {
            raw_store: SnapshotStore::new(&config.raw_store_path, Stage::Raw),
            source,
        }
    }

    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn run(&self) -> Result<SnapshotEntry, PricefeedError> {
        // Nothing is written unless the whole feed arrived intact
        let products: Vec<Value> = self.source.fetch_products().await?;
        info!(count = products.len(), "Fetched product feed");

        self.raw_store.write(&products, SnapshotMeta::default())
    }
}
