// pricefeed-core/src/application/load.rs

use tracing::{info, instrument};

use crate::domain::config::PipelineConfig;
use crate::domain::product::CleanedRecord;
use crate::domain::reconcile::{ReconcileSummary, RetentionPolicy};
use crate::domain::snapshot::Stage;
use crate::domain::transform::ensure_unique_ids;
use crate::error::PricefeedError;
use crate::infrastructure::snapshot_store::SnapshotStore;
use crate::ports::connector::Connector;

/// Reconciles the latest Clean Store snapshot into the Product Table.
pub struct Loader<'a> {
    clean_store: SnapshotStore,
    connector: &'a dyn Connector,
    retention: RetentionPolicy,
}

impl<'a> Loader<'a> {
    pub fn new(config: &PipelineConfig, connector: &'a dyn Connector) -> Self {
        Self {
            clean_store: SnapshotStore::new(&config.clean_store_path, Stage::Clean),
            connector,
            retention: config.retention,
        }
    }

    #[instrument(skip(self), fields(engine = self.connector.engine_name(), retention = ?self.retention))]
    pub async fn run(&self) -> Result<ReconcileSummary, PricefeedError> {
        // NotFound leaves the table untouched
        let (entry, records): (_, Vec<CleanedRecord>) = self.clean_store.read_latest()?;
        ensure_unique_ids(&records)
            .map_err(|e| PricefeedError::invalid_snapshot(Stage::Clean, &entry.id, e))?;

        self.connector.ensure_schema().await?;
        let summary = self
            .connector
            .reconcile(&entry.id, &records, self.retention)
            .await?;

        info!(
            snapshot = %summary.snapshot_id,
            inserted = summary.inserted,
            updated = summary.updated,
            retired = summary.retired,
            "Product table reconciled"
        );
        Ok(summary)
    }
}
