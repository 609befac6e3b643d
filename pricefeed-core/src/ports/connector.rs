// pricefeed-core/src/ports/connector.rs

// What the pipeline needs from the Product Table, without knowing the engine.
// Loader is the only writer; the Query Surface only reads.

use crate::domain::product::{CleanedRecord, ProductRow};
use crate::domain::reconcile::{ReconcileSummary, RetentionPolicy};
use crate::error::PricefeedError;
use async_trait::async_trait;

#[async_trait]
pub trait Connector: Send + Sync {
    /// Creates the table and its price / category indexes if missing.
    async fn ensure_schema(&self) -> Result<(), PricefeedError>;

    /// Upserts `records` keyed by `product_id` in one all-or-nothing commit.
    /// Concurrent calls are serialized.
    async fn reconcile(
        &self,
        snapshot_id: &str,
        records: &[CleanedRecord],
        retention: RetentionPolicy,
    ) -> Result<ReconcileSummary, PricefeedError>;

    /// Up to `limit` rows by price_gbp descending.
    async fn top_by_price(&self, limit: usize) -> Result<Vec<ProductRow>, PricefeedError>;

    /// Rows with `min <= price_gbp <= max`, price_gbp descending.
    async fn search_price_range(&self, min: f64, max: f64)
    -> Result<Vec<ProductRow>, PricefeedError>;

    async fn count(&self) -> Result<u64, PricefeedError>;

    fn engine_name(&self) -> &str;
}
