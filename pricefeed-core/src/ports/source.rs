// pricefeed-core/src/ports/source.rs

use crate::error::PricefeedError;
use async_trait::async_trait;
use serde_json::Value;

/// The upstream product feed. Records come back verbatim, one JSON object each.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Value>, PricefeedError>;

    fn name(&self) -> &str;
}
