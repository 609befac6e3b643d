// pricefeed-core/src/ports/rates.rs

use crate::error::PricefeedError;
use async_trait::async_trait;

/// Source of the USD -> GBP rate. Implementations fail with
/// `PricefeedError::UpstreamUnavailable`; the fallback lives in the Transformer.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn usd_to_gbp(&self) -> Result<f64, PricefeedError>;

    fn name(&self) -> &str;
}
