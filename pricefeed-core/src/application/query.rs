// pricefeed-core/src/application/query.rs

use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::domain::error::DomainError;
use crate::domain::product::ProductRow;
use crate::error::PricefeedError;
use crate::ports::connector::Connector;

pub const TOP_PRODUCTS_LIMIT: usize = 5;
pub const DEFAULT_MIN_PRICE: f64 = 0.0;
pub const DEFAULT_MAX_PRICE: f64 = 1e9;

/// Both bounds non-negative and ordered. NaN fails every comparison, so it is rejected too.
pub fn validate_price_range(min: f64, max: f64) -> Result<(), DomainError> {
    if min >= 0.0 && max >= 0.0 && min <= max {
        Ok(())
    } else {
        Err(DomainError::InvalidPriceRange { min, max })
    }
}

/// Most expensive products by GBP price.
#[instrument(skip(connector))]
pub async fn top_products(
    connector: &dyn Connector,
    limit: usize,
) -> Result<Vec<ProductRow>, PricefeedError> {
    timed("top_by_price", connector.top_by_price(limit)).await
}

/// Products whose GBP price lies in `[min, max]`.
#[instrument(skip(connector))]
pub async fn search_products(
    connector: &dyn Connector,
    min: f64,
    max: f64,
) -> Result<Vec<ProductRow>, PricefeedError> {
    validate_price_range(min, max)?;
    timed("search_price_range", connector.search_price_range(min, max)).await
}

async fn timed<F>(operation: &str, query: F) -> Result<Vec<ProductRow>, PricefeedError>
where
    F: std::future::Future<Output = Result<Vec<ProductRow>, PricefeedError>>,
{
    let start = Instant::now();
    let result = query.await;
    let duration = start.elapsed();

    match &result {
        Ok(rows) => debug!("✅ {} returned {} rows in {:.2?}", operation, rows.len(), duration),
        Err(e) => error!("❌ {} failed after {:.2?}: {}", operation, duration, e),
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::product::{CategoryGroup, CleanedRecord};
    use crate::domain::reconcile::RetentionPolicy;
    use crate::infrastructure::adapters::DuckDBConnector;
    use anyhow::Result;
    use chrono::Utc;

    #[test]
    fn test_range_validation() {
        assert!(validate_price_range(0.0, 1e9).is_ok());
        assert!(validate_price_range(10.0, 10.0).is_ok());
        assert!(validate_price_range(-1.0, 10.0).is_err());
        assert!(validate_price_range(20.0, 10.0).is_err());
        assert!(validate_price_range(f64::NAN, 10.0).is_err());
    }

    #[tokio::test]
    async fn test_queries_over_loaded_table() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;
        connector.ensure_schema().await?;
        let prices = [
            (1, 5.0),
            (2, 80.0),
            (3, 45.0),
            (4, 80.0),
            (5, 12.5),
            (6, 99.99),
            (7, 0.5),
        ];
        let records: Vec<_> = prices
            .into_iter()
            .map(|(id, gbp)| CleanedRecord {
                product_id: id,
                title: format!("P{}", id),
                description: String::new(),
                category: None,
                category_group: CategoryGroup::Other,
                price_usd: gbp,
                price_gbp: gbp,
                is_premium: gbp > 50.0,
                image: None,
                fetched_at: Utc::now(),
            })
            .collect();
        connector
            .reconcile("s", &records, RetentionPolicy::KeepAll)
            .await?;

        let top = top_products(&connector, TOP_PRODUCTS_LIMIT).await?;
        let ids: Vec<_> = top.iter().map(|r| r.product_id).collect();
        assert_eq!(ids, vec![6, 2, 4, 3, 5]);

        let found = search_products(&connector, 12.5, 45.0).await?;
        let ids: Vec<_> = found.iter().map(|r| r.product_id).collect();
        assert_eq!(ids, vec![3, 5]);

        let err = search_products(&connector, 50.0, 10.0).await.unwrap_err();
        assert!(matches!(
            err,
            PricefeedError::Domain(DomainError::InvalidPriceRange { .. })
        ));
        Ok(())
    }
}
