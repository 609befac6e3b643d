// pricefeed-core/src/domain/transform.rs

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::domain::error::DomainError;
use crate::domain::product::{CategoryGroup, CleanedRecord, RawRecord};
use crate::domain::rate::ExchangeRate;

/// Price (GBP) above which a product is flagged premium. Strictly greater.
pub const DEFAULT_PREMIUM_THRESHOLD_GBP: f64 = 50.0;

/// Rounds half away from zero to 2 decimals.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pure derivation: one raw snapshot + one rate -> one cleaned snapshot.
///
/// No record is filtered out. An invalid record fails the whole snapshot instead,
/// so a cleaned snapshot always has exactly as many rows as its raw parent.
pub fn transform(
    raw: &[RawRecord],
    rate: &ExchangeRate,
    premium_threshold_gbp: f64,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<CleanedRecord>, DomainError> {
    ExchangeRate::validate(rate.value)?;

    let mut seen = HashSet::with_capacity(raw.len());
    raw.iter()
        .map(|record| {
            if !seen.insert(record.product_id) {
                return Err(DomainError::DuplicateProductId(record.product_id));
            }
            derive(record, rate.value, premium_threshold_gbp, fetched_at)
        })
        .collect()
}

fn derive(
    record: &RawRecord,
    rate: f64,
    premium_threshold_gbp: f64,
    fetched_at: DateTime<Utc>,
) -> Result<CleanedRecord, DomainError> {
    if !record.price_usd.is_finite() || record.price_usd < 0.0 {
        return Err(DomainError::InvalidPrice {
            product_id: record.product_id,
            price: record.price_usd,
        });
    }

    // -0.0 would serialize as "-0.0"
    let price_gbp = round_cents(record.price_usd * rate) + 0.0;
    // Finite USD can still overflow once converted and scaled to cents
    if !price_gbp.is_finite() {
        return Err(DomainError::InvalidPrice {
            product_id: record.product_id,
            price: record.price_usd,
        });
    }

    Ok(CleanedRecord {
        product_id: record.product_id,
        title: record.title.clone(),
        description: record.description.clone(),
        category: record.category.clone(),
        category_group: CategoryGroup::classify(record.category.as_deref()),
        price_usd: record.price_usd,
        price_gbp,
        is_premium: price_gbp > premium_threshold_gbp,
        image: record.image.clone(),
        fetched_at,
    })
}

/// Checks the identity invariant of a cleaned snapshot (loaded from disk, so it may
/// have been produced by another tool).
pub fn ensure_unique_ids(records: &[CleanedRecord]) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.product_id) {
            return Err(DomainError::DuplicateProductId(record.product_id));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(id: i64, price: f64, category: Option<&str>) -> RawRecord {
        RawRecord {
            product_id: id,
            title: format!("Product {}", id),
            price_usd: price,
            description: String::new(),
            category: category.map(str::to_string),
            image: None,
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_price_conversion_and_rounding() {
        let rate = ExchangeRate::provided(0.79).unwrap();
        let records = vec![
            raw(1, 109.95, Some("men's clothing")),
            raw(2, 22.3, Some("men's clothing")),
            raw(3, 0.0, None),
        ];

        let cleaned = transform(&records, &rate, DEFAULT_PREMIUM_THRESHOLD_GBP, at()).unwrap();

        assert_eq!(cleaned.len(), 3);
        for (c, r) in cleaned.iter().zip(&records) {
            assert_eq!(c.price_gbp, round_cents(r.price_usd * 0.79));
            assert!(c.price_gbp >= 0.0);
            assert_eq!(c.price_gbp, (c.price_gbp * 100.0).round() / 100.0);
        }
        assert_eq!(cleaned[0].price_gbp, 86.86);
        assert_eq!(cleaned[1].price_gbp, 17.62);
        assert!(cleaned[0].is_premium);
        assert!(!cleaned[1].is_premium);
        assert_eq!(cleaned[2].category_group, CategoryGroup::Other);
    }

    #[test]
    fn test_premium_threshold_is_strict() {
        let rate = ExchangeRate::provided(1.0).unwrap();
        let cleaned = transform(
            &[raw(1, 50.0, None), raw(2, 50.01, None)],
            &rate,
            DEFAULT_PREMIUM_THRESHOLD_GBP,
            at(),
        )
        .unwrap();
        assert!(!cleaned[0].is_premium);
        assert!(cleaned[1].is_premium);
    }

    #[test]
    fn test_fallback_rate_drives_premium_flag() {
        let rate = ExchangeRate::fallback(0.85).unwrap();
        // 60 * 0.85 = 51.00 -> premium; 58 * 0.85 = 49.30 -> not
        let cleaned = transform(
            &[raw(1, 60.0, None), raw(2, 58.0, None)],
            &rate,
            DEFAULT_PREMIUM_THRESHOLD_GBP,
            at(),
        )
        .unwrap();
        assert_eq!(cleaned[0].price_gbp, 51.0);
        assert!(cleaned[0].is_premium);
        assert_eq!(cleaned[1].price_gbp, 49.3);
        assert!(!cleaned[1].is_premium);
    }

    #[test]
    fn test_deterministic_except_timestamp() {
        let rate = ExchangeRate::provided(0.8).unwrap();
        let records = vec![raw(1, 10.0, Some("jewelery")), raw(2, 999.99, Some("electronics"))];
        let a = transform(&records, &rate, 50.0, at()).unwrap();
        let b = transform(&records, &rate, 50.0, at()).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_duplicate_id_fails_snapshot() {
        let rate = ExchangeRate::provided(0.8).unwrap();
        let result = transform(&[raw(1, 1.0, None), raw(1, 2.0, None)], &rate, 50.0, at());
        assert!(matches!(result, Err(DomainError::DuplicateProductId(1))));
    }

    #[test]
    fn test_negative_or_nan_price_is_rejected() {
        let rate = ExchangeRate::provided(0.8).unwrap();
        assert!(matches!(
            transform(&[raw(4, -3.0, None)], &rate, 50.0, at()),
            Err(DomainError::InvalidPrice { product_id: 4, .. })
        ));
        assert!(transform(&[raw(5, f64::NAN, None)], &rate, 50.0, at()).is_err());
    }

    #[test]
    fn test_price_overflowing_on_conversion_is_rejected() {
        let rate = ExchangeRate::fallback(0.85).unwrap();
        let result = transform(
            &[raw(1, 10.0, None), raw(7, 1e307, None)],
            &rate,
            DEFAULT_PREMIUM_THRESHOLD_GBP,
            at(),
        );

        match result {
            Err(DomainError::InvalidPrice { product_id, price }) => {
                assert_eq!(product_id, 7);
                assert_eq!(price, 1e307);
            }
            other => panic!("Expected InvalidPrice, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_snapshot_is_valid() {
        let rate = ExchangeRate::provided(0.8).unwrap();
        assert!(transform(&[], &rate, 50.0, at()).unwrap().is_empty());
    }

    #[test]
    fn test_ensure_unique_ids() {
        let rate = ExchangeRate::provided(0.8).unwrap();
        let mut cleaned = transform(&[raw(1, 1.0, None)], &rate, 50.0, at()).unwrap();
        assert!(ensure_unique_ids(&cleaned).is_ok());
        cleaned.push(cleaned[0].clone());
        assert!(ensure_unique_ids(&cleaned).is_err());
    }
}
