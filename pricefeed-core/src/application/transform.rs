// pricefeed-core/src/application/transform.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::domain::config::PipelineConfig;
use crate::domain::mapping::ColumnMapping;
use crate::domain::product::CleanedRecord;
use crate::domain::rate::ExchangeRate;
use crate::domain::snapshot::Stage;
use crate::domain::transform::transform;
use crate::error::PricefeedError;
use crate::infrastructure::snapshot_store::{SnapshotMeta, SnapshotStore};
use crate::ports::rates::RateProvider;

#[derive(Debug, Clone, Serialize)]
pub struct TransformReport {
    pub snapshot_id: String,
    pub source_snapshot_id: String,
    pub records: usize,
    pub exchange_rate: ExchangeRate,
}

/// Derives a Clean Store snapshot from the latest Raw Store snapshot.
pub struct Transformer<R: RateProvider> {
    raw_store: SnapshotStore,
    clean_store: SnapshotStore,
    rates: R,
    mapping: ColumnMapping,
    fallback_rate: f64,
    premium_threshold_gbp: f64,
}

impl<R: RateProvider> Transformer<R> {
    pub fn new(config: &PipelineConfig, rates: R) -> Self {
        Self {
            raw_store: SnapshotStore::new(&config.raw_store_path, Stage::Raw),
            clean_store: SnapshotStore::new(&config.clean_store_path, Stage::Clean),
            rates,
            mapping: config.column_mapping.clone(),
            fallback_rate: config.fallback_rate,
            premium_threshold_gbp: config.premium_threshold_gbp,
        }
    }

    pub async fn run(&self) -> Result<TransformReport, PricefeedError> {
        self.run_at(Utc::now()).await
    }

    #[instrument(skip(self), fields(rates = self.rates.name()))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<TransformReport, PricefeedError> {
        // 1. Input first: an empty Raw Store aborts before any network call
        let (source, raw): (_, Vec<Value>) = self.raw_store.read_latest()?;
        info!(snapshot = %source.id, records = raw.len(), "Transforming raw snapshot");

        // 2. Rate (never fatal)
        let rate = resolve_rate(&self.rates, self.fallback_rate).await?;

        // 3. Pure derivation
        let rejected = |e| PricefeedError::invalid_snapshot(Stage::Raw, &source.id, e);
        let normalized = self.mapping.apply(&raw).map_err(rejected)?;
        let cleaned: Vec<CleanedRecord> =
            transform(&normalized, &rate, self.premium_threshold_gbp, now).map_err(rejected)?;

        // 4. Publish with provenance
        let entry = self.clean_store.write(
            &cleaned,
            SnapshotMeta {
                lineage: Some(source.id.clone()),
                exchange_rate: Some(rate),
            },
        )?;

        Ok(TransformReport {
            snapshot_id: entry.id,
            source_snapshot_id: source.id,
            records: cleaned.len(),
            exchange_rate: rate,
        })
    }
}

/// Asks the provider for USD -> GBP; any failure degrades to the fallback rate.
pub async fn resolve_rate(
    rates: &dyn RateProvider,
    fallback: f64,
) -> Result<ExchangeRate, PricefeedError> {
    match rates.usd_to_gbp().await.and_then(|v| Ok(ExchangeRate::provided(v)?)) {
        Ok(rate) => {
            info!(rate = rate.value, provider = rates.name(), "Exchange rate resolved");
            Ok(rate)
        }
        Err(e) => {
            warn!(
                provider = rates.name(),
                fallback,
                reason = %e,
                "⚠️ Exchange rate unavailable, using fallback"
            );
            Ok(ExchangeRate::fallback(fallback)?)
        }
    }
}
