pub mod config;
pub mod error;
pub mod mapping;
pub mod product;
pub mod rate;
pub mod reconcile;
pub mod snapshot;
pub mod transform;

// Re-exports
pub use config::PipelineConfig;
pub use error::DomainError;
pub use mapping::ColumnMapping;
pub use product::{CategoryGroup, CleanedRecord, ProductRow, RawRecord};
pub use rate::{ExchangeRate, RateSource};
pub use reconcile::{ReconcileSummary, RetentionPolicy};
pub use snapshot::{SnapshotEntry, SnapshotManifest, Stage};
