// pricefeed-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod error;
pub mod fs;
pub mod snapshot_store;

pub use snapshot_store::{SnapshotMeta, SnapshotStore};
