// pricefeed-core/src/domain/reconcile.rs

use serde::{Deserialize, Serialize};

/// What happens to Product Table rows that are absent from the incoming snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Discontinued products stay in the table forever.
    #[default]
    KeepAll,
    /// Rows missing from the snapshot are deleted in the same transaction.
    PruneMissing,
}

/// Outcome of one committed reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub snapshot_id: String,
    pub inserted: u64,
    pub updated: u64,
    #[serde(default)]
    pub retired: u64,
}

impl ReconcileSummary {
    pub fn total(&self) -> u64 {
        self.inserted + self.updated
    }
}
