// pricefeed-core/src/domain/snapshot.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::rate::ExchangeRate;

/// Pipeline stage, used for snapshot naming and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Raw,
    Clean,
}

impl Stage {
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Self::Raw => "products_raw",
            Self::Clean => "products_clean",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Clean => write!(f, "clean"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// File name relative to the store root.
    pub file: String,
    pub record_count: usize,
    /// Id of the snapshot this one was derived from (clean -> raw).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<ExchangeRate>,
}

/// Ordered list of the snapshots a store holds, in write order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub stage: Option<Stage>,
    #[serde(default)]
    pub snapshots: Vec<SnapshotEntry>,
}

impl SnapshotManifest {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            snapshots: Vec::new(),
        }
    }

    /// Newest snapshot by `created_at`; ties go to the later write.
    pub fn latest(&self) -> Option<&SnapshotEntry> {
        // max_by_key returns the last of several equal maxima
        self.snapshots.iter().max_by_key(|entry| entry.created_at)
    }

    pub fn get(&self, id: &str) -> Option<&SnapshotEntry> {
        self.snapshots.iter().find(|entry| entry.id == id)
    }

    /// Timestamp for a new snapshot: `now`, bumped past the newest entry when the
    /// clock has not advanced, so keys are strictly increasing within a store.
    pub fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.latest() {
            Some(last) if now <= last.created_at => last.created_at + Duration::microseconds(1),
            _ => now,
        }
    }

    pub fn snapshot_id(stage: Stage, created_at: DateTime<Utc>) -> String {
        format!(
            "{}_{}",
            stage.file_prefix(),
            created_at.format("%Y%m%dT%H%M%S%.6fZ")
        )
    }

    pub fn push(&mut self, entry: SnapshotEntry) {
        self.snapshots.push(entry);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
