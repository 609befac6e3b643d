// pricefeed-core/src/infrastructure/snapshot_store.rs

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::domain::rate::ExchangeRate;
use crate::domain::snapshot::{SnapshotEntry, SnapshotManifest, Stage};
use crate::error::PricefeedError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{read_json, write_json_atomic};

const MANIFEST_FILE: &str = "manifest.json";
const LOCK_FILE: &str = "manifest.lock";

/// Exclusive advisory lock on `<root>/manifest.lock`, held across the manifest
/// read-modify-write. Every handle opens its own descriptor, so writers in other
/// processes and other handles in this one take turns alike. Released on drop.
struct ManifestLock {
    file: File,
}

impl ManifestLock {
    fn acquire(root: &Path) -> Result<Self, InfrastructureError> {
        std::fs::create_dir_all(root)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(root.join(LOCK_FILE))?;
        file.lock_exclusive()?;
        debug!(root = ?root, "Manifest lock acquired");
        Ok(Self { file })
    }
}

impl Drop for ManifestLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Provenance attached to a snapshot when it is written.
#[derive(Debug, Clone, Default)]
pub struct SnapshotMeta {
    pub lineage: Option<String>,
    pub exchange_rate: Option<ExchangeRate>,
}

/// Append-only, file-backed store of timestamped snapshots.
///
/// Layout: `<root>/manifest.json` plus one JSON array per snapshot. A snapshot
/// becomes visible only once the manifest lists it, and both files are published
/// by atomic rename, so a reader never sees a partial snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
    stage: Stage,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>, stage: Stage) -> Self {
        Self {
            root: root.into(),
            stage,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn manifest(&self) -> Result<SnapshotManifest, InfrastructureError> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(SnapshotManifest::new(self.stage));
        }
        read_json(&path)
    }

    /// All snapshots in write order.
    pub fn list(&self) -> Result<Vec<SnapshotEntry>, InfrastructureError> {
        Ok(self.manifest()?.snapshots)
    }

    /// Writes a new immutable snapshot and registers it in the manifest.
    #[instrument(skip(self, records, meta), fields(stage = %self.stage, records = records.len()))]
    pub fn write<T: Serialize>(
        &self,
        records: &[T],
        meta: SnapshotMeta,
    ) -> Result<SnapshotEntry, PricefeedError> {
        self.write_at(records, meta, Utc::now())
    }

    pub(crate) fn write_at<T: Serialize>(
        &self,
        records: &[T],
        meta: SnapshotMeta,
        now: DateTime<Utc>,
    ) -> Result<SnapshotEntry, PricefeedError> {
        let _lock = ManifestLock::acquire(&self.root)?;

        let mut manifest = self.manifest()?;
        let created_at = manifest.next_timestamp(now);
        let id = SnapshotManifest::snapshot_id(self.stage, created_at);
        let file = format!("{}.json", id);

        // 1. Data first: an unlisted file is harmless
        write_json_atomic(&self.root.join(&file), records)?;

        // 2. Then publish it
        let entry = SnapshotEntry {
            id,
            created_at,
            file,
            record_count: records.len(),
            lineage: meta.lineage,
            exchange_rate: meta.exchange_rate,
        };
        manifest.push(entry.clone());
        write_json_atomic(&self.manifest_path(), &manifest)?;

        info!(snapshot = %entry.id, "📦 Snapshot written");
        Ok(entry)
    }

    /// Newest snapshot entry, or `NotFound` when the store is empty.
    pub fn latest(&self) -> Result<SnapshotEntry, PricefeedError> {
        let manifest = self.manifest()?;
        manifest.latest().cloned().ok_or_else(|| PricefeedError::NotFound {
            stage: self.stage,
            location: self.root.display().to_string(),
        })
    }

    pub fn read<T: DeserializeOwned>(
        &self,
        entry: &SnapshotEntry,
    ) -> Result<Vec<T>, PricefeedError> {
        let path = self.root.join(&entry.file);
        debug!(path = ?path, "Reading snapshot");
        let content =
            std::fs::read(&path).map_err(|source| InfrastructureError::SnapshotUnreadable {
                id: entry.id.clone(),
                source,
            })?;
        let records = serde_json::from_slice(&content).map_err(InfrastructureError::Json)?;
        Ok(records)
    }

    pub fn read_latest<T: DeserializeOwned>(
        &self,
    ) -> Result<(SnapshotEntry, Vec<T>), PricefeedError> {
        let entry = self.latest()?;
        let records = self.read(&entry)?;
        Ok((entry, records))
    }
}
