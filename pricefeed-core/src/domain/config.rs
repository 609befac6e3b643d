// pricefeed-core/src/domain/config.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::mapping::ColumnMapping;
use crate::domain::rate::DEFAULT_FALLBACK_RATE;
use crate::domain::reconcile::RetentionPolicy;
use crate::domain::transform::DEFAULT_PREMIUM_THRESHOLD_GBP;

pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Everything a stage needs to locate its inputs and outputs.
/// Built once (file + env) and handed to each component at construction.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineConfig {
    #[serde(default = "default_raw_store")]
    pub raw_store_path: PathBuf,

    #[serde(default = "default_clean_store")]
    pub clean_store_path: PathBuf,

    /// Product Table connection: a DuckDB file path, or `:memory:`.
    #[serde(default = "default_database")]
    pub database_path: String,

    #[serde(default = "default_source_url")]
    pub source_url: String,

    #[serde(default = "default_rate_url")]
    pub rate_url: String,

    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,

    #[serde(default = "default_premium_threshold")]
    pub premium_threshold_gbp: f64,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// How long a Product Table session waits while another process holds the
    /// database file.
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,

    #[serde(default)]
    pub retention: RetentionPolicy,

    #[serde(default)]
    pub column_mapping: ColumnMapping,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_store_path: default_raw_store(),
            clean_store_path: default_clean_store(),
            database_path: default_database(),
            source_url: default_source_url(),
            rate_url: default_rate_url(),
            fallback_rate: default_fallback_rate(),
            premium_threshold_gbp: default_premium_threshold(),
            http_timeout_secs: default_http_timeout_secs(),
            lock_wait_ms: default_lock_wait_ms(),
            retention: RetentionPolicy::default(),
            column_mapping: ColumnMapping::default(),
        }
    }
}

impl PipelineConfig {
    /// Anchors relative store and database paths at `project_dir`.
    pub fn resolve_paths(mut self, project_dir: &Path) -> Self {
        if self.raw_store_path.is_relative() {
            self.raw_store_path = project_dir.join(&self.raw_store_path);
        }
        if self.clean_store_path.is_relative() {
            self.clean_store_path = project_dir.join(&self.clean_store_path);
        }
        if self.database_path != IN_MEMORY_DATABASE && Path::new(&self.database_path).is_relative()
        {
            self.database_path = project_dir
                .join(&self.database_path)
                .to_string_lossy()
                .into_owned();
        }
        self
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }
}

fn default_raw_store() -> PathBuf {
    PathBuf::from("data/raw")
}
fn default_clean_store() -> PathBuf {
    PathBuf::from("data/clean")
}
fn default_database() -> String {
    "data/product_data.duckdb".to_string()
}
fn default_source_url() -> String {
    "https://fakestoreapi.com/products".to_string()
}
fn default_rate_url() -> String {
    "https://api.exchangerate.host/latest?base=USD&symbols=GBP".to_string()
}
fn default_fallback_rate() -> f64 {
    DEFAULT_FALLBACK_RATE
}
fn default_premium_threshold() -> f64 {
    DEFAULT_PREMIUM_THRESHOLD_GBP
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_lock_wait_ms() -> u64 {
    10_000
}
