// pricefeed-core/src/infrastructure/config/pipeline.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::config::PipelineConfig;
use crate::domain::rate::ExchangeRate;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["pricefeed.yaml", "pricefeed.yml"];

/// Loads `pricefeed.yaml` from `project_dir` (defaults if absent), applies
/// environment overrides, resolves relative paths, then validates.
#[instrument(skip(project_dir))]
pub fn load_pipeline_config(project_dir: &Path) -> Result<PipelineConfig, InfrastructureError> {
    // 1. Base layer: file or defaults
    let mut config = match find_config_file(project_dir) {
        Some(path) => {
            info!(path = ?path, "Loading pipeline configuration");
            let content = fs::read_to_string(&path)?;
            serde_yaml::from_str(&content)?
        }
        None => {
            info!(dir = ?project_dir, "No pricefeed.yaml found, using defaults");
            PipelineConfig::default()
        }
    };

    // 2. Env layer: PRICEFEED_DATABASE=/tmp/x.duckdb pricefeed load
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    // 3. Anchor + validate
    let config = config.resolve_paths(project_dir);
    validate(&config)?;
    Ok(config)
}

fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

fn apply_env_overrides<F>(config: &mut PipelineConfig, lookup: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("PRICEFEED_RAW_STORE") {
        info!(old = ?config.raw_store_path, new = ?val, "Overriding raw store via ENV");
        config.raw_store_path = PathBuf::from(val);
    }
    if let Some(val) = lookup("PRICEFEED_CLEAN_STORE") {
        info!(old = ?config.clean_store_path, new = ?val, "Overriding clean store via ENV");
        config.clean_store_path = PathBuf::from(val);
    }
    if let Some(val) = lookup("PRICEFEED_DATABASE") {
        info!(old = ?config.database_path, new = ?val, "Overriding database via ENV");
        config.database_path = val;
    }
    if let Some(val) = lookup("PRICEFEED_FALLBACK_RATE") {
        config.fallback_rate = val.trim().parse().map_err(|_| {
            InfrastructureError::ConfigError(format!(
                "PRICEFEED_FALLBACK_RATE is not a number: '{}'",
                val
            ))
        })?;
    }
    Ok(())
}

fn validate(config: &PipelineConfig) -> Result<(), InfrastructureError> {
    ExchangeRate::validate(config.fallback_rate).map_err(|e| {
        InfrastructureError::ConfigError(format!("fallback-rate: {}", e))
    })?;
    if config.http_timeout_secs == 0 {
        return Err(InfrastructureError::ConfigError(
            "http-timeout-secs must be at least 1".into(),
        ));
    }
    if !config.premium_threshold_gbp.is_finite() || config.premium_threshold_gbp < 0.0 {
        return Err(InfrastructureError::ConfigError(format!(
            "premium-threshold-gbp must be a non-negative number, got {}",
            config.premium_threshold_gbp
        )));
    }
    if config.database_path.trim().is_empty() {
        return Err(InfrastructureError::ConfigError(
            "database-path must not be empty".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::reconcile::RetentionPolicy;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_no_file() -> Result<()> {
        let dir = tempdir()?;
        let mut config = PipelineConfig::default();
        apply_env_overrides(&mut config, |_| None)?;
        let config = config.resolve_paths(dir.path());

        assert_eq!(config.raw_store_path, dir.path().join("data/raw"));
        assert_eq!(config.clean_store_path, dir.path().join("data/clean"));
        assert!(config.database_path.ends_with("product_data.duckdb"));
        assert_eq!(config.fallback_rate, 0.85);
        assert_eq!(config.retention, RetentionPolicy::KeepAll);
        Ok(())
    }

    #[test]
    fn test_yaml_file_is_loaded() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("pricefeed.yaml"),
            r#"
raw-store-path: staging/raw
database-path: ":memory:"
fallback-rate: 0.8
retention: prune_missing
column-mapping:
  id: product_id
  price: price_usd
  sku: product_id
"#,
        )?;

        let config = load_pipeline_config(dir.path())?;
        assert_eq!(config.raw_store_path, dir.path().join("staging/raw"));
        assert_eq!(config.clean_store_path, dir.path().join("data/clean"));
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.fallback_rate, 0.8);
        assert_eq!(config.retention, RetentionPolicy::PruneMissing);
        assert_eq!(config.column_mapping.canonical_name("sku"), "product_id");
        Ok(())
    }

    #[test]
    fn test_env_overrides_win() -> Result<()> {
        let env: HashMap<&str, &str> = [
            ("PRICEFEED_DATABASE", "/srv/products.duckdb"),
            ("PRICEFEED_FALLBACK_RATE", "0.9"),
        ]
        .into_iter()
        .collect();

        let mut config = PipelineConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()))?;

        assert_eq!(config.database_path, "/srv/products.duckdb");
        assert_eq!(config.fallback_rate, 0.9);
        Ok(())
    }

    #[test]
    fn test_bad_env_rate_is_config_error() {
        let mut config = PipelineConfig::default();
        let result = apply_env_overrides(&mut config, |k| {
            (k == "PRICEFEED_FALLBACK_RATE").then(|| "cheap".to_string())
        });
        assert!(matches!(result, Err(InfrastructureError::ConfigError(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = PipelineConfig {
            fallback_rate: 0.0,
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        let config = PipelineConfig {
            http_timeout_secs: 0,
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        assert!(validate(&PipelineConfig::default()).is_ok());
    }

    #[test]
    fn test_malformed_yaml_is_reported() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("pricefeed.yml"), "fallback-rate: [not, a, number]")?;
        assert!(matches!(
            load_pipeline_config(dir.path()),
            Err(InfrastructureError::YamlError(_))
        ));
        Ok(())
    }
}
