// pricefeed-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(pricefeed::infra::database::duckdb),
        help("An error occurred inside the SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("Database connection lock poisoned")]
    #[diagnostic(code(pricefeed::infra::database::poisoned))]
    Poisoned,
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(pricefeed::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    #[error("Snapshot '{id}' is listed in the manifest but its file is unreadable: {source}")]
    #[diagnostic(
        code(pricefeed::infra::snapshot_missing),
        help("The store directory was modified outside the pipeline. Re-run the producing stage.")
    )]
    SnapshotUnreadable {
        id: String,
        #[source]
        source: std::io::Error,
    },

    // --- SERIALIZATION ---
    #[error("JSON Error: {0}")]
    #[diagnostic(code(pricefeed::infra::json))]
    Json(#[from] serde_json::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(pricefeed::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(pricefeed::infra::config))]
    ConfigError(String),

    // --- NETWORK ---
    #[error("HTTP Error: {0}")]
    #[diagnostic(code(pricefeed::infra::http))]
    Http(#[from] reqwest::Error),
}

// Shortcut for `?` on duckdb calls
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}
