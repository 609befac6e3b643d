// pricefeed-core/src/error.rs

use crate::domain::error::DomainError;
use crate::domain::snapshot::Stage;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricefeedError {
    // --- DOMAIN (invalid records, invariants) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE (IO, Parsing, DB) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- PIPELINE TAXONOMY ---
    /// No snapshot exists where one is required. Nothing was mutated; retry later.
    #[error("No {stage} snapshot found in {location}")]
    NotFound { stage: Stage, location: String },

    /// Rate provider or source feed unreachable or malformed.
    #[error("Upstream '{provider}' unavailable: {reason}")]
    UpstreamUnavailable { provider: String, reason: String },

    /// The table commit failed and was rolled back.
    #[error("Reconciliation of snapshot '{snapshot}' failed and was rolled back: {source}")]
    ReconciliationFailure {
        snapshot: String,
        #[source]
        source: InfrastructureError,
    },

    /// A record in the named snapshot broke a domain rule. Nothing was written.
    #[error("{stage} snapshot '{snapshot}' rejected: {source}")]
    InvalidSnapshot {
        stage: Stage,
        snapshot: String,
        #[source]
        source: DomainError,
    },

    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl PricefeedError {
    pub fn upstream(provider: &str, reason: impl ToString) -> Self {
        PricefeedError::UpstreamUnavailable {
            provider: provider.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_snapshot(stage: Stage, snapshot: &str, source: DomainError) -> Self {
        PricefeedError::InvalidSnapshot {
            stage,
            snapshot: snapshot.to_string(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PricefeedError::NotFound { .. })
    }
}

impl From<std::io::Error> for PricefeedError {
    fn from(err: std::io::Error) -> Self {
        PricefeedError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for PricefeedError {
    fn from(err: duckdb::Error) -> Self {
        PricefeedError::Infrastructure(InfrastructureError::from(err))
    }
}
