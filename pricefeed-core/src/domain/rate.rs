// pricefeed-core/src/domain/rate.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::DomainError;

pub const DEFAULT_FALLBACK_RATE: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Provider,
    Fallback,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider => write!(f, "provider"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// USD -> GBP rate valid for one transform invocation. Never persisted in the table,
/// only recorded on the clean snapshot's manifest entry for auditing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub value: f64,
    pub source: RateSource,
}

impl ExchangeRate {
    pub fn provided(value: f64) -> Result<Self, DomainError> {
        Self::validate(value)?;
        Ok(Self {
            value,
            source: RateSource::Provider,
        })
    }

    pub fn fallback(value: f64) -> Result<Self, DomainError> {
        Self::validate(value)?;
        Ok(Self {
            value,
            source: RateSource::Fallback,
        })
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }

    pub fn validate(value: f64) -> Result<(), DomainError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(DomainError::InvalidRate(value))
        }
    }
}
