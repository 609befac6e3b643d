// pricefeed-core/src/domain/mapping.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::domain::error::DomainError;
use crate::domain::product::RawRecord;

/// Feed field name -> canonical field name.
///
/// Runs before any derivation so the transform only ever sees canonical names,
/// whatever the upstream feed calls its columns. Canonical names map to themselves
/// implicitly, so a feed that already speaks the internal schema needs no entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    renames: BTreeMap<String, String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        let renames = [("id", "product_id"), ("price", "price_usd")]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self { renames }
    }
}

impl ColumnMapping {
    pub fn new(renames: BTreeMap<String, String>) -> Self {
        Self { renames }
    }

    /// Adds or replaces one alias.
    pub fn with_alias(mut self, feed_name: &str, canonical: &str) -> Self {
        self.renames
            .insert(feed_name.to_string(), canonical.to_string());
        self
    }

    pub fn canonical_name<'a>(&'a self, feed_name: &'a str) -> &'a str {
        self.renames
            .get(feed_name)
            .map(String::as_str)
            .unwrap_or(feed_name)
    }

    /// Renames the keys of one feed object. When both an alias and its canonical
    /// name are present, the field already carrying the canonical name is kept.
    pub fn normalize(&self, object: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::with_capacity(object.len());
        for (key, value) in object {
            let canonical = self.canonical_name(key);
            if canonical != key && object.contains_key(canonical) {
                continue;
            }
            out.insert(canonical.to_string(), value.clone());
        }
        out
    }

    /// Normalizes a whole raw snapshot into typed records.
    pub fn apply(&self, raw: &[Value]) -> Result<Vec<RawRecord>, DomainError> {
        raw.iter()
            .enumerate()
            .map(|(position, value)| {
                let object = value.as_object().ok_or_else(|| DomainError::InvalidRecord {
                    position,
                    reason: "expected a JSON object".to_string(),
                })?;
                let normalized = self.normalize(object);
                serde_json::from_value(Value::Object(normalized)).map_err(|e| {
                    DomainError::InvalidRecord {
                        position,
                        reason: e.to_string(),
                    }
                })
            })
            .collect()
    }
}
