// pricefeed-core/src/domain/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A source product after column normalization (canonical field names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub product_id: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    pub price_usd: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Feeds send `null` for text they do not have; the table stores those as "".
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Enriched record written to the Clean Store and reconciled into the Product Table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub product_id: i64,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub category_group: CategoryGroup,
    pub price_usd: f64,
    pub price_gbp: f64,
    pub is_premium: bool,
    pub image: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Coarse classification derived from the free-text category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryGroup {
    Accessory,
    Electronics,
    Apparel,
    Other,
}

impl CategoryGroup {
    /// Ordered substring rules, first match wins. Accessory must stay ahead of
    /// apparel: "jewelery" categories often mention clothing too.
    pub fn classify(category: Option<&str>) -> Self {
        let Some(text) = category else {
            return Self::Other;
        };
        let lo = text.to_lowercase();

        if lo.contains("jewel") {
            Self::Accessory
        } else if lo.contains("electronics") {
            Self::Electronics
        } else if lo.contains("men") || lo.contains("women") || lo.contains("clothing") {
            Self::Apparel
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accessory => "accessory",
            Self::Electronics => "electronics",
            Self::Apparel => "apparel",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CategoryGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accessory" => Ok(Self::Accessory),
            "electronics" => Ok(Self::Electronics),
            "apparel" => Ok(Self::Apparel),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category group: {}", s)),
        }
    }
}

/// A Product Table row as served by the Query Surface.
/// Numeric and boolean columns are already coalesced (NULL -> 0 / false).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub category_group: Option<String>,
    pub price_usd: f64,
    pub price_gbp: f64,
    pub is_premium: bool,
    pub image: Option<String>,
    pub fetched_at: Option<String>,
}
