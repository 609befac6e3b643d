// pricefeed-core/src/infrastructure/adapters/source_feed.rs

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::PricefeedError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::source::ProductSource;

const PROVIDER: &str = "product-feed";

/// Product catalog over HTTP (Fake Store API shaped: a JSON array of objects).
#[derive(Clone, Debug)]
pub struct HttpProductSource {
    http_client: reqwest::Client,
    url: String,
}

impl HttpProductSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, InfrastructureError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            url: url.to_string(),
        })
    }
}

/// Accepts only an array of objects. Anything else means the feed is broken,
/// and nothing is synthesized in its place.
pub fn parse_feed(body: Value) -> Result<Vec<Value>, String> {
    let Value::Array(items) = body else {
        return Err("expected a JSON array of products".to_string());
    };
    if let Some(position) = items.iter().position(|item| !item.is_object()) {
        return Err(format!("item {} is not a JSON object", position));
    }
    Ok(items)
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn fetch_products(&self) -> Result<Vec<Value>, PricefeedError> {
        debug!(url = %self.url, "Requesting product feed");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PricefeedError::upstream(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(PricefeedError::upstream(
                PROVIDER,
                format!("HTTP {}", response.status()),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PricefeedError::upstream(PROVIDER, e))?;

        parse_feed(body).map_err(|reason| PricefeedError::upstream(PROVIDER, reason))
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
