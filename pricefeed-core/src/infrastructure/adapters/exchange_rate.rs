// pricefeed-core/src/infrastructure/adapters/exchange_rate.rs

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::domain::rate::ExchangeRate;
use crate::error::PricefeedError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::rates::RateProvider;

const PROVIDER: &str = "exchange-rate";

/// Rate lookup over HTTP. The endpoint must answer a JSON object holding the
/// GBP rate under `rates.GBP`.
#[derive(Clone, Debug)]
pub struct HttpRateProvider {
    http_client: reqwest::Client,
    url: String,
}

impl HttpRateProvider {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, InfrastructureError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Extracts `rates.GBP` from a provider response body.
pub fn parse_gbp_rate(body: &Value) -> Result<f64, String> {
    let raw = body
        .get("rates")
        .and_then(|rates| rates.get("GBP"))
        .ok_or_else(|| "response has no rates.GBP".to_string())?;

    // Some providers quote numbers as strings
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| format!("rates.GBP is not a number: {}", raw))?;

    ExchangeRate::validate(value).map_err(|e| e.to_string())?;
    Ok(value)
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn usd_to_gbp(&self) -> Result<f64, PricefeedError> {
        debug!(url = %self.url, "Requesting USD -> GBP rate");

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

        parse_gbp_rate(&body).map_err(|reason| PricefeedError::upstream(PROVIDER, reason))
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rate_from_nested_path() {
        let body = json!({ "base": "USD", "rates": { "GBP": 0.7912 } });
        assert_eq!(parse_gbp_rate(&body), Ok(0.7912));
    }

    #[test]
    fn test_parse_rate_accepts_numeric_strings() {
        let body = json!({ "rates": { "GBP": " 0.8 " } });
        assert_eq!(parse_gbp_rate(&body), Ok(0.8));
    }

    #[test]
    fn test_parse_rate_missing_or_invalid() {
        assert!(parse_gbp_rate(&json!({ "success": false })).is_err());
        assert!(parse_gbp_rate(&json!({ "rates": { "EUR": 0.9 } })).is_err());
        assert!(parse_gbp_rate(&json!({ "rates": { "GBP": null } })).is_err());
        assert!(parse_gbp_rate(&json!({ "rates": { "GBP": -0.8 } })).is_err());
        assert!(parse_gbp_rate(&json!({ "rates": { "GBP": 0 } })).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_upstream_error() {
        // Port 9 (discard) is closed on test hosts: connection refused
        let provider =
            HttpRateProvider::new("http://127.0.0.1:9/latest", Duration::from_secs(2)).unwrap();

        match provider.usd_to_gbp().await {
            Err(PricefeedError::UpstreamUnavailable { provider, .. }) => {
                assert_eq!(provider, "exchange-rate")
            }
            other => panic!("Expected UpstreamUnavailable, got {:?}", other),
        }
    }
}
