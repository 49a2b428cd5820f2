//! GDAX / Coinbase Exchange public candles client

use crate::config::PullConfig;
use crate::data::Granularity;
use crate::error::{PullError, Result};
use crate::exchange::{classify_response, CandleSource, FetchOutcome};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("gdax-history/", env!("CARGO_PKG_VERSION"));

/// Client for `GET /products/{symbol}/candles`
pub struct GdaxClient {
    base_url: String,
    client: reqwest::Client,
}

impl GdaxClient {
    /// Create a client from pull settings
    pub fn new(config: &PullConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.api_url.trim().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PullError::Network(format!("Failed to create HTTP client: {}", e)))?;

        info!("Created GdaxClient: base_url='{}'", base_url);

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full candles URL for one request
    pub fn candles_url(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> String {
        format!(
            "{}/products/{}/candles?start={}&end={}&granularity={}",
            self.base_url,
            symbol,
            start.to_rfc3339_opts(SecondsFormat::Secs, true),
            end.to_rfc3339_opts(SecondsFormat::Secs, true),
            granularity.seconds()
        )
    }
}

#[async_trait]
impl CandleSource for GdaxClient {
    fn name(&self) -> &str {
        "gdax"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<FetchOutcome> {
        let url = self.candles_url(symbol, start, end, granularity);
        debug!("Sending request to: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PullError::Network(format!("Request failed: {} (url: {})", e, url)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PullError::Network(format!("Failed to read response body: {}", e)))?;

        debug!("Received HTTP {} ({} bytes) for {}", status, body.len(), symbol);
        classify_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_candles_url() {
        let config = PullConfig {
            api_url: " https://api.exchange.coinbase.com/ ".to_string(),
            ..PullConfig::default()
        };
        let client = GdaxClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.exchange.coinbase.com");

        let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2021, 1, 1, 5, 0, 0).unwrap();
        assert_eq!(
            client.candles_url("BTC-USD", start, end, Granularity::OneMinute),
            "https://api.exchange.coinbase.com/products/BTC-USD/candles\
             ?start=2021-01-01T00:00:00Z&end=2021-01-01T05:00:00Z&granularity=60"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = PullConfig {
            api_url: "ftp://example.com".to_string(),
            ..PullConfig::default()
        };
        assert!(matches!(GdaxClient::new(&config), Err(PullError::Config(_))));
    }
}
