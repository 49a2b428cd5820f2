//! Pull configuration loaded from the environment

use crate::data::Granularity;
use crate::error::{PullError, Result};
use crate::planner::MAX_CANDLES_PER_REQUEST;
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_API_URL: &str = "https://api.exchange.coinbase.com";

/// Settings for one historical pull
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullConfig {
    /// Exchange REST base URL
    pub api_url: String,
    /// Candle granularity (seconds on the wire)
    pub granularity: Granularity,
    /// Rows the endpoint returns per call at most
    pub max_candles_per_request: u32,
    /// Retries per chunk on rate limits and 5xx responses before giving up
    pub max_retries: u32,
    /// First backoff delay in milliseconds, doubled per retry
    pub backoff_ms: u64,
    /// Upper bound on a single backoff delay in milliseconds
    pub max_backoff_ms: u64,
    /// Pause between consecutive chunk requests in milliseconds
    pub request_delay_ms: u64,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            granularity: Granularity::OneMinute,
            max_candles_per_request: MAX_CANDLES_PER_REQUEST,
            max_retries: 5,
            backoff_ms: 1_000,
            max_backoff_ms: 60_000,
            request_delay_ms: 0,
            timeout_secs: 30,
        }
    }
}

impl PullConfig {
    /// Load from `.env` and the process environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            api_url: std::env::var("GDAX_API_URL").unwrap_or(defaults.api_url),
            granularity: env_or("GDAX_GRANULARITY", defaults.granularity)?,
            max_candles_per_request: env_or("GDAX_MAX_CANDLES", defaults.max_candles_per_request)?,
            max_retries: env_or("GDAX_MAX_RETRIES", defaults.max_retries)?,
            backoff_ms: env_or("GDAX_BACKOFF_MS", defaults.backoff_ms)?,
            max_backoff_ms: env_or("GDAX_MAX_BACKOFF_MS", defaults.max_backoff_ms)?,
            request_delay_ms: env_or("GDAX_REQUEST_DELAY_MS", defaults.request_delay_ms)?,
            timeout_secs: env_or("GDAX_TIMEOUT_SECS", defaults.timeout_secs)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PullError::Config(format!(
                "GDAX_API_URL must start with http:// or https://, got: '{}'",
                self.api_url
            )));
        }
        if self.max_candles_per_request == 0 || self.max_candles_per_request > MAX_CANDLES_PER_REQUEST {
            return Err(PullError::Config(format!(
                "GDAX_MAX_CANDLES must be between 1 and {}, got {}",
                MAX_CANDLES_PER_REQUEST, self.max_candles_per_request
            )));
        }
        if self.timeout_secs == 0 {
            return Err(PullError::Config("GDAX_TIMEOUT_SECS must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| PullError::Config(format!("{}='{}': {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}
