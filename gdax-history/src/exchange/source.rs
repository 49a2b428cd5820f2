//! Candle fetch capability

use crate::data::Granularity;
use crate::error::Result;
use crate::exchange::FetchOutcome;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Anything that can answer a single candles request.
///
/// Implementations report throttling and refusals as [`FetchOutcome::Failure`]
/// and reserve `Err` for transport or decoding failures.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Source name (for logging/display)
    fn name(&self) -> &str;

    /// Request candles for `symbol` between `start` and `end`
    async fn fetch_candles(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<FetchOutcome>;
}
