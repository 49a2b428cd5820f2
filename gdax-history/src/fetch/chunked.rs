//! Chunked candle fetcher

use crate::config::PullConfig;
use crate::data::{Candle, ChunkCandles, CombinedDataset, Granularity, RawCandle};
use crate::error::{PullError, Result};
use crate::exchange::{CandleSource, FailureKind, FetchOutcome};
use crate::fetch::RetryPolicy;
use crate::planner::{parse_date, Chunk, RangePlanner, MAX_CANDLES_PER_REQUEST};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters for one pull
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Chunks fetched
    pub chunks: usize,
    /// Requests sent, retries included
    pub requests: usize,
    /// Requests repeated after a rate-limit error
    pub rate_limit_retries: usize,
    /// Requests repeated after a 5xx response
    pub unavailable_retries: usize,
    /// Candles in the final dataset
    pub candles: usize,
}

/// Fetches a date range one chunk at a time through a [`CandleSource`]
pub struct ChunkedFetcher<S> {
    source: S,
    retry: RetryPolicy,
    planner: Option<RangePlanner>,
    max_candles_per_request: u32,
    request_delay: Duration,
}

impl<S: CandleSource> ChunkedFetcher<S> {
    /// Create a fetcher with default retry policy and no request pacing
    pub fn new(source: S) -> Self {
        Self {
            source,
            retry: RetryPolicy::default(),
            planner: None,
            max_candles_per_request: MAX_CANDLES_PER_REQUEST,
            request_delay: Duration::ZERO,
        }
    }

    pub fn from_config(source: S, config: &PullConfig) -> Self {
        Self::new(source)
            .with_retry_policy(RetryPolicy::from_config(config))
            .with_max_candles(config.max_candles_per_request)
            .with_request_delay(Duration::from_millis(config.request_delay_ms))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pin a planner instead of deriving one from the granularity per call
    pub fn with_planner(mut self, planner: RangePlanner) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn with_max_candles(mut self, max_candles: u32) -> Self {
        self.max_candles_per_request = max_candles.max(1);
        self
    }

    /// Pause between consecutive chunk requests
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Planner used for a pull at `granularity`
    pub fn planner_for(&self, granularity: Granularity) -> RangePlanner {
        match self.planner {
            Some(planner) => {
                let per_chunk = planner.candles_per_chunk(granularity);
                if per_chunk > i64::from(self.max_candles_per_request) {
                    warn!(
                        "Chunk span of {}s holds {} {} candles, above the {} per request cap; the exchange will reject these requests",
                        planner.chunk_span().num_seconds(),
                        per_chunk,
                        granularity,
                        self.max_candles_per_request
                    );
                }
                planner
            }
            None => RangePlanner::for_granularity(granularity, self.max_candles_per_request),
        }
    }

    /// Fetch `symbol` for `YYYY-MM-DD` dates `[start_date, end_date)`
    pub async fn fetch_range(
        &self,
        symbol: &str,
        start_date: &str,
        end_date: &str,
        granularity: Granularity,
    ) -> Result<CombinedDataset> {
        let (dataset, _) = self
            .fetch_range_with_stats(symbol, start_date, end_date, granularity)
            .await?;
        Ok(dataset)
    }

    pub async fn fetch_range_with_stats(
        &self,
        symbol: &str,
        start_date: &str,
        end_date: &str,
        granularity: Granularity,
    ) -> Result<(CombinedDataset, FetchStats)> {
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        self.fetch_between(symbol, start, end, granularity).await
    }

    /// Fetch `symbol` for `[start, end)`.
    ///
    /// Chunks run sequentially. The first chunk that fails for good aborts the
    /// pull; no partial dataset is returned.
    pub async fn fetch_between(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<(CombinedDataset, FetchStats)> {
        let planner = self.planner_for(granularity);
        let boundaries = planner.plan(start, end)?;
        let chunks = boundaries.chunks_clamped(end);

        info!(
            "Fetching {} {} candles from {} to {} in {} chunks via {}",
            symbol,
            granularity,
            start,
            end,
            chunks.len(),
            self.source.name()
        );

        let mut stats = FetchStats::default();
        let mut results = Vec::with_capacity(chunks.len());

        for (idx, chunk) in chunks.iter().enumerate() {
            if idx > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let candles = self.fetch_chunk_counted(symbol, chunk, granularity, &mut stats).await?;
            debug!(
                "[{}/{}] {} -> {}: {} candles",
                idx + 1,
                chunks.len(),
                chunk.start,
                chunk.end,
                candles.len()
            );

            stats.chunks += 1;
            results.push(ChunkCandles {
                chunk: *chunk,
                candles,
            });
        }

        let dataset = CombinedDataset::from_chunks(symbol, granularity, start, end, results);
        stats.candles = dataset.len();

        info!(
            "Fetched {} candles for {} ({} requests, {} rate-limit retries, {} 5xx retries)",
            stats.candles, symbol, stats.requests, stats.rate_limit_retries, stats.unavailable_retries
        );

        Ok((dataset, stats))
    }

    /// Fetch one chunk, retrying rate limits and 5xx responses per the retry policy
    pub async fn fetch_chunk(&self, symbol: &str, chunk: &Chunk, granularity: Granularity) -> Result<Vec<Candle>> {
        let mut stats = FetchStats::default();
        self.fetch_chunk_counted(symbol, chunk, granularity, &mut stats).await
    }

    async fn fetch_chunk_counted(
        &self,
        symbol: &str,
        chunk: &Chunk,
        granularity: Granularity,
        stats: &mut FetchStats,
    ) -> Result<Vec<Candle>> {
        let mut retries = 0u32;

        loop {
            stats.requests += 1;
            let outcome = self
                .source
                .fetch_candles(symbol, chunk.start, chunk.end, granularity)
                .await
                .map_err(|e| chunk_failed(chunk, e))?;

            match outcome {
                FetchOutcome::Success(rows) => {
                    return rows
                        .into_iter()
                        .map(RawCandle::into_candle)
                        .collect::<Result<Vec<_>>>()
                        .map_err(|e| chunk_failed(chunk, e));
                }
                FetchOutcome::Failure { kind, message } if kind.is_retryable() => {
                    if retries >= self.retry.max_retries {
                        return Err(PullError::RetryExhausted {
                            start: chunk.start,
                            end: chunk.end,
                            attempts: retries + 1,
                            message,
                        });
                    }

                    retries += 1;
                    match kind {
                        FailureKind::RateLimited => stats.rate_limit_retries += 1,
                        _ => stats.unavailable_retries += 1,
                    }
                    let delay = self.retry.delay_for(retries);
                    warn!(
                        "Chunk {} -> {} {} ({}), retry {}/{} in {:.1}s",
                        chunk.start,
                        chunk.end,
                        kind,
                        message,
                        retries,
                        self.retry.max_retries,
                        delay.as_secs_f64()
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                FetchOutcome::Failure { message, .. } => {
                    return Err(PullError::Upstream {
                        start: chunk.start,
                        end: chunk.end,
                        message,
                    });
                }
            }
        }
    }
}

fn chunk_failed(chunk: &Chunk, source: PullError) -> PullError {
    PullError::ChunkFailed {
        start: chunk.start,
        end: chunk.end,
        source: Box::new(source),
    }
}
