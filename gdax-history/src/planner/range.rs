//! Date-range chunk planning

use crate::data::Granularity;
use crate::error::{PullError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Default span of one chunk: 300 one-minute candles
pub const DEFAULT_CHUNK_HOURS: i64 = 5;

/// Rows the candles endpoint returns per call at most
pub const MAX_CANDLES_PER_REQUEST: u32 = 300;

/// Parse a `YYYY-MM-DD` date as midnight UTC
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|source| PullError::Parse {
        input: input.to_string(),
        source,
    })?;

    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// One sub-interval of the requested range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the plan, 0-based
    pub index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Chunk {
    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}

/// Ordered chunk boundaries; always at least two, strictly increasing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkBoundaries(Vec<DateTime<Utc>>);

impl ChunkBoundaries {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> DateTime<Utc> {
        self.0[0]
    }

    pub fn last(&self) -> DateTime<Utc> {
        self.0[self.0.len() - 1]
    }

    pub fn as_slice(&self) -> &[DateTime<Utc>] {
        &self.0
    }

    /// Every adjacent pair of boundaries, including the final one
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        self.0.windows(2).enumerate().map(|(index, pair)| Chunk {
            index,
            start: pair[0],
            end: pair[1],
        })
    }

    /// Chunks with the last one clipped to `end`; chunks starting at or
    /// after `end` are skipped
    pub fn chunks_clamped(&self, end: DateTime<Utc>) -> Vec<Chunk> {
        self.chunks()
            .filter(|c| c.start < end)
            .map(|c| Chunk {
                end: c.end.min(end),
                ..c
            })
            .collect()
    }
}

/// Plans chunk boundaries at a fixed span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangePlanner {
    chunk_span: Duration,
}

impl RangePlanner {
    pub fn new(chunk_span: Duration) -> Result<Self> {
        if chunk_span <= Duration::zero() {
            return Err(PullError::Config(format!(
                "chunk span must be positive, got {}s",
                chunk_span.num_seconds()
            )));
        }
        Ok(Self { chunk_span })
    }

    /// Span that yields exactly `max_candles` candles at `granularity`
    pub fn for_granularity(granularity: Granularity, max_candles: u32) -> Self {
        let candles = i64::from(max_candles.max(1));
        Self {
            chunk_span: Duration::seconds(i64::from(granularity.seconds()) * candles),
        }
    }

    pub fn chunk_span(&self) -> Duration {
        self.chunk_span
    }

    /// Chunks per 24 hours, e.g. 4.8 for a 5 hour span
    pub fn chunks_per_day(&self) -> f64 {
        Duration::days(1).num_seconds() as f64 / self.chunk_span.num_seconds() as f64
    }

    /// Candles one chunk holds at `granularity`
    pub fn candles_per_chunk(&self, granularity: Granularity) -> i64 {
        self.chunk_span.num_seconds() / i64::from(granularity.seconds())
    }

    /// Boundaries `start + k * span` for `k = 0..=ceil((end - start) / span)`.
    ///
    /// The last boundary lands on or after `end`.
    pub fn plan(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<ChunkBoundaries> {
        if end <= start {
            return Err(PullError::InvalidRange { start, end });
        }

        let total = (end - start).num_seconds();
        let span = self.chunk_span.num_seconds();
        let chunks = (total + span - 1) / span;

        let mut boundaries = Vec::with_capacity(usize::try_from(chunks + 1).unwrap_or_default());
        let mut boundary = start;
        boundaries.push(boundary);
        for _ in 0..chunks {
            boundary = boundary.checked_add_signed(self.chunk_span).ok_or_else(|| {
                PullError::Config(format!(
                    "chunk span of {}s runs past the supported date range after {}",
                    span, boundary
                ))
            })?;
            boundaries.push(boundary);
        }

        Ok(ChunkBoundaries(boundaries))
    }

    /// [`plan`](Self::plan) over `YYYY-MM-DD` strings
    pub fn plan_dates(&self, start_date: &str, end_date: &str) -> Result<ChunkBoundaries> {
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        self.plan(start, end)
    }
}

impl Default for RangePlanner {
    fn default() -> Self {
        Self {
            chunk_span: Duration::hours(DEFAULT_CHUNK_HOURS),
        }
    }
}
