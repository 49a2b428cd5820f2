//! Combined dataset built from per-chunk candle pulls

use crate::data::{Candle, Granularity};
use crate::planner::Chunk;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Candles fetched for one chunk of the range
#[derive(Debug, Clone)]
pub struct ChunkCandles {
    pub chunk: Chunk,
    pub candles: Vec<Candle>,
}

/// All candles for one pull, ascending by time.
///
/// Covers the half-open range `[start, end)`. Timestamps are unique: a
/// candle that two adjacent chunks both returned is kept once.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedDataset {
    symbol: String,
    granularity: Granularity,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    candles: Vec<Candle>,
}

impl CombinedDataset {
    /// Create an empty dataset for a range
    pub fn new(symbol: &str, granularity: Granularity, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            granularity,
            start,
            end,
            candles: Vec::new(),
        }
    }

    /// Assemble a dataset from chunk results in any completion order
    pub fn from_chunks(
        symbol: &str,
        granularity: Granularity,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        mut chunks: Vec<ChunkCandles>,
    ) -> Self {
        chunks.sort_by_key(|c| c.chunk.start);

        let mut dataset = Self::new(symbol, granularity, start, end);
        for chunk in chunks {
            dataset.candles.extend(chunk.candles);
        }
        dataset.normalize();
        dataset
    }

    /// Sort ascending, drop rows outside the range and boundary duplicates
    fn normalize(&mut self) {
        let before = self.candles.len();
        let (start, end) = (self.start, self.end);

        self.candles.retain(|c| c.time >= start && c.time < end);
        // Stable sort keeps the earlier chunk's copy first for dedup
        self.candles.sort_by_key(|c| c.time);
        self.candles.dedup_by_key(|c| c.time);

        let dropped = before - self.candles.len();
        if dropped > 0 {
            debug!(
                "Dropped {} out-of-range or duplicate candles for {}",
                dropped, self.symbol
            );
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Requested range start (inclusive)
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Requested range end (exclusive)
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Get number of candles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Get all candles
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Rows with a clean 0-based sequential index
    pub fn rows(&self) -> impl Iterator<Item = (usize, &Candle)> {
        self.candles.iter().enumerate()
    }

    /// Get close prices as vector
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Get volumes as vector
    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 1, hour, minute, 0).unwrap()
    }

    fn candle(time: DateTime<Utc>, close: f64) -> Candle {
        Candle::new(time, close - 1.0, close + 1.0, close, close, 1.0)
    }

    fn chunk(index: usize, start: DateTime<Utc>, end: DateTime<Utc>, candles: Vec<Candle>) -> ChunkCandles {
        ChunkCandles {
            chunk: Chunk { index, start, end },
            candles,
        }
    }

    #[test]
    fn test_chunks_in_reverse_completion_order() {
        let first = chunk(0, t(0, 0), t(0, 2), vec![candle(t(0, 1), 2.0), candle(t(0, 0), 1.0)]);
        let second = chunk(1, t(0, 2), t(0, 4), vec![candle(t(0, 3), 4.0), candle(t(0, 2), 3.0)]);

        let dataset = CombinedDataset::from_chunks(
            "BTC-USD",
            Granularity::OneMinute,
            t(0, 0),
            t(0, 4),
            vec![second, first],
        );

        assert_eq!(dataset.closes(), vec![1.0, 2.0, 3.0, 4.0]);
        let indexes: Vec<usize> = dataset.rows().map(|(i, _)| i).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_boundary_duplicate_kept_once() {
        // Both chunks return the 00:02 candle
        let first = chunk(0, t(0, 0), t(0, 2), vec![candle(t(0, 0), 1.0), candle(t(0, 2), 3.0)]);
        let second = chunk(1, t(0, 2), t(0, 4), vec![candle(t(0, 2), 99.0), candle(t(0, 3), 4.0)]);

        let dataset = CombinedDataset::from_chunks(
            "BTC-USD",
            Granularity::OneMinute,
            t(0, 0),
            t(0, 4),
            vec![first, second],
        );

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.closes(), vec![1.0, 3.0, 4.0]);
        assert_eq!(dataset.volumes(), vec![1.0; 3]);
    }

    #[test]
    fn test_rows_outside_range_dropped() {
        let rows = vec![
            candle(t(0, 0) - Duration::minutes(1), 0.0),
            candle(t(0, 0), 1.0),
            candle(t(0, 4), 5.0),
        ];
        let dataset = CombinedDataset::from_chunks(
            "ETH-USD",
            Granularity::OneMinute,
            t(0, 0),
            t(0, 4),
            vec![chunk(0, t(0, 0), t(0, 4), rows)],
        );

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.first().unwrap().time, t(0, 0));
        assert_eq!(dataset.symbol(), "ETH-USD");
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = CombinedDataset::from_chunks("BTC-USD", Granularity::OneHour, t(0, 0), t(5, 0), Vec::new());
        assert!(dataset.is_empty());
        assert!(dataset.last().is_none());
    }
}
