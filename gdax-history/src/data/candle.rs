//! OHLCV candle data structures

use crate::error::{PullError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One row exactly as the candles endpoint returns it:
/// `[time, low, high, open, close, volume]`, time in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCandle(pub i64, pub f64, pub f64, pub f64, pub f64, pub f64);

impl RawCandle {
    /// Epoch seconds of the bucket start
    pub fn epoch(&self) -> i64 {
        self.0
    }

    /// Convert to a [`Candle`], turning epoch seconds into a UTC timestamp
    pub fn into_candle(self) -> Result<Candle> {
        let RawCandle(epoch, low, high, open, close, volume) = self;
        let time = Utc
            .timestamp_opt(epoch, 0)
            .single()
            .ok_or_else(|| PullError::MalformedRow(format!("timestamp out of range: {}", epoch)))?;

        Ok(Candle {
            time,
            low,
            high,
            open,
            close,
            volume,
        })
    }
}

/// OHLCV candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start
    pub time: DateTime<Utc>,
    /// Low price
    pub low: f64,
    /// High price
    pub high: f64,
    /// Opening price
    pub open: f64,
    /// Closing price
    pub close: f64,
    /// Volume in base currency
    pub volume: f64,
}

impl Candle {
    /// Create a new candle
    pub fn new(time: DateTime<Utc>, low: f64, high: f64, open: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            low,
            high,
            open,
            close,
            volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_candle_from_wire_row() {
        // Integer prices are accepted for float columns
        let raw: RawCandle =
            serde_json::from_str("[1609459200, 28900.5, 29010, 28950.1, 29000.0, 12.75]").unwrap();
        assert_eq!(raw.epoch(), 1_609_459_200);

        let candle = raw.into_candle().unwrap();
        assert_eq!(candle.time, Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(candle.low, 28900.5);
        assert_eq!(candle.high, 29010.0);
        assert_eq!(candle.open, 28950.1);
        assert_eq!(candle.close, 29000.0);
        assert_eq!(candle.volume, 12.75);
    }

    #[test]
    fn test_raw_candle_out_of_range_time() {
        let raw = RawCandle(i64::MAX, 1.0, 1.0, 1.0, 1.0, 1.0);
        assert!(matches!(raw.into_candle(), Err(PullError::MalformedRow(_))));
    }

    #[test]
    fn test_raw_candle_rejects_short_row() {
        assert!(serde_json::from_str::<RawCandle>("[1609459200, 1.0, 2.0]").is_err());
    }
}
