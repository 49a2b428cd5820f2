//! Candle sampling periods accepted by the exchange

use crate::error::PullError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle granularity in seconds.
///
/// The candles endpoint rejects anything outside this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Granularity {
    /// 1-minute candles
    OneMinute,
    /// 5-minute candles
    FiveMinutes,
    /// 15-minute candles
    FifteenMinutes,
    /// 1-hour candles
    OneHour,
    /// 6-hour candles
    SixHours,
    /// Daily candles
    OneDay,
}

impl Granularity {
    /// Sampling period in seconds, as sent on the wire
    pub fn seconds(&self) -> u32 {
        match self {
            Granularity::OneMinute => 60,
            Granularity::FiveMinutes => 300,
            Granularity::FifteenMinutes => 900,
            Granularity::OneHour => 3600,
            Granularity::SixHours => 21600,
            Granularity::OneDay => 86400,
        }
    }

    /// Short label, e.g. "1m" or "6h"
    pub fn label(&self) -> &'static str {
        match self {
            Granularity::OneMinute => "1m",
            Granularity::FiveMinutes => "5m",
            Granularity::FifteenMinutes => "15m",
            Granularity::OneHour => "1h",
            Granularity::SixHours => "6h",
            Granularity::OneDay => "1d",
        }
    }

    pub fn all() -> [Granularity; 6] {
        [
            Granularity::OneMinute,
            Granularity::FiveMinutes,
            Granularity::FifteenMinutes,
            Granularity::OneHour,
            Granularity::SixHours,
            Granularity::OneDay,
        ]
    }
}

impl TryFrom<u32> for Granularity {
    type Error = PullError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        Granularity::all()
            .into_iter()
            .find(|g| g.seconds() == seconds)
            .ok_or_else(|| PullError::InvalidGranularity(seconds.to_string()))
    }
}

impl From<Granularity> for u32 {
    fn from(granularity: Granularity) -> Self {
        granularity.seconds()
    }
}

impl FromStr for Granularity {
    type Err = PullError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(seconds) = s.parse::<u32>() {
            return Granularity::try_from(seconds);
        }

        match s.to_lowercase().as_str() {
            "1m" => Ok(Granularity::OneMinute),
            "5m" => Ok(Granularity::FiveMinutes),
            "15m" => Ok(Granularity::FifteenMinutes),
            "1h" => Ok(Granularity::OneHour),
            "6h" => Ok(Granularity::SixHours),
            "1d" => Ok(Granularity::OneDay),
            _ => Err(PullError::InvalidGranularity(s.to_string())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::OneMinute
    }
}
