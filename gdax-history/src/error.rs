//! Error types for the candle puller

use chrono::{DateTime, Utc};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum PullError {
    #[error("Invalid date '{input}' (expected YYYY-MM-DD): {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid range: end {end} must be after start {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Unsupported granularity: {0} (allowed: 60, 300, 900, 3600, 21600, 86400)")]
    InvalidGranularity(String),

    #[error("Retries exhausted for chunk {start} -> {end} after {attempts} attempts: {message}")]
    RetryExhausted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        attempts: u32,
        message: String,
    },

    #[error("Upstream error for chunk {start} -> {end}: {message}")]
    Upstream {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        message: String,
    },

    #[error("Chunk {start} -> {end} failed: {source}")]
    ChunkFailed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        #[source]
        source: Box<PullError>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed candle data: {0}")]
    MalformedRow(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PullError {
    /// True for failures that point at one specific chunk of the range
    pub fn is_chunk_error(&self) -> bool {
        matches!(
            self,
            PullError::RetryExhausted { .. } | PullError::Upstream { .. } | PullError::ChunkFailed { .. }
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PullError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PullError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_keeps_source() {
        let err = PullError::io("Failed to create out.jsonl", std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(err.to_string().starts_with("IO error: Failed to create out.jsonl"));
        let source = err.source().unwrap().downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_json_keeps_source() {
        let err: PullError = serde_json::from_str::<Vec<u32>>("[1,").unwrap_err().into();
        assert!(matches!(err, PullError::Json(_)));
        assert!(err.source().unwrap().downcast_ref::<serde_json::Error>().is_some());
    }
}
