//! Tagged candle responses

use crate::data::RawCandle;
use crate::error::{PullError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Why a candles request produced no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Throttled; the same request may succeed later
    RateLimited,
    /// Server-side 5xx; the same request may succeed later
    Unavailable,
    /// Refused for any other reason (bad product, bad range, ...)
    Rejected,
}

impl FailureKind {
    /// Worth sending the same request again after a backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::RateLimited | FailureKind::Unavailable)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::RateLimited => write!(f, "rate limited"),
            FailureKind::Unavailable => write!(f, "unavailable"),
            FailureKind::Rejected => write!(f, "rejected"),
        }
    }
}

/// Result of one candles request
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(Vec<RawCandle>),
    Failure { kind: FailureKind, message: String },
}

impl FetchOutcome {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        FetchOutcome::Failure {
            kind: FailureKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        FetchOutcome::Failure {
            kind: FailureKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        FetchOutcome::Failure {
            kind: FailureKind::Rejected,
            message: message.into(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            FetchOutcome::Failure {
                kind: FailureKind::RateLimited,
                ..
            }
        )
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// True when an error message reports throttling ("Rate limit exceeded",
/// "Public rate limit exceeded", ...)
pub fn is_rate_limit_message(message: &str) -> bool {
    message.to_lowercase().contains("rate limit")
}

/// Classify a candles response by HTTP status and body.
///
/// HTTP 429 and 5xx are retryable whatever the body looks like. Otherwise a
/// JSON array is a row collection and a JSON object carrying `message` is an
/// error payload. Any other body is malformed.
pub fn classify_response(status: u16, body: &str) -> Result<FetchOutcome> {
    if status == 429 || (500..600).contains(&status) {
        let message = error_message(body);
        if status == 429 || is_rate_limit_message(&message) {
            return Ok(FetchOutcome::rate_limited(message));
        }
        return Ok(FetchOutcome::unavailable(format!("HTTP {}: {}", status, message)));
    }

    let value: Value = serde_json::from_str(body).map_err(|e| {
        PullError::MalformedRow(format!("HTTP {} with non-JSON body ({}): {}", status, e, preview(body)))
    })?;

    match value {
        Value::Array(_) => {
            let rows: Vec<RawCandle> = serde_json::from_value(value)?;
            Ok(FetchOutcome::Success(rows))
        }
        Value::Object(_) => {
            let error: ErrorBody = serde_json::from_value(value).map_err(|_| {
                PullError::MalformedRow(format!("HTTP {} with unexpected object: {}", status, preview(body)))
            })?;

            if is_rate_limit_message(&error.message) {
                Ok(FetchOutcome::rate_limited(error.message))
            } else {
                Ok(FetchOutcome::rejected(error.message))
            }
        }
        _ => Err(PullError::MalformedRow(format!(
            "HTTP {} with unexpected body: {}",
            status,
            preview(body)
        ))),
    }
}

/// `message` of a JSON error payload, or a preview of the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|error| error.message)
        .unwrap_or_else(|_| preview(body))
}

fn preview(body: &str) -> String {
    if body.len() > 200 {
        let cut = body.char_indices().nth(200).map(|(i, _)| i).unwrap_or(body.len());
        format!("{}... (truncated)", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_success() {
        let body = "[[1609459260, 1.0, 2.0, 1.5, 1.8, 10.0], [1609459200, 1.1, 2.1, 1.6, 1.9, 11.0]]";
        let outcome = classify_response(200, body).unwrap();
        match outcome {
            FetchOutcome::Success(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].epoch(), 1_609_459_260);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_single_row_is_still_success() {
        let outcome = classify_response(200, "[[1609459200, 1.0, 2.0, 1.5, 1.8, 10.0]]").unwrap();
        assert!(matches!(outcome, FetchOutcome::Success(ref rows) if rows.len() == 1));
    }

    #[test]
    fn test_empty_array_is_success() {
        assert_eq!(classify_response(200, "[]").unwrap(), FetchOutcome::Success(Vec::new()));
    }

    #[test]
    fn test_rate_limit_by_message() {
        let outcome = classify_response(200, r#"{"message":"Rate limit exceeded"}"#).unwrap();
        assert!(outcome.is_rate_limited());

        let outcome = classify_response(400, r#"{"message":"Public rate limit exceeded"}"#).unwrap();
        assert!(outcome.is_rate_limited());
    }

    #[test]
    fn test_rate_limit_by_status() {
        let outcome = classify_response(429, r#"{"message":"Too many requests"}"#).unwrap();
        assert_eq!(outcome, FetchOutcome::rate_limited("Too many requests"));
    }

    #[test]
    fn test_rate_limit_status_with_plain_body() {
        let outcome = classify_response(429, "Too Many Requests").unwrap();
        assert_eq!(outcome, FetchOutcome::rate_limited("Too Many Requests"));

        let outcome = classify_response(429, "").unwrap();
        assert!(outcome.is_rate_limited());
    }

    #[test]
    fn test_server_errors_are_unavailable() {
        let outcome = classify_response(503, r#"{"message":"Service Unavailable"}"#).unwrap();
        assert_eq!(outcome, FetchOutcome::unavailable("HTTP 503: Service Unavailable"));

        let outcome = classify_response(502, "<html>bad gateway</html>").unwrap();
        assert_eq!(outcome, FetchOutcome::unavailable("HTTP 502: <html>bad gateway</html>"));

        let outcome = classify_response(500, r#"{"message":"Rate limit exceeded"}"#).unwrap();
        assert!(outcome.is_rate_limited());
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(FailureKind::RateLimited.is_retryable());
        assert!(FailureKind::Unavailable.is_retryable());
        assert!(!FailureKind::Rejected.is_retryable());
    }

    #[test]
    fn test_other_error_is_rejected() {
        let outcome = classify_response(404, r#"{"message":"NotFound"}"#).unwrap();
        assert_eq!(outcome, FetchOutcome::rejected("NotFound"));
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(classify_response(200, "<html>ok</html>"), Err(PullError::MalformedRow(_))));
        assert!(matches!(classify_response(200, r#"{"error": 1}"#), Err(PullError::MalformedRow(_))));
        assert!(matches!(classify_response(200, "42"), Err(PullError::MalformedRow(_))));
        assert!(matches!(classify_response(200, r#"[["x"]]"#), Err(PullError::Json(_))));
    }
}
