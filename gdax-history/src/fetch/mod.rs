//! Chunked retrieval
//!
//! Drives a [`CandleSource`](crate::exchange::CandleSource) over a planned
//! range, one request per chunk, with bounded backoff on rate limits and 5xx responses.

pub mod chunked;
pub mod retry;

pub use chunked::*;
pub use retry::*;
