//! gdax-history: chunked historical candle pulls from the GDAX / Coinbase Exchange API
//!
//! The public candles endpoint caps every response (300 rows) and throttles
//! aggressive callers, so a long date range has to be cut into many small
//! requests. This crate provides:
//!
//! - **Range Planner**: splits a date range into evenly spaced chunk boundaries
//! - **Chunked Fetcher**: one request per chunk, bounded backoff on rate limits
//! - **Exchange Client**: `reqwest` wrapper around the public candles endpoint
//! - **Data**: candle types, the combined ascending dataset, JSON-lines export
//!
//! # Example
//!
//! ```no_run
//! use gdax_history::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = PullConfig::from_env()?;
//!     let client = GdaxClient::new(&config)?;
//!     let fetcher = ChunkedFetcher::from_config(client, &config);
//!     let dataset = fetcher
//!         .fetch_range("BTC-USD", "2021-01-01", "2021-01-02", Granularity::OneMinute)
//!         .await?;
//!     println!("{} candles", dataset.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod exchange;
pub mod fetch;
pub mod planner;

// Re-export commonly used types
pub mod prelude {
    pub use crate::config::*;
    pub use crate::data::*;
    pub use crate::error::{PullError, Result};
    pub use crate::exchange::*;
    pub use crate::fetch::*;
    pub use crate::planner::*;
}

pub use error::{PullError, Result};
