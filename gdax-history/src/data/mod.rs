//! Data module
//!
//! Candle rows as returned by the exchange, the combined dataset a pull
//! produces, and the hand-off to storage.

pub mod candle;
pub mod dataset;
pub mod granularity;
pub mod storage;

pub use candle::*;
pub use dataset::*;
pub use granularity::*;
pub use storage::*;
