//! Exchange integration module
//!
//! The candle fetch capability and its GDAX / Coinbase Exchange client.

pub mod client;
pub mod response;
pub mod source;

pub use client::*;
pub use response::*;
pub use source::*;
