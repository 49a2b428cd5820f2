//! Range planning
//!
//! Splits a requested date range into chunk boundaries small enough for a
//! single candles request.

pub mod range;

pub use range::*;
