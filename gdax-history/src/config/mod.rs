//! Configuration module

pub mod pull;

pub use pull::*;
