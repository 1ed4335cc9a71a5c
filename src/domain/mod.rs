//! Core domain types and logic.

pub mod ohlcv;
pub mod table;
pub mod params;
pub mod indicator;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod optimizer;
pub mod summary;
pub mod universe;
pub mod config_validation;
pub mod error;
