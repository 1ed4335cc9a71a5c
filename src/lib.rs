//! coinlab: crypto indicator research, backtesting and parameter search.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;

pub use domain::backtest::{BacktestResult, run_backtest, simulate};
pub use domain::error::CoinlabError;
pub use domain::indicator::compute_indicator;
pub use domain::optimizer::{OptimizationResult, ParameterOptimizer, grid_search, random_search};
