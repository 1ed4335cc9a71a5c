//! Configuration validation and loading for optimizer runs.
//!
//! Sections:
//! - `[data]`: `dir`, `symbol`
//! - `[backtest]`: `initial_balance`, `metric`
//! - `[optimizer]`: `strategy` (grid|random), `n_iter`, `seed`, `indicators`
//! - `[ranges]`: `key = range expression`, in file order

use crate::domain::backtest::DEFAULT_INITIAL_BALANCE;
use crate::domain::error::CoinlabError;
use crate::domain::indicator::IndicatorKind;
use crate::domain::metrics::Metric;
use crate::domain::optimizer::{DEFAULT_RANDOM_ITERATIONS, SearchStrategy};
use crate::domain::params::ParamRanges;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub data_dir: Option<String>,
    pub symbol: Option<String>,
    pub initial_balance: f64,
    pub metric: Metric,
    pub strategy: SearchStrategy,
    pub indicators: Vec<String>,
    pub ranges: ParamRanges,
}

impl OptimizerConfig {
    /// Validate, then read every optimizer setting, applying defaults.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, CoinlabError> {
        validate_optimizer_config(config)?;

        Ok(Self {
            data_dir: non_empty(config.get_string("data", "dir")),
            symbol: non_empty(config.get_string("data", "symbol")),
            initial_balance: config.get_double("backtest", "initial_balance", DEFAULT_INITIAL_BALANCE),
            metric: parse_metric(config)?,
            strategy: parse_strategy(config)?,
            indicators: parse_indicators(config)?,
            ranges: parse_ranges(config)?,
        })
    }
}

pub fn validate_optimizer_config(config: &dyn ConfigPort) -> Result<(), CoinlabError> {
    validate_initial_balance(config)?;
    parse_metric(config)?;
    parse_strategy(config)?;
    parse_indicators(config)?;
    parse_ranges(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> CoinlabError {
    CoinlabError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), CoinlabError> {
    let Some(raw) = non_empty(config.get_string("backtest", "initial_balance")) else {
        return Ok(());
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(()),
        _ => Err(invalid(
            "backtest",
            "initial_balance",
            "initial_balance must be a non-negative number",
        )),
    }
}

fn parse_metric(config: &dyn ConfigPort) -> Result<Metric, CoinlabError> {
    match non_empty(config.get_string("backtest", "metric")) {
        None => Ok(Metric::default()),
        Some(name) => name
            .parse()
            .map_err(|e: CoinlabError| invalid("backtest", "metric", e.to_string())),
    }
}

fn parse_strategy(config: &dyn ConfigPort) -> Result<SearchStrategy, CoinlabError> {
    let name = non_empty(config.get_string("optimizer", "strategy"))
        .unwrap_or_else(|| "grid".to_string())
        .to_lowercase();

    match name.as_str() {
        "grid" => Ok(SearchStrategy::Grid),
        "random" => {
            let n_iter = config.get_int("optimizer", "n_iter", DEFAULT_RANDOM_ITERATIONS as i64);
            if n_iter <= 0 {
                return Err(invalid("optimizer", "n_iter", "n_iter must be positive"));
            }
            let seed = match non_empty(config.get_string("optimizer", "seed")) {
                None => None,
                Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                    invalid("optimizer", "seed", "seed must be a non-negative integer")
                })?),
            };
            Ok(SearchStrategy::Random {
                n_iter: n_iter as usize,
                seed,
            })
        }
        other => Err(invalid(
            "optimizer",
            "strategy",
            format!("unknown strategy '{}', expected grid or random", other),
        )),
    }
}

fn parse_indicators(config: &dyn ConfigPort) -> Result<Vec<String>, CoinlabError> {
    let Some(raw) = non_empty(config.get_string("optimizer", "indicators")) else {
        return Ok(Vec::new());
    };

    let mut names = Vec::new();
    for token in raw.split(',') {
        let name = token.trim();
        if name.is_empty() {
            return Err(invalid("optimizer", "indicators", "empty indicator name"));
        }
        IndicatorKind::from_name(name)
            .map_err(|e| invalid("optimizer", "indicators", e.to_string()))?;
        names.push(name.to_string());
    }
    Ok(names)
}

fn parse_ranges(config: &dyn ConfigPort) -> Result<ParamRanges, CoinlabError> {
    let section = config.get_section("ranges");
    ParamRanges::from_pairs(section.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}
