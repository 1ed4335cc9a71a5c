//! Trading signals derived from indicator columns.
//!
//! Two rules are provided:
//! - [`naive_signals`]: BUY wherever the indicator is above the close, FLAT
//!   otherwise. This is the rule the default optimizer scorer uses.
//! - [`crossover_signals`]: BUY when the close is above the indicator, SELL
//!   when it is below, FLAT when equal or undefined.

use std::fmt;

use crate::domain::error::CoinlabError;
use crate::domain::indicator::macd;
use crate::domain::params::ParamSet;
use crate::domain::table::PriceTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    Buy,
    #[default]
    Flat,
    Sell,
}

impl Signal {
    pub fn as_i8(&self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Flat => 0,
            Signal::Sell => -1,
        }
    }
}

impl From<i8> for Signal {
    /// Positive is BUY, negative is SELL, zero is FLAT.
    fn from(value: i8) -> Self {
        match value.signum() {
            1 => Signal::Buy,
            -1 => Signal::Sell,
            _ => Signal::Flat,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Flat => write!(f, "FLAT"),
            Signal::Sell => write!(f, "SELL"),
        }
    }
}

/// BUY where `indicator > close`; FLAT elsewhere, including undefined rows.
/// Never emits SELL.
pub fn naive_signals(indicator: &[f64], closes: &[f64]) -> Vec<Signal> {
    indicator
        .iter()
        .zip(closes)
        .map(|(&ind, &close)| {
            if ind > close {
                Signal::Buy
            } else {
                Signal::Flat
            }
        })
        .collect()
}

pub fn crossover_signals(closes: &[f64], indicator: &[f64]) -> Vec<Signal> {
    closes
        .iter()
        .zip(indicator)
        .map(|(&close, &ind)| {
            if close > ind {
                Signal::Buy
            } else if close < ind {
                Signal::Sell
            } else {
                Signal::Flat
            }
        })
        .collect()
}

const SIMPLE_KEYS: [&str; 7] = ["SMA", "EMA", "RSI", "CCI", "ATR", "ADX", "WilliamsR"];

/// Find the indicator column the default signal rule reads for `params`.
///
/// Looks up `{key}_{value}` for the single-window keys first, then the
/// Bollinger middle band, the stochastic lines, the MACD line and CMF.
pub fn resolve_signal_column(table: &PriceTable, params: &ParamSet) -> Result<String, CoinlabError> {
    let mut candidates: Vec<String> = SIMPLE_KEYS
        .iter()
        .filter_map(|key| params.get(key).map(|v| format!("{}_{}", key, v)))
        .collect();

    if let Some(bb) = params.get("BB") {
        candidates.push(format!("BB_Mavg_{}", bb));
    }
    if let Some(period) = params.get("Stochastic") {
        candidates.push(format!("STOCH_K_{}", period));
        candidates.push(format!("STOCH_D_{}", period));
    }
    if params.contains("MACD_fast") || params.contains("MACD_slow") {
        candidates.push(format!(
            "MACD_{}_{}",
            params.get_or("MACD_fast", macd::DEFAULT_FAST),
            params.get_or("MACD_slow", macd::DEFAULT_SLOW)
        ));
    }
    if let Some(cmf) = params.get("CMF") {
        candidates.push(format!("CMF_{}", cmf));
    }

    let first = candidates.first().cloned();
    candidates
        .into_iter()
        .find(|name| table.has_column(name))
        .ok_or_else(|| {
            CoinlabError::missing_column(
                first.unwrap_or_else(|| format!("signal column for {}", params)),
            )
        })
}
