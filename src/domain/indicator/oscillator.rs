//! Range-bounded oscillators: Stochastic, Williams %R and CCI.
//!
//! Stochastic %K = 100 × (C - LL(n)) / (HH(n) - LL(n)), %D = SMA(smooth) of %K.
//! Williams %R = -100 × (HH(n) - C) / (HH(n) - LL(n)).
//! CCI = (TP - SMA(n) of TP) / (0.015 × mean absolute deviation of TP).
//!
//! A flat window (zero range or zero deviation) yields an undefined value.

use super::rolling::{rolling_max, rolling_mean, rolling_mean_abs_dev, rolling_min, safe_div};
use crate::domain::ohlcv::typical_price;

pub const DEFAULT_SMOOTH: usize = 3;
const CCI_CONSTANT: f64 = 0.015;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticOutput {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    smooth: usize,
) -> StochasticOutput {
    let highest = rolling_max(highs, period);
    let lowest = rolling_min(lows, period);

    let k: Vec<f64> = (0..closes.len())
        .map(|i| 100.0 * safe_div(closes[i] - lowest[i], highest[i] - lowest[i]))
        .collect();
    let d = rolling_mean(&k, smooth);

    StochasticOutput { k, d }
}

pub fn calculate_williams_r(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let highest = rolling_max(highs, period);
    let lowest = rolling_min(lows, period);

    (0..closes.len())
        .map(|i| -100.0 * safe_div(highest[i] - closes[i], highest[i] - lowest[i]))
        .collect()
}

pub fn calculate_cci(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let tp: Vec<f64> = (0..closes.len())
        .map(|i| typical_price(highs[i], lows[i], closes[i]))
        .collect();
    let tp_mean = rolling_mean(&tp, period);
    let mad = rolling_mean_abs_dev(&tp, period);

    (0..tp.len())
        .map(|i| safe_div(tp[i] - tp_mean[i], CCI_CONSTANT * mad[i]))
        .collect()
}
