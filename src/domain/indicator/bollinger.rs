//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//! - Width: (Upper - Lower) / Middle × 100
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use super::rolling::{rolling_mean, rolling_std, safe_div};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT_X100: u32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerOutput {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub middle: Vec<f64>,
    pub width: Vec<f64>,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, stddev_mult_x100: u32) -> BollingerOutput {
    let mult = stddev_mult_x100 as f64 / 100.0;
    let middle = rolling_mean(closes, period);
    let stddev = rolling_std(closes, period);

    let upper: Vec<f64> = middle.iter().zip(&stddev).map(|(m, s)| m + mult * s).collect();
    let lower: Vec<f64> = middle.iter().zip(&stddev).map(|(m, s)| m - mult * s).collect();
    let width = upper
        .iter()
        .zip(&lower)
        .zip(&middle)
        .map(|((u, l), m)| safe_div(u - l, *m) * 100.0)
        .collect();

    BollingerOutput {
        upper,
        lower,
        middle,
        width,
    }
}
