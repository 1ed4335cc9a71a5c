//! Simple and exponential moving averages.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]); first (n-1) values undefined.
//!
//! EMA uses k = 2/(n+1), seeded with the first close (no bias adjustment):
//! EMA[0] = C[0], EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! The first (n-1) values are masked as undefined.

use super::rolling::{ewm, rolling_mean};

pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(closes, period)
}

pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; closes.len()];
    }
    let k = 2.0 / (period as f64 + 1.0);
    ewm(closes, k, period)
}
