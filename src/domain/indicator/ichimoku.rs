//! Ichimoku cloud components (without the forward displacement).
//!
//! Conversion line = (HH(9) + LL(9)) / 2
//! Base line = (HH(26) + LL(26)) / 2
//! Span A = (conversion + base) / 2
//! Span B = (HH(52) + LL(52)) / 2

use super::rolling::{rolling_max, rolling_min};

pub const DEFAULT_CONVERSION: usize = 9;
pub const DEFAULT_BASE: usize = 26;
pub const DEFAULT_SPAN_B: usize = 52;

#[derive(Debug, Clone, PartialEq)]
pub struct IchimokuOutput {
    pub span_a: Vec<f64>,
    pub span_b: Vec<f64>,
    pub base_line: Vec<f64>,
    pub conversion_line: Vec<f64>,
}

fn midpoint(highs: &[f64], lows: &[f64], period: usize) -> Vec<f64> {
    rolling_max(highs, period)
        .iter()
        .zip(rolling_min(lows, period))
        .map(|(h, l)| 0.5 * (h + l))
        .collect()
}

pub fn calculate_ichimoku(
    highs: &[f64],
    lows: &[f64],
    conversion: usize,
    base: usize,
    span_b: usize,
) -> IchimokuOutput {
    let conversion_line = midpoint(highs, lows, conversion);
    let base_line = midpoint(highs, lows, base);
    let span_a = conversion_line
        .iter()
        .zip(&base_line)
        .map(|(c, b)| 0.5 * (c + b))
        .collect();

    IchimokuOutput {
        span_a,
        span_b: midpoint(highs, lows, span_b),
        base_line,
        conversion_line,
    }
}
