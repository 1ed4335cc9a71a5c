//! Volume-based indicators: Volume Oscillator and Chaikin Money Flow.

use super::rolling::{rolling_mean, rolling_sum, safe_div};

/// (SMA(short) of volume - SMA(long) of volume) / SMA(long) of volume
pub fn calculate_volume_oscillator(volumes: &[f64], short: usize, long: usize) -> Vec<f64> {
    let short_avg = rolling_mean(volumes, short);
    let long_avg = rolling_mean(volumes, long);
    short_avg
        .iter()
        .zip(&long_avg)
        .map(|(s, l)| safe_div(s - l, *l))
        .collect()
}

/// Chaikin Money Flow over `period` bars.
///
/// Multiplier = ((C - L) - (H - C)) / (H - L), taken as 0 when H == L.
/// CMF = sum(multiplier × V) / sum(V).
pub fn calculate_cmf(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    volumes: &[f64],
    period: usize,
) -> Vec<f64> {
    let flow_volume: Vec<f64> = (0..closes.len())
        .map(|i| {
            let range = highs[i] - lows[i];
            let multiplier = if range == 0.0 {
                0.0
            } else {
                ((closes[i] - lows[i]) - (highs[i] - closes[i])) / range
            };
            multiplier * volumes[i]
        })
        .collect();

    let flow_sum = rolling_sum(&flow_volume, period);
    let volume_sum = rolling_sum(volumes, period);
    flow_sum
        .iter()
        .zip(&volume_sum)
        .map(|(f, v)| safe_div(*f, *v))
        .collect()
}
