//! Heikin-Ashi candle reconstruction.
//!
//! HA_Close = (O + H + L + C) / 4
//! HA_Open[0] = (O[0] + C[0]) / 2, HA_Open[i] = (HA_Open[i-1] + HA_Close[i-1]) / 2
//! HA_High = max(H, HA_Open, HA_Close), HA_Low = min(L, HA_Open, HA_Close)

#[derive(Debug, Clone, PartialEq)]
pub struct HeikinAshiOutput {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

pub fn calculate_heikin_ashi(
    opens: &[f64],
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
) -> HeikinAshiOutput {
    let n = closes.len();
    let mut out = HeikinAshiOutput {
        open: Vec::with_capacity(n),
        high: Vec::with_capacity(n),
        low: Vec::with_capacity(n),
        close: Vec::with_capacity(n),
    };

    for i in 0..n {
        let ha_close = (opens[i] + highs[i] + lows[i] + closes[i]) / 4.0;
        let ha_open = if i == 0 {
            (opens[0] + closes[0]) / 2.0
        } else {
            (out.open[i - 1] + out.close[i - 1]) / 2.0
        };
        out.high.push(highs[i].max(ha_open).max(ha_close));
        out.low.push(lows[i].min(ha_open).min(ha_close));
        out.open.push(ha_open);
        out.close.push(ha_close);
    }
    out
}
