//! Technical summary of the latest bar.
//!
//! Three verdicts are combined into a recommendation:
//! - RSI(14): BUY below 30, SELL above 70
//! - SMA(20) vs SMA(50): BUY when the short average is above the long one
//! - Bollinger(20, 2): SELL at or above the upper band, BUY at or below the lower
//!
//! More BUYs than SELLs gives BUY (STRONG BUY with two or more), and
//! symmetrically for SELL; otherwise HOLD.

use std::fmt;

use crate::domain::error::CoinlabError;
use crate::domain::indicator::{IndicatorType, apply_indicator};
use crate::domain::table::{CLOSE, PriceTable};

const RSI_PERIOD: usize = 14;
const SHORT_MA: usize = 20;
const LONG_MA: usize = 50;
const BB_PERIOD: usize = 20;
const OVERSOLD: f64 = 30.0;
const OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Buy,
    Sell,
    Neutral,
    /// Not enough history to compute the indicator.
    NoData,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Buy => write!(f, "BUY"),
            Verdict::Sell => write!(f, "SELL"),
            Verdict::Neutral => write!(f, "NEUTRAL"),
            Verdict::NoData => write!(f, "NO DATA"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let buys = verdicts.iter().filter(|v| **v == Verdict::Buy).count();
        let sells = verdicts.iter().filter(|v| **v == Verdict::Sell).count();

        if buys > sells {
            if buys >= 2 {
                Recommendation::StrongBuy
            } else {
                Recommendation::Buy
            }
        } else if sells > buys {
            if sells >= 2 {
                Recommendation::StrongSell
            } else {
                Recommendation::Sell
            }
        } else {
            Recommendation::Hold
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::StrongBuy => write!(f, "STRONG BUY"),
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Hold => write!(f, "HOLD"),
            Recommendation::Sell => write!(f, "SELL"),
            Recommendation::StrongSell => write!(f, "STRONG SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TechnicalSummary {
    pub price: f64,
    pub rsi: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub rsi_signal: Verdict,
    pub ma_signal: Verdict,
    pub bb_signal: Verdict,
    pub recommendation: Recommendation,
}

pub fn rsi_verdict(rsi: Option<f64>) -> Verdict {
    match rsi {
        None => Verdict::NoData,
        Some(v) if v < OVERSOLD => Verdict::Buy,
        Some(v) if v > OVERBOUGHT => Verdict::Sell,
        Some(_) => Verdict::Neutral,
    }
}

pub fn ma_verdict(short: Option<f64>, long: Option<f64>) -> Verdict {
    match (short, long) {
        (Some(s), Some(l)) if s > l => Verdict::Buy,
        (Some(s), Some(l)) if s < l => Verdict::Sell,
        (Some(_), Some(_)) => Verdict::Neutral,
        _ => Verdict::NoData,
    }
}

pub fn bb_verdict(price: f64, upper: Option<f64>, lower: Option<f64>) -> Verdict {
    match (upper, lower) {
        (Some(u), _) if price >= u => Verdict::Sell,
        (_, Some(l)) if price <= l => Verdict::Buy,
        (Some(_), Some(_)) => Verdict::Neutral,
        _ => Verdict::NoData,
    }
}

/// Summarise the last bar of `table`. An empty table is `InvalidInput`.
pub fn technical_summary(table: &PriceTable) -> Result<TechnicalSummary, CoinlabError> {
    let price = table
        .column(CLOSE)?
        .last()
        .copied()
        .ok_or_else(|| CoinlabError::invalid_input("cannot summarise an empty series"))?;

    let mut working = table.clone();
    let bollinger = IndicatorType::Bollinger {
        period: BB_PERIOD,
        stddev_mult_x100: 200,
    };
    for indicator in [
        IndicatorType::Rsi(RSI_PERIOD),
        IndicatorType::Sma(SHORT_MA),
        IndicatorType::Sma(LONG_MA),
        bollinger,
    ] {
        apply_indicator(&mut working, &indicator)?;
    }

    let rsi = working.last_value(&format!("RSI_{}", RSI_PERIOD));
    let sma_short = working.last_value(&format!("SMA_{}", SHORT_MA));
    let sma_long = working.last_value(&format!("SMA_{}", LONG_MA));
    let bb_upper = working.last_value(&format!("BB_High_{}", BB_PERIOD));
    let bb_lower = working.last_value(&format!("BB_Low_{}", BB_PERIOD));

    let rsi_signal = rsi_verdict(rsi);
    let ma_signal = ma_verdict(sma_short, sma_long);
    let bb_signal = bb_verdict(price, bb_upper, bb_lower);

    Ok(TechnicalSummary {
        price,
        rsi,
        sma_short,
        sma_long,
        bb_upper,
        bb_lower,
        rsi_signal,
        ma_signal,
        bb_signal,
        recommendation: Recommendation::from_verdicts(&[rsi_signal, ma_signal, bb_signal]),
    })
}
