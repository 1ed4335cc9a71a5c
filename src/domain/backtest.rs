//! Single-position backtest simulator.
//!
//! State machine over the close column:
//! - FLAT + BUY: enter at the close, remember the entry price
//! - LONG + SELL: exit at the close, balance += close - entry
//! - anything else: no-op (no pyramiding, no shorting)
//!
//! A position still open after the last bar is closed at the last close.
//! Position size is one unit; profit is `final balance - initial balance`.

use chrono::NaiveDateTime;

use crate::domain::error::CoinlabError;
use crate::domain::signal::Signal;
use crate::domain::table::{CLOSE, PriceTable};

pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_time: Option<NaiveDateTime>,
    pub exit_time: Option<NaiveDateTime>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub profit: f64,
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    /// Share of closed trades with positive pnl, 0 when there are none.
    pub fn win_rate(&self) -> f64 {
        if self.trades.is_empty() {
            return 0.0;
        }
        let wins = self.trades.iter().filter(|t| t.is_win()).count();
        wins as f64 / self.trades.len() as f64
    }

    pub fn return_pct(&self) -> f64 {
        if self.initial_balance == 0.0 {
            0.0
        } else {
            self.profit / self.initial_balance * 100.0
        }
    }
}

/// Replay `signals` against `closes`.
pub fn simulate(
    closes: &[f64],
    signals: &[Signal],
    initial_balance: f64,
) -> Result<BacktestResult, CoinlabError> {
    if closes.len() != signals.len() {
        return Err(CoinlabError::invalid_input(format!(
            "signal series has {} values, price series has {}",
            signals.len(),
            closes.len()
        )));
    }

    let mut balance = initial_balance;
    let mut entry: Option<(usize, f64)> = None;
    let mut trades = Vec::new();

    for (i, (&price, &signal)) in closes.iter().zip(signals).enumerate() {
        match (signal, entry) {
            (Signal::Buy, None) => entry = Some((i, price)),
            (Signal::Sell, Some((entry_index, entry_price))) => {
                trades.push(close_trade(entry_index, entry_price, i, price));
                balance += price - entry_price;
                entry = None;
            }
            _ => {}
        }
    }

    if let (Some((entry_index, entry_price)), Some(&last)) = (entry, closes.last()) {
        trades.push(close_trade(entry_index, entry_price, closes.len() - 1, last));
        balance += last - entry_price;
    }

    Ok(BacktestResult {
        initial_balance,
        final_balance: balance,
        profit: balance - initial_balance,
        trades,
    })
}

/// Replay `signals` against the `Close` column of `table`, stamping trades
/// with the table's timestamps.
pub fn run_backtest(
    table: &PriceTable,
    signals: &[Signal],
    initial_balance: f64,
) -> Result<BacktestResult, CoinlabError> {
    let closes = table.column(CLOSE)?;
    let mut result = simulate(closes, signals, initial_balance)?;

    let index = table.index();
    for trade in &mut result.trades {
        trade.entry_time = index.get(trade.entry_index).copied();
        trade.exit_time = index.get(trade.exit_index).copied();
    }
    Ok(result)
}

fn close_trade(entry_index: usize, entry_price: f64, exit_index: usize, exit_price: f64) -> Trade {
    Trade {
        entry_index,
        exit_index,
        entry_time: None,
        exit_time: None,
        entry_price,
        exit_price,
        pnl: exit_price - entry_price,
    }
}
