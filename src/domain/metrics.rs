//! Scalar performance metrics selected from a backtest result.

use std::fmt;
use std::str::FromStr;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::CoinlabError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    #[default]
    Profit,
    FinalBalance,
    ReturnPct,
    WinRate,
    Trades,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Profit,
        Metric::FinalBalance,
        Metric::ReturnPct,
        Metric::WinRate,
        Metric::Trades,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Profit => "profit",
            Metric::FinalBalance => "final_balance",
            Metric::ReturnPct => "return_pct",
            Metric::WinRate => "win_rate",
            Metric::Trades => "trades",
        }
    }

    pub fn score(&self, result: &BacktestResult) -> f64 {
        match self {
            Metric::Profit => result.profit,
            Metric::FinalBalance => result.final_balance,
            Metric::ReturnPct => result.return_pct(),
            Metric::WinRate => result.win_rate(),
            Metric::Trades => result.trade_count() as f64,
        }
    }
}

impl FromStr for Metric {
    type Err = CoinlabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profit" => Ok(Metric::Profit),
            "final_balance" | "balance" => Ok(Metric::FinalBalance),
            "return_pct" | "return" => Ok(Metric::ReturnPct),
            "win_rate" | "winrate" => Ok(Metric::WinRate),
            "trades" => Ok(Metric::Trades),
            _ => Err(CoinlabError::UnknownMetric {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::simulate;
    use crate::domain::signal::Signal;

    #[test]
    fn parse_names_and_aliases() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>().unwrap(), metric);
        }
        assert_eq!("winrate".parse::<Metric>().unwrap(), Metric::WinRate);
        assert_eq!(" Profit ".parse::<Metric>().unwrap(), Metric::Profit);
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(
            "sharpe".parse::<Metric>(),
            Err(CoinlabError::UnknownMetric {
                name: "sharpe".into()
            })
        );
    }

    #[test]
    fn default_is_profit() {
        assert_eq!(Metric::default(), Metric::Profit);
    }

    #[test]
    fn scores_from_result() {
        let result = simulate(
            &[10.0, 12.0, 11.0, 15.0],
            &[Signal::Buy, Signal::Sell, Signal::Buy, Signal::Flat],
            100.0,
        )
        .unwrap();

        assert!((Metric::Profit.score(&result) - 6.0).abs() < 1e-12);
        assert!((Metric::FinalBalance.score(&result) - 106.0).abs() < 1e-12);
        assert!((Metric::ReturnPct.score(&result) - 6.0).abs() < 1e-12);
        assert!((Metric::WinRate.score(&result) - 1.0).abs() < 1e-12);
        assert!((Metric::Trades.score(&result) - 2.0).abs() < 1e-12);
    }
}
