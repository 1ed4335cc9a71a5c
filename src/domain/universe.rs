//! Coin universe: coin symbol to price-series ticker lookup, and data
//! validation for multi-coin runs.
//!
//! The lookup is built explicitly and never mutated afterwards; callers pass
//! it to whatever needs ticker resolution.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::domain::error::CoinlabError;
use crate::ports::data_port::DataPort;

pub const MIN_BARS: usize = 30;

const TIER1: [(&str, &str); 11] = [
    ("BTC", "BTC-USD"),
    ("ETH", "ETH-USD"),
    ("BNB", "BNB-USD"),
    ("SOL", "SOL-USD"),
    ("ADA", "ADA-USD"),
    ("AVAX", "AVAX-USD"),
    ("DOT", "DOT-USD"),
    ("LINK", "LINK-USD"),
    ("MATIC", "MATIC-USD"),
    ("UNI", "UNI-USD"),
    ("LTC", "LTC-USD"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMap {
    entries: Vec<(String, String)>,
}

impl SymbolMap {
    /// The default large-cap universe.
    pub fn tier1() -> Self {
        Self::from_pairs(TIER1)
    }

    pub fn from_pairs<I, C, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, T)>,
        C: Into<String>,
        T: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (coin, ticker) in pairs {
            let coin = coin.into().to_uppercase();
            let ticker = ticker.into();
            match entries.iter_mut().find(|(c, _)| *c == coin) {
                Some(entry) => entry.1 = ticker,
                None => entries.push((coin, ticker)),
            }
        }
        Self { entries }
    }

    /// Ticker for `coin`; unknown coins map to `{COIN}-USD`.
    pub fn resolve(&self, coin: &str) -> String {
        let coin = coin.trim().to_uppercase();
        self.entries
            .iter()
            .find(|(c, _)| *c == coin)
            .map(|(_, ticker)| ticker.clone())
            .unwrap_or_else(|| format!("{}-USD", coin))
    }

    pub fn contains(&self, coin: &str) -> bool {
        let coin = coin.trim().to_uppercase();
        self.entries.iter().any(|(c, _)| *c == coin)
    }

    pub fn coins(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum UniverseError {
    #[error("empty token in coin list")]
    EmptyToken,

    #[error("duplicate coin: {0}")]
    DuplicateCoin(String),
}

impl From<UniverseError> for CoinlabError {
    fn from(err: UniverseError) -> Self {
        CoinlabError::Configuration {
            reason: err.to_string(),
        }
    }
}

/// Parse a comma-separated coin list, uppercased, rejecting blanks and duplicates.
pub fn parse_coins(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut coins = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let coin = trimmed.to_uppercase();
        if !seen.insert(coin.clone()) {
            return Err(UniverseError::DuplicateCoin(coin));
        }
        coins.push(coin);
    }

    Ok(coins)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCoin {
    pub coin: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct UniverseValidationResult {
    /// `(coin, ticker)` pairs with enough data, in input order.
    pub valid: Vec<(String, String)>,
    pub skipped: Vec<SkippedCoin>,
}

/// Keep the coins whose series has at least `min_bars` rows.
pub fn validate_universe(
    data_port: &dyn DataPort,
    symbols: &SymbolMap,
    coins: Vec<String>,
    min_bars: usize,
) -> Result<UniverseValidationResult, CoinlabError> {
    let mut valid = Vec::new();
    let mut skipped = Vec::new();

    for coin in coins {
        let ticker = symbols.resolve(&coin);
        let rows = match data_port.fetch_series(&ticker) {
            Ok(table) => table.len(),
            Err(e) => {
                warn!(%coin, %ticker, error = %e, "Skipping coin");
                skipped.push(SkippedCoin {
                    coin,
                    reason: SkipReason::NoData,
                });
                continue;
            }
        };

        if rows == 0 {
            warn!(%coin, %ticker, "Skipping coin, no data found");
            skipped.push(SkippedCoin {
                coin,
                reason: SkipReason::NoData,
            });
            continue;
        }

        if rows < min_bars {
            warn!(%coin, bars = rows, minimum = min_bars, "Skipping coin, not enough bars");
            skipped.push(SkippedCoin {
                coin,
                reason: SkipReason::InsufficientBars { bars: rows },
            });
            continue;
        }

        info!(%coin, bars = rows, "Coin OK");
        valid.push((coin, ticker));
    }

    if valid.is_empty() {
        return Err(CoinlabError::Data {
            reason: format!("no coin has at least {} bars", min_bars),
        });
    }

    Ok(UniverseValidationResult { valid, skipped })
}
