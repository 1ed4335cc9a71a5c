//! Price series access port trait.

use crate::domain::error::CoinlabError;
use crate::domain::table::PriceTable;

pub trait DataPort {
    /// Full OHLCV history for `ticker`, sorted by timestamp.
    fn fetch_series(&self, ticker: &str) -> Result<PriceTable, CoinlabError>;

    fn list_tickers(&self) -> Result<Vec<String>, CoinlabError>;
}
