//! Report generation port trait.

use crate::domain::error::CoinlabError;
use crate::domain::optimizer::OptimizationResult;
use crate::domain::table::PriceTable;

/// One row of a multi-indicator or multi-coin optimization summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub grid: OptimizationResult,
    pub random: Option<OptimizationResult>,
}

/// Port for writing optimization reports and derived tables.
pub trait ReportPort {
    /// One row per trial, in evaluation order.
    fn write_trials(&self, result: &OptimizationResult, output_path: &str) -> Result<(), CoinlabError>;

    /// One row per summary entry with the best parameters and scores.
    fn write_summary(&self, rows: &[SummaryRow], output_path: &str) -> Result<(), CoinlabError>;

    /// The timestamp index followed by every column of `table`.
    fn write_table(&self, table: &PriceTable, output_path: &str) -> Result<(), CoinlabError>;
}
