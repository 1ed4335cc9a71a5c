//! CSV report adapter for optimization results.

use std::collections::BTreeSet;

use crate::domain::error::CoinlabError;
use crate::domain::optimizer::OptimizationResult;
use crate::domain::table::PriceTable;
use crate::ports::report_port::{ReportPort, SummaryRow};

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn report_error(path: &str, err: impl std::fmt::Display) -> CoinlabError {
    CoinlabError::Io {
        reason: format!("failed to write {}: {}", path, err),
    }
}

fn format_score(score: Option<f64>) -> String {
    score.map(|s| s.to_string()).unwrap_or_default()
}

/// Undefined values are written as empty cells.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_trials(&self, result: &OptimizationResult, output_path: &str) -> Result<(), CoinlabError> {
        let keys: BTreeSet<&str> = result
            .trials
            .iter()
            .flat_map(|t| t.params.iter().map(|(k, _)| k))
            .collect();

        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| report_error(output_path, e))?;

        let mut header: Vec<&str> = vec!["trial"];
        header.extend(keys.iter().copied());
        header.extend(["score", "best", "failure"]);
        wtr.write_record(&header)
            .map_err(|e| report_error(output_path, e))?;

        for (i, trial) in result.trials.iter().enumerate() {
            let mut row = vec![i.to_string()];
            row.extend(
                keys.iter()
                    .map(|k| trial.params.get(k).map(|v| v.to_string()).unwrap_or_default()),
            );
            row.push(trial.score.to_string());
            row.push((result.best == Some(i)).to_string());
            row.push(trial.failure.clone().unwrap_or_default());
            wtr.write_record(&row)
                .map_err(|e| report_error(output_path, e))?;
        }

        wtr.flush().map_err(|e| report_error(output_path, e))
    }

    fn write_summary(&self, rows: &[SummaryRow], output_path: &str) -> Result<(), CoinlabError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| report_error(output_path, e))?;

        wtr.write_record([
            "label",
            "grid_params",
            "grid_score",
            "random_params",
            "random_score",
        ])
        .map_err(|e| report_error(output_path, e))?;

        for row in rows {
            let random_params = row
                .random
                .as_ref()
                .and_then(|r| r.best_params())
                .map(|p| p.to_string())
                .unwrap_or_default();
            let random_score = row.random.as_ref().and_then(|r| r.best_score());

            wtr.write_record([
                row.label.clone(),
                row.grid
                    .best_params()
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
                format_score(row.grid.best_score()),
                random_params,
                format_score(random_score),
            ])
            .map_err(|e| report_error(output_path, e))?;
        }

        wtr.flush().map_err(|e| report_error(output_path, e))
    }

    fn write_table(&self, table: &PriceTable, output_path: &str) -> Result<(), CoinlabError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| report_error(output_path, e))?;

        let mut header = vec!["Date"];
        header.extend(table.column_names());
        wtr.write_record(&header)
            .map_err(|e| report_error(output_path, e))?;

        for (row, ts) in table.index().iter().enumerate() {
            let mut record = vec![ts.format("%Y-%m-%d %H:%M:%S").to_string()];
            record.extend(
                table
                    .columns()
                    .iter()
                    .map(|c| format_value(c.values[row])),
            );
            wtr.write_record(&record)
                .map_err(|e| report_error(output_path, e))?;
        }

        wtr.flush().map_err(|e| report_error(output_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::optimizer::Trial;
    use crate::domain::params::ParamSet;
    use tempfile::TempDir;

    fn sample_result() -> OptimizationResult {
        OptimizationResult {
            trials: vec![
                Trial {
                    params: ParamSet::new().with("SMA", 10).with("RSI", 7),
                    score: 12.5,
                    failure: None,
                },
                Trial {
                    params: ParamSet::new().with("SMA", 20).with("RSI", 7),
                    score: 0.0,
                    failure: Some("missing column SMA_20".into()),
                },
            ],
            best: Some(0),
        }
    }

    #[test]
    fn write_trials_one_row_per_trial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trials.csv");
        let path = path.to_str().unwrap();

        CsvReportAdapter::new()
            .write_trials(&sample_result(), path)
            .unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "trial,RSI,SMA,score,best,failure");
        assert_eq!(lines[1], "0,7,10,12.5,true,");
        assert_eq!(lines[2], "1,7,20,0,false,missing column SMA_20");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn write_summary_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");
        let path = path.to_str().unwrap();

        let rows = vec![
            SummaryRow {
                label: "SMA".into(),
                grid: sample_result(),
                random: Some(sample_result()),
            },
            SummaryRow {
                label: "RSI".into(),
                grid: OptimizationResult::default(),
                random: None,
            },
        ];
        CsvReportAdapter::new().write_summary(&rows, path).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "label,grid_params,grid_score,random_params,random_score"
        );
        assert_eq!(
            lines[1],
            "SMA,\"{RSI=7, SMA=10}\",12.5,\"{RSI=7, SMA=10}\",12.5"
        );
        assert_eq!(lines[2], "RSI,,,,");
    }

    #[test]
    fn write_table_blanks_undefined_values() {
        use chrono::NaiveDate;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.csv");
        let path = path.to_str().unwrap();

        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let table = PriceTable::new(vec![ts, ts + chrono::Duration::days(1)])
            .with_column("Close", vec![10.0, 11.0])
            .unwrap()
            .with_column("SMA_2", vec![f64::NAN, 10.5])
            .unwrap();
        CsvReportAdapter::new().write_table(&table, path).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Date,Close,SMA_2");
        assert_eq!(lines[1], "2024-05-01 00:00:00,10,");
        assert_eq!(lines[2], "2024-05-02 00:00:00,11,10.5");
    }

    #[test]
    fn write_to_missing_directory_is_io_error() {
        let err = CsvReportAdapter::new()
            .write_trials(&sample_result(), "/nonexistent/dir/out.csv")
            .unwrap_err();
        assert!(matches!(err, CoinlabError::Io { .. }));
    }
}
