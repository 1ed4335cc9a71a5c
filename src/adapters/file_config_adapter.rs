//! INI file configuration adapter.
//!
//! Section and key names are case-sensitive so that parameter keys such as
//! `MACD_fast` survive unchanged, and entries keep their file order.

use crate::domain::error::CoinlabError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CoinlabError> {
        let path = path.as_ref();
        let mut config = Ini::new_cs();
        config.load(path).map_err(|reason| CoinlabError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, CoinlabError> {
        let mut config = Ini::new_cs();
        config
            .read(content.to_string())
            .map_err(|reason| CoinlabError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_section(&self, section: &str) -> Vec<(String, String)> {
        self.config
            .get_map_ref()
            .get(section)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
dir = ./data
symbol = BTC-USD

[backtest]
initial_balance = 10000.0
metric = profit

[optimizer]
strategy = grid
n_iter = 25
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_string("data", "dir"), Some("./data".to_string()));
        assert_eq!(
            adapter.get_string("data", "symbol"),
            Some("BTC-USD".to_string())
        );
        assert_eq!(adapter.get_int("optimizer", "n_iter", 0), 25);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_balance = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let adapter =
            FileConfigAdapter::from_string("[ranges]\nMACD_fast = 7,12\n").unwrap();
        assert_eq!(
            adapter.get_string("ranges", "MACD_fast"),
            Some("7,12".to_string())
        );
        assert_eq!(adapter.get_string("ranges", "macd_fast"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing_or_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[optimizer]\nn_iter = abc\n").unwrap();
        assert_eq!(adapter.get_int("optimizer", "n_iter", 42), 42);
        assert_eq!(adapter.get_int("optimizer", "seed", 7), 7);
    }

    #[test]
    fn get_double_returns_value_or_default() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_balance = 100000.5\n").unwrap();
        assert_eq!(
            adapter.get_double("backtest", "initial_balance", 0.0),
            100000.5
        );
        assert_eq!(adapter.get_double("backtest", "missing", 99.9), 99.9);
    }

    #[test]
    fn comment_lines_are_skipped() {
        let adapter = FileConfigAdapter::from_string(
            "[optimizer]\n; grid or random\nstrategy = random\n# fixed for reproducible runs\nseed = 42\n",
        )
        .unwrap();
        assert_eq!(
            adapter.get_string("optimizer", "strategy"),
            Some("random".to_string())
        );
        assert_eq!(adapter.get_int("optimizer", "seed", 0), 42);
        assert_eq!(adapter.get_section("optimizer").len(), 2);
    }

    #[test]
    fn get_section_keeps_file_order() {
        let content = "[ranges]\nSMA = 10,20\nRSI = 7..=21:7\nBB = 20\n";
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        let keys: Vec<String> = adapter
            .get_section("ranges")
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["SMA", "RSI", "BB"]);
        assert!(adapter.get_section("missing").is_empty());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[data]\ndir = /srv/prices\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "dir"),
            Some("/srv/prices".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(CoinlabError::ConfigParse { .. })));
    }
}
