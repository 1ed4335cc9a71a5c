//! Domain error types.

/// Top-level error type for coinlab.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoinlabError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("missing column {column}")]
    MissingColumn { column: String },

    #[error("unknown indicator: {name}")]
    UnknownIndicator { name: String },

    #[error("unknown metric: {name}")]
    UnknownMetric { name: String },

    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("io error: {reason}")]
    Io { reason: String },
}

impl CoinlabError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        CoinlabError::MissingColumn {
            column: column.into(),
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        CoinlabError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Errors caused by the data of a single trial rather than by the search setup.
    pub fn is_trial_local(&self) -> bool {
        matches!(
            self,
            CoinlabError::MissingColumn { .. } | CoinlabError::InvalidInput { .. }
        )
    }
}

impl From<std::io::Error> for CoinlabError {
    fn from(err: std::io::Error) -> Self {
        CoinlabError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<&CoinlabError> for std::process::ExitCode {
    fn from(err: &CoinlabError) -> Self {
        let code: u8 = match err {
            CoinlabError::Io { .. } => 1,
            CoinlabError::ConfigParse { .. }
            | CoinlabError::ConfigMissing { .. }
            | CoinlabError::ConfigInvalid { .. } => 2,
            CoinlabError::Data { .. } => 3,
            CoinlabError::UnknownIndicator { .. }
            | CoinlabError::UnknownMetric { .. }
            | CoinlabError::Configuration { .. } => 4,
            CoinlabError::InvalidInput { .. } | CoinlabError::MissingColumn { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            CoinlabError::missing_column("SMA_20").to_string(),
            "missing column SMA_20"
        );
        assert_eq!(
            CoinlabError::UnknownIndicator {
                name: "FOO".into()
            }
            .to_string(),
            "unknown indicator: FOO"
        );
        assert_eq!(
            CoinlabError::ConfigMissing {
                section: "ranges".into(),
                key: "SMA".into()
            }
            .to_string(),
            "missing config key [ranges] SMA"
        );
    }

    #[test]
    fn trial_local_classification() {
        assert!(CoinlabError::missing_column("x").is_trial_local());
        assert!(CoinlabError::invalid_input("x").is_trial_local());
        assert!(
            !CoinlabError::UnknownIndicator {
                name: "x".into()
            }
            .is_trial_local()
        );
        assert!(
            !CoinlabError::Configuration {
                reason: "x".into()
            }
            .is_trial_local()
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CoinlabError = io.into();
        assert!(matches!(err, CoinlabError::Io { .. }));
    }
}
