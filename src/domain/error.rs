//! Domain error types.

/// Why a single input row was rejected by the normalizer.
///
/// Row errors are never fatal; they are tallied in [`DropCounts`](crate::domain::normalizer::DropCounts).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("missing product reference")]
    MissingProduct,

    #[error("missing or unknown date")]
    MissingDate,

    #[error("malformed date: {value:?}")]
    MalformedDate { value: String },

    #[error("malformed quantity: {value:?}")]
    MalformedQuantity { value: String },
}

/// Top-level error type for replenish.
#[derive(Debug, thiserror::Error)]
pub enum ReplenishError {
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

    #[error("insufficient history: dataset spans {span_days} days, window needs {window_size}")]
    InsufficientHistory { span_days: i64, window_size: usize },

    #[error("no valid observations in source data")]
    NoObservations,

    #[error("source error: {reason}")]
    Source { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReplenishError {
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ReplenishError::ConfigParse { .. }
                | ReplenishError::ConfigMissing { .. }
                | ReplenishError::ConfigInvalid { .. }
        )
    }
}

impl From<&ReplenishError> for std::process::ExitCode {
    fn from(err: &ReplenishError) -> Self {
        let code: u8 = match err {
            ReplenishError::Io(_) => 1,
            ReplenishError::ConfigParse { .. }
            | ReplenishError::ConfigMissing { .. }
            | ReplenishError::ConfigInvalid { .. } => 2,
            ReplenishError::Source { .. } | ReplenishError::Report { .. } => 3,
            ReplenishError::InsufficientHistory { .. } | ReplenishError::NoObservations => 5,
        };
        std::process::ExitCode::from(code)
    }
}
