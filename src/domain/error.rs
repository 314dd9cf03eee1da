//! Domain error types.
//!
//! The indicator engine and the backtest simulator are total; every variant
//! here originates in ingestion, configuration, output, or the defensive
//! [`BarSeries`](crate::domain::ohlcv::BarSeries) constructor.

/// Top-level error type for sisp.
#[derive(Debug, thiserror::Error)]
pub enum SispError {
    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("failed to parse CSV: {reason}")]
    Parse { reason: String },

    #[error("CSV missing required columns: {missing:?}. Found: {found:?}")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("no date/time column found in CSV")]
    NoDateColumn,

    #[error("some dates could not be parsed. Examples: {examples:?}")]
    UnparseableDates { examples: Vec<String> },

    #[error("not enough data: {bars} rows, need >= {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("invalid input at row {row}: {reason}")]
    InvalidInput { row: usize, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to write output: {reason}")]
    Output { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SispError {
    /// Process exit status for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            SispError::Io(_) => 1,
            SispError::ConfigParse { .. } | SispError::ConfigInvalid { .. } => 2,
            SispError::FileTooLarge { .. }
            | SispError::Parse { .. }
            | SispError::MissingColumns { .. }
            | SispError::NoDateColumn
            | SispError::UnparseableDates { .. } => 3,
            SispError::InvalidInput { .. } | SispError::InsufficientData { .. } => 4,
            SispError::Output { .. } => 5,
        }
    }
}

impl From<&SispError> for std::process::ExitCode {
    fn from(err: &SispError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
