//! Domain error types.

/// Top-level error type for candlesim.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("no further candles for {symbol}")]
    DataExhausted { symbol: String },

    #[error("no data available for {symbol}")]
    NoData { symbol: String },

    #[error("order for {symbol} has zero units")]
    ZeroUnits { symbol: String },

    #[error("unknown column {name}")]
    UnknownColumn { name: String },

    #[error("column {name} already exists")]
    DuplicateColumn { name: String },

    #[error("unknown order {id}")]
    UnknownOrder { id: u64 },

    #[error("unknown position {id}")]
    UnknownPosition { id: u64 },

    #[error("orders cannot be cancelled once placed")]
    CancelUnsupported,

    #[error("unknown frequency code {code}")]
    UnknownFrequency { code: String },

    #[error("csv read error: {reason}")]
    Csv { reason: String },

    #[error("csv schema error: {reason}")]
    CsvSchema { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SimError> for std::process::ExitCode {
    fn from(err: &SimError) -> Self {
        let code: u8 = match err {
            SimError::Io(_) => 1,
            SimError::ConfigParse { .. }
            | SimError::ConfigMissing { .. }
            | SimError::ConfigInvalid { .. }
            | SimError::UnknownFrequency { .. } => 2,
            SimError::Csv { .. } | SimError::CsvSchema { .. } => 3,
            SimError::ZeroUnits { .. }
            | SimError::UnknownColumn { .. }
            | SimError::DuplicateColumn { .. }
            | SimError::UnknownOrder { .. }
            | SimError::UnknownPosition { .. }
            | SimError::CancelUnsupported => 4,
            SimError::DataExhausted { .. } | SimError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
