use thiserror::Error;

pub type ForecastResult<T> = Result<T, ForecastError>;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed ticker or strategy selection.
    #[error("ValidationError: {0}")]
    Validation(String),

    #[error("LookupError: {0}")]
    Lookup(String),

    /// A source table could not be read or parsed.
    #[error("IOError: failed to load {source_name}: {message}")]
    Io { source_name: String, message: String },

    #[error("DataSufficiencyError: {0}")]
    DataSufficiency(String),

    #[error("StateError: {0}")]
    State(String),
}

impl ForecastError {
    pub fn io(source_name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ForecastError::Io {
            source_name: source_name.into(),
            message: err.to_string(),
        }
    }
}
