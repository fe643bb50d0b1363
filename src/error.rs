//! Crate error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that abort construction or I/O.
///
/// Data quality problems (bad registry rows, weather gaps) are not errors;
/// they are counted in [`crate::sim::types::Diagnostics`].
#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid configuration: {}", join_config_errors(.0))]
    Config(Vec<ConfigError>),

    #[error("unknown turbine type \"{0}\", available: small, standard, large, offshore")]
    UnknownTurbineType(String),

    #[error("unknown time resolution \"{0}\", available: hourly, daily, weekly, monthly")]
    UnknownResolution(String),

    #[error("invalid timestamp for {field}: \"{value}\"")]
    InvalidTimestamp { field: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type SimResult<T> = Result<T, SimError>;

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ConfigError> for SimError {
    fn from(value: ConfigError) -> Self {
        SimError::Config(vec![value])
    }
}
