//! Error types for the price_forecast crate

use forecast_math::MathError;
use polars::prelude::PolarsError;
use std::fmt;
use thiserror::Error;

/// Pipeline stage an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Loading,
    Smoothing,
    Differencing,
    Scaling,
    Evaluation,
    Forecasting,
    Reporting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loading => "loading",
            Stage::Smoothing => "smoothing",
            Stage::Differencing => "differencing",
            Stage::Scaling => "scaling",
            Stage::Evaluation => "evaluation",
            Stage::Forecasting => "forecasting",
            Stage::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Series too short for the requested operation
    #[error("Insufficient data during {stage}: need at least {required} observations, got {actual}")]
    InsufficientData {
        stage: Stage,
        required: usize,
        actual: usize,
    },

    /// The model could not be fitted to the series
    #[error("Model fit error during {stage}: {reason}")]
    ModelFit { stage: Stage, reason: String },

    /// Work was cancelled or ran out of time
    #[error("{stage} cancelled: {reason}")]
    Cancelled { stage: Stage, reason: String },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from configuration loading or validation
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from numerical routines
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from JSON or CSV serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ForecastError {
    /// Stage the error was raised in, when known
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ForecastError::InsufficientData { stage, .. }
            | ForecastError::ModelFit { stage, .. }
            | ForecastError::Cancelled { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Map a math error raised inside `stage` onto the pipeline taxonomy
    pub fn from_math(stage: Stage, err: MathError) -> Self {
        match err {
            MathError::InsufficientData { required, actual } => ForecastError::InsufficientData {
                stage,
                required,
                actual,
            },
            other => ForecastError::MathError(other),
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
