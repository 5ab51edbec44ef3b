//! # Forecast Math
//!
//! Numerical building blocks used by the price forecasting pipeline.
//! This crate provides rolling means, differencing and integration,
//! ordinary least squares, and the augmented Dickey-Fuller unit-root test.

use thiserror::Error;

pub mod differencing;
pub mod moving_averages;
pub mod regression;
pub mod stationarity;

/// Errors that can occur in forecasting math
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: need {required} values, have {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Arithmetic mean of a slice, `None` when empty
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Returns true when every value equals the first one within a relative tolerance
pub fn is_constant(values: &[f64]) -> bool {
    let Some(&first) = values.first() else {
        return true;
    };
    let tolerance = f64::EPSILON * 16.0 * first.abs().max(1.0);
    values.iter().all(|v| (v - first).abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_is_constant() {
        assert!(is_constant(&[]));
        assert!(is_constant(&[50.0; 10]));
        assert!(!is_constant(&[50.0, 50.0, 50.1]));
    }
}
