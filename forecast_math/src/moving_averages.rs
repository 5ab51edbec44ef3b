//! Moving average calculation implementations
//!
//! Contains the streaming Simple Moving Average (SMA) and a batch
//! rolling mean built on top of it.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "SMA input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);

        // Remove oldest value if we have more than period values
        if self.values.len() > self.period {
            self.values.pop_front();
        }

        Ok(())
    }

    /// Whether a full window has been observed
    pub fn is_ready(&self) -> bool {
        self.values.len() == self.period
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(MathError::InsufficientData {
                required: self.period,
                actual: self.values.len(),
            });
        }

        // Summing the window directly keeps each output an exact window mean
        Ok(self.values.iter().sum::<f64>() / self.period as f64)
    }

    /// Get the period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the SMA, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Rolling arithmetic mean over `window` consecutive values.
///
/// The output has `values.len() - window + 1` entries; entry `k` is the mean
/// of `values[k..k + window]`. Leading positions without a full window are
/// dropped.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<f64>> {
    let mut sma = SimpleMovingAverage::new(window)?;

    if values.len() < window {
        return Err(MathError::InsufficientData {
            required: window,
            actual: values.len(),
        });
    }

    let mut means = Vec::with_capacity(values.len() - window + 1);
    for &value in values {
        sma.update(value)?;
        if sma.is_ready() {
            means.push(sma.value()?);
        }
    }

    Ok(means)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sma_calculation() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();

        // Not enough data yet
        assert!(sma.value().is_err());

        sma.update(2.0).unwrap();
        sma.update(4.0).unwrap();

        // Still not enough data
        assert!(sma.value().is_err());

        sma.update(6.0).unwrap();

        // Now we have enough data
        assert_eq!(sma.value().unwrap(), 4.0); // (2 + 4 + 6) / 3 = 4

        // Add another value
        sma.update(8.0).unwrap();

        // The window slides, dropping the oldest value
        assert_eq!(sma.value().unwrap(), 6.0); // (4 + 6 + 8) / 3 = 6

        sma.reset();
        assert!(!sma.is_ready());
    }

    #[test]
    fn test_sma_rejects_bad_input() {
        assert!(SimpleMovingAverage::new(0).is_err());

        let mut sma = SimpleMovingAverage::new(2).unwrap();
        assert!(sma.update(f64::NAN).is_err());
        assert!(sma.update(f64::INFINITY).is_err());
    }

    #[test]
    fn test_rolling_mean_length_and_values() {
        let values: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let means = rolling_mean(&values, 7).unwrap();

        assert_eq!(means.len(), 4);
        assert_relative_eq!(means[0], 4.0);
        assert_relative_eq!(means[3], 7.0);
    }

    #[test]
    fn test_rolling_mean_window_equals_length() {
        let means = rolling_mean(&[1.0, 2.0, 6.0], 3).unwrap();
        assert_eq!(means, vec![3.0]);
    }

    #[test]
    fn test_rolling_mean_insufficient_data() {
        let err = rolling_mean(&[1.0, 2.0], 3).unwrap_err();
        assert_eq!(
            err,
            MathError::InsufficientData {
                required: 3,
                actual: 2
            }
        );
    }
}
