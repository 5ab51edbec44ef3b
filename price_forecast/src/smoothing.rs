//! Rolling-mean smoothing of raw close prices

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result, Stage};
use forecast_math::moving_averages::rolling_mean;
use forecast_math::MathError;

/// Rolling arithmetic mean over a fixed window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Smoother {
    window: usize,
}

impl Default for Smoother {
    fn default() -> Self {
        Self { window: 7 }
    }
}

impl Smoother {
    /// Create a smoother with a window of `window` points
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Smoothing window must be at least 1".to_string(),
            ));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Smooth `series`.
    ///
    /// Output point `i` is the mean of the `window` raw values ending at raw
    /// index `i + window - 1` and carries that index's date, so the result
    /// has `len - window + 1` points.
    pub fn smooth(&self, series: &TimeSeries) -> Result<TimeSeries> {
        let means = rolling_mean(series.values(), self.window).map_err(|err| match err {
            MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
            other => ForecastError::from_math(Stage::Smoothing, other),
        })?;

        tracing::debug!(
            window = self.window,
            input = series.len(),
            output = means.len(),
            "Smoothed series"
        );
        series.with_trailing_values(means)
    }
}
