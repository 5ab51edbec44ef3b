//! # Stock Prediction
//!
//! Workspace facade over the two member crates:
//!
//! - [`forecast_math`]: rolling means, differencing, least squares and the
//!   augmented Dickey-Fuller test
//! - [`price_forecast`]: the close-price forecasting pipeline
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use stock_prediction_workspace::price_forecast::synthetic::constant_series;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let closes = constant_series(start, 100, 50.0).unwrap();
//!
//! let output = stock_prediction_workspace::forecast(&closes).unwrap();
//! assert_eq!(output.forecast.values(), &[50.0; 30]);
//! ```

pub use forecast_math;
pub use price_forecast;

use price_forecast::{ForecastPipeline, PipelineConfig, PipelineOutput, TimeSeries};

/// Runs the forecasting pipeline with the default configuration.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use stock_prediction_workspace::price_forecast::synthetic::trending_series;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let closes = trending_series(start, 300, 100.0, 0.2, 1.0, 1).unwrap();
///
/// let output = stock_prediction_workspace::forecast(&closes).unwrap();
/// assert_eq!(output.forecast.horizon(), 30);
/// ```
pub fn forecast(closes: &TimeSeries) -> price_forecast::error::Result<PipelineOutput> {
    forecast_with(closes, PipelineConfig::default())
}

/// Runs the forecasting pipeline with an explicit configuration.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use stock_prediction_workspace::price_forecast::synthetic::constant_series;
/// use stock_prediction_workspace::price_forecast::PipelineConfig;
///
/// let config = PipelineConfig {
///     horizon: 5,
///     ..PipelineConfig::default()
/// };
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let closes = constant_series(start, 60, 12.5).unwrap();
///
/// let output = stock_prediction_workspace::forecast_with(&closes, config).unwrap();
/// assert_eq!(output.forecast.values(), &[12.5; 5]);
/// ```
pub fn forecast_with(
    closes: &TimeSeries,
    config: PipelineConfig,
) -> price_forecast::error::Result<PipelineOutput> {
    ForecastPipeline::new(config)?.run(closes)
}
