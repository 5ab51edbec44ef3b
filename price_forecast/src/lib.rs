//! # Price Forecast
//!
//! A Rust library for 30-day close-price forecasting of a single ticker.
//!
//! ## Features
//!
//! - Date-indexed close-price series with CSV loading (polars)
//! - Rolling-mean smoothing
//! - Differencing-order selection with the augmented Dickey-Fuller test
//! - Min/max scaling with an exact inverse
//! - ARIMA(p, d, q) fitted by conditional sum of squares
//! - Held-out evaluation (RMSE, MAE) and recursive multi-step forecasts
//! - Reports as text, JSON or CSV
//!
//! ## Pipeline
//!
//! ```text
//! raw closes -> Smoother -> StationarityResolver -> Scaler
//!            -> { Evaluator, Forecaster } -> inverse scaling -> forecast
//! ```
//!
//! Model fits run under a [`FitBudget`](cancel::FitBudget): an iteration cap,
//! an optional timeout and an optional [`CancellationToken`].
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use price_forecast::synthetic::trending_series;
//! use price_forecast::{ForecastPipeline, PipelineConfig};
//!
//! let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
//! let closes = trending_series(start, 200, 100.0, 0.5, 1.0, 42)?;
//!
//! let output = ForecastPipeline::new(PipelineConfig::default())?.run(&closes)?;
//! assert_eq!(output.forecast.horizon(), 30);
//!
//! println!("{}", output.report("DEMO"));
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod cancel;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod forecaster;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scaling;
pub mod smoothing;
pub mod stationarity;
pub mod synthetic;

// Re-export commonly used types
pub use crate::cancel::{CancellationToken, FitBudget};
pub use crate::config::{FitOptions, PipelineConfig};
pub use crate::data::{Cadence, CsvDirectorySource, DataLoader, HistoryWindow, SeriesSource, TimeSeries};
pub use crate::error::{ForecastError, Stage};
pub use crate::evaluation::{EvaluationResult, Evaluator};
pub use crate::forecaster::{ForecastResult, Forecaster, ValueSpace};
pub use crate::models::{ArimaModel, ArimaOrder, ForecastModel, TrainedForecastModel};
pub use crate::pipeline::{ForecastPipeline, PipelineOutput, PipelineState};
pub use crate::report::ForecastReport;
pub use crate::scaling::{Scaler, ScalingTransform};
pub use crate::smoothing::Smoother;
pub use crate::stationarity::{DifferencingOrder, StationarityResolver};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
