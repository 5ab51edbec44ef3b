//! Forecasting models for time series data

use crate::cancel::{FitBudget, Interrupt};
use crate::error::{ForecastError, Stage};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod arima;

pub use arima::{ArimaModel, ArimaSteps, TrainedArima};

/// `(p, d, q)` order of an ARIMA model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Shortest training series that can be fitted: `p + d + q + 1`
    pub fn min_observations(&self) -> usize {
        self.p + self.d + self.q + 1
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Why a model could not be fitted
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least {required} observations, got {actual}")]
    TooShort { required: usize, actual: usize },

    #[error("no convergence after {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error("numerical failure: {0}")]
    NumericalFailure(String),

    #[error("{0}")]
    Interrupted(Interrupt),
}

impl FitError {
    /// Attach the pipeline stage the fit ran in
    pub fn at_stage(self, stage: Stage) -> ForecastError {
        match self {
            FitError::Interrupted(interrupt) => ForecastError::Cancelled {
                stage,
                reason: interrupt.to_string(),
            },
            other => ForecastError::ModelFit {
                stage,
                reason: other.to_string(),
            },
        }
    }
}

/// A model family that can be trained on a series of values
pub trait ForecastModel {
    /// The fitted model
    type Trained: TrainedForecastModel;

    /// Fit the model to `values` within `budget`
    fn train(&self, values: &[f64], budget: &FitBudget) -> Result<Self::Trained, FitError>;

    /// Get the model name
    fn name(&self) -> String;

    /// Shortest series `train` accepts
    fn min_observations(&self) -> usize;
}

/// A fitted model that projects future values
pub trait TrainedForecastModel {
    /// Lazy multi-step forecast
    type Steps: Iterator<Item = f64> + ExactSizeIterator;

    /// Consume the model and yield exactly `horizon` forecasts
    fn into_steps(self, horizon: usize) -> Self::Steps;

    /// Get the model name
    fn name(&self) -> String;

    /// Collect `horizon` forecasts
    fn forecast(self, horizon: usize) -> Vec<f64>
    where
        Self: Sized,
    {
        self.into_steps(horizon).collect()
    }
}
