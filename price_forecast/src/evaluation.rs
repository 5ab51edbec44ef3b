//! Held-out evaluation of a model family

use crate::cancel::FitBudget;
use crate::data::TimeSeries;
use crate::error::{Result, Stage};
use crate::metrics::forecast_accuracy;
use crate::models::{FitError, ForecastModel, TrainedForecastModel};
use crate::scaling::ScalingTransform;
use serde::{Deserialize, Serialize};

/// Accuracy of a model over the held-out suffix of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Model that was evaluated, e.g. `ARIMA(2,1,2)`
    pub model: String,
    /// Root mean squared error over the held-out window
    pub rmse: f64,
    /// Mean absolute error over the held-out window
    pub mae: f64,
    /// Points the model was trained on
    pub train_len: usize,
    /// Held-out actual values
    pub actuals: TimeSeries,
    /// Model predictions for the held-out dates
    pub predictions: TimeSeries,
}

impl EvaluationResult {
    /// RMSE in the units the series was scaled from
    pub fn rmse_in_price(&self, transform: &ScalingTransform) -> f64 {
        transform.unscale_distance(self.rmse)
    }
}

/// Splits a series into a training prefix and held-out suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    held_out: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self { held_out: 30 }
    }
}

impl Evaluator {
    pub fn new(held_out: usize) -> Self {
        Self { held_out }
    }

    pub fn held_out(&self) -> usize {
        self.held_out
    }

    /// Fit `model` on everything but the last `held_out` points, forecast the
    /// held-out window in one multi-step run and score it.
    pub fn evaluate<M: ForecastModel>(
        &self,
        model: &M,
        series: &TimeSeries,
        budget: &FitBudget,
    ) -> Result<EvaluationResult> {
        let train_len = series.len().saturating_sub(self.held_out);
        let required = model.min_observations();
        if train_len < required {
            return Err(FitError::TooShort {
                required,
                actual: train_len,
            }
            .at_stage(Stage::Evaluation));
        }

        let (train, test) = series.split_at(train_len);
        let trained = model
            .train(train.values(), budget)
            .map_err(|err| err.at_stage(Stage::Evaluation))?;
        let predicted = trained.forecast(test.len());

        let accuracy = forecast_accuracy(&predicted, test.values())?;
        let predictions = test.with_values(predicted)?;

        tracing::debug!(
            model = %model.name(),
            train_len,
            held_out = test.len(),
            rmse = accuracy.rmse,
            "Evaluated model"
        );

        Ok(EvaluationResult {
            model: model.name(),
            rmse: accuracy.rmse,
            mae: accuracy.mae,
            train_len,
            actuals: test,
            predictions,
        })
    }
}
