//! Multi-step forecasts with dates continuing the input cadence

use crate::cancel::FitBudget;
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result, Stage};
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::scaling::ScalingTransform;
use serde::{Deserialize, Serialize};

/// Units the values of a forecast are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueSpace {
    Scaled,
    Price,
}

/// Dated forecast values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    series: TimeSeries,
    space: ValueSpace,
}

impl ForecastResult {
    pub fn new(series: TimeSeries, space: ValueSpace) -> Self {
        Self { series, space }
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn into_series(self) -> TimeSeries {
        self.series
    }

    pub fn space(&self) -> ValueSpace {
        self.space
    }

    /// Number of forecast points
    pub fn horizon(&self) -> usize {
        self.series.len()
    }

    pub fn values(&self) -> &[f64] {
        self.series.values()
    }

    /// Map scaled values back to prices
    pub fn invert(self, transform: &ScalingTransform) -> Result<Self> {
        if self.space == ValueSpace::Price {
            return Err(ForecastError::InvalidParameter(
                "Forecast is already in price units".to_string(),
            ));
        }
        let values = self
            .series
            .values()
            .iter()
            .map(|&v| transform.inverse(v))
            .collect();
        Ok(Self {
            series: self.series.with_values(values)?,
            space: ValueSpace::Price,
        })
    }
}

/// Fits a model on a whole series and projects it forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forecaster {
    horizon: usize,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self { horizon: 30 }
    }
}

impl Forecaster {
    pub fn new(horizon: usize) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }
        Ok(Self { horizon })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Forecast `horizon` points after the end of `series`.
    ///
    /// Values stay in the space of `series`; dates follow its cadence.
    pub fn forecast<M: ForecastModel>(
        &self,
        model: &M,
        series: &TimeSeries,
        budget: &FitBudget,
    ) -> Result<ForecastResult> {
        let last = series.last_date().ok_or(ForecastError::InsufficientData {
            stage: Stage::Forecasting,
            required: model.min_observations(),
            actual: 0,
        })?;

        let trained = model
            .train(series.values(), budget)
            .map_err(|err| err.at_stage(Stage::Forecasting))?;

        let cadence = series.cadence();
        let dates = cadence.future_dates(last, self.horizon)?;
        let values: Vec<f64> = trained.into_steps(self.horizon).collect();

        tracing::debug!(
            model = %model.name(),
            ?cadence,
            horizon = self.horizon,
            "Forecast generated"
        );

        Ok(ForecastResult::new(
            TimeSeries::new(dates, values)?,
            ValueSpace::Scaled,
        ))
    }
}
