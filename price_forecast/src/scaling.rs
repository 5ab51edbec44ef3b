//! Min/max scaling into `[0, 1]` and its inverse

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use forecast_math::is_constant;
use serde::{Deserialize, Serialize};

/// Fitted scaling parameters, sufficient to invert the mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalingTransform {
    /// `(x - min) / (max - min)`
    MinMax { min: f64, max: f64 },
    /// Every input equalled `value`; maps to 0 and back to `value`
    Constant { value: f64 },
}

impl ScalingTransform {
    /// Fit to the observed range of `values`
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot fit a scaling transform to an empty series".to_string(),
            ));
        }
        if is_constant(values) {
            return Ok(ScalingTransform::Constant { value: values[0] });
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Ok(ScalingTransform::MinMax { min, max })
    }

    /// Width of the original range, zero for a constant series
    pub fn range(&self) -> f64 {
        match self {
            ScalingTransform::MinMax { min, max } => max - min,
            ScalingTransform::Constant { .. } => 0.0,
        }
    }

    pub fn transform(&self, value: f64) -> f64 {
        match self {
            ScalingTransform::MinMax { min, max } => (value - min) / (max - min),
            ScalingTransform::Constant { .. } => 0.0,
        }
    }

    pub fn inverse(&self, value: f64) -> f64 {
        match self {
            ScalingTransform::MinMax { min, max } => value * (max - min) + min,
            ScalingTransform::Constant { value: constant } => *constant,
        }
    }

    /// Convert a distance in scaled units to price units
    pub fn unscale_distance(&self, distance: f64) -> f64 {
        distance * self.range()
    }
}

/// Fits and applies [`ScalingTransform`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct Scaler;

impl Scaler {
    pub fn new() -> Self {
        Self
    }

    /// Fit a transform on `series` and apply it
    pub fn fit_transform(&self, series: &TimeSeries) -> Result<(TimeSeries, ScalingTransform)> {
        let transform = ScalingTransform::fit(series.values())?;
        let scaled = self.apply(&transform, series)?;
        tracing::debug!(?transform, "Scaled series");
        Ok((scaled, transform))
    }

    /// Apply an already fitted transform
    pub fn apply(&self, transform: &ScalingTransform, series: &TimeSeries) -> Result<TimeSeries> {
        series.with_values(series.values().iter().map(|&v| transform.transform(v)).collect())
    }

    /// Map scaled values back to the original units
    pub fn invert(&self, transform: &ScalingTransform, series: &TimeSeries) -> Result<TimeSeries> {
        series.with_values(series.values().iter().map(|&v| transform.inverse(v)).collect())
    }
}
