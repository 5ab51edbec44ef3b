//! Differencing-order selection with the augmented Dickey-Fuller test

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use forecast_math::differencing::{difference, difference_n};
use forecast_math::is_constant;
use forecast_math::stationarity::{AugmentedDickeyFuller, LagSelection};
use forecast_math::MathError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of first differences needed for stationarity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DifferencingOrder(pub usize);

impl DifferencingOrder {
    pub fn value(&self) -> usize {
        self.0
    }

    /// Apply this many rounds of differencing to `values`
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        difference_n(values, self.0)
    }
}

impl fmt::Display for DifferencingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Picks the smallest differencing order that makes a series stationary
#[derive(Debug, Clone)]
pub struct StationarityResolver {
    test: AugmentedDickeyFuller,
    significance: f64,
    max_order: usize,
}

impl Default for StationarityResolver {
    fn default() -> Self {
        Self {
            test: AugmentedDickeyFuller::new(),
            significance: 0.05,
            max_order: 2,
        }
    }
}

impl StationarityResolver {
    /// Resolver with a significance level and differencing ceiling
    pub fn new(significance: f64, max_order: usize) -> Result<Self> {
        if !(significance > 0.0 && significance < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Significance must lie in (0, 1), got {}",
                significance
            )));
        }
        Ok(Self {
            test: AugmentedDickeyFuller::new(),
            significance,
            max_order,
        })
    }

    /// Use a different lag selection for the ADF regression
    pub fn with_lag_selection(mut self, lags: LagSelection) -> Self {
        self.test = AugmentedDickeyFuller::with_lag_selection(lags);
        self
    }

    pub fn significance(&self) -> f64 {
        self.significance
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// Resolve the differencing order of `series`.
    ///
    /// Never fails because the series is short: once a level is too short to
    /// test, the order reached so far is returned.
    pub fn resolve(&self, series: &TimeSeries) -> Result<DifferencingOrder> {
        self.resolve_values(series.values())
    }

    /// Same as [`resolve`](Self::resolve) on raw values
    pub fn resolve_values(&self, values: &[f64]) -> Result<DifferencingOrder> {
        let mut current = values.to_vec();
        let mut order = 0;

        while order < self.max_order {
            if current.len() < self.test.min_observations() {
                tracing::debug!(order, len = current.len(), "Series too short to test further");
                break;
            }
            if is_constant(&current) {
                tracing::debug!(order, "Constant series treated as stationary");
                break;
            }

            match self.test.test(&current) {
                Ok(result) => {
                    tracing::debug!(
                        order,
                        statistic = result.statistic,
                        p_value = result.p_value,
                        used_lag = result.used_lag,
                        "ADF test"
                    );
                    if result.rejects_unit_root(self.significance) {
                        break;
                    }
                }
                Err(MathError::InsufficientData { .. }) => break,
                Err(MathError::CalculationError(reason)) => {
                    tracing::warn!(order, %reason, "Degenerate ADF regression, differencing again");
                }
                Err(err) => return Err(err.into()),
            }

            current = difference(&current);
            order += 1;
        }

        Ok(DifferencingOrder(order))
    }
}
