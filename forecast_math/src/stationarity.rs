//! Augmented Dickey-Fuller unit-root test
//!
//! Tests H0: the series has a unit root (non-stationary), using the
//! regression with a constant term
//!
//! ```text
//! dy[t] = c + g * y[t-1] + sum(b[i] * dy[t-i], i = 1..k) + e[t]
//! ```
//!
//! The test statistic is the t-ratio of `g`. The number of lagged
//! differences `k` is either fixed or picked by AIC, p-values follow
//! MacKinnon (1994) and critical values MacKinnon (2010).

use crate::differencing::difference;
use crate::regression::ordinary_least_squares;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Shortest series the test accepts
pub const MIN_OBSERVATIONS: usize = 6;

// Residual sum of squares, relative to the response, treated as zero
const EXACT_FIT_TOLERANCE: f64 = 1e-12;

// MacKinnon (1994) response surface, constant-only regression, one variable
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 3.8269e-2];
const TAU_LARGE_P: [f64; 4] = [1.7339, 9.3202e-1, -1.2745e-1, -1.0368e-2];

/// How many lagged differences enter the test regression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LagSelection {
    /// Always use this many lags (capped by the sample size)
    Fixed(usize),
    /// Minimize AIC over `0..=max_lag`, defaulting to `ceil(12 * (n / 100)^(1/4))`
    Aic { max_lag: Option<usize> },
}

impl Default for LagSelection {
    fn default() -> Self {
        LagSelection::Aic { max_lag: None }
    }
}

/// Critical values of the test statistic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_percent: f64,
    pub five_percent: f64,
    pub ten_percent: f64,
}

/// Outcome of an augmented Dickey-Fuller test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    /// t-ratio of the lagged level coefficient
    pub statistic: f64,
    /// Approximate p-value of the statistic
    pub p_value: f64,
    /// Number of lagged differences in the final regression
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
    /// Critical values for `nobs`
    pub critical_values: CriticalValues,
}

impl AdfResult {
    /// Whether the unit-root null is rejected at `significance`
    pub fn rejects_unit_root(&self, significance: f64) -> bool {
        self.p_value <= significance
    }
}

/// Augmented Dickey-Fuller test with a constant term
#[derive(Debug, Clone, Default)]
pub struct AugmentedDickeyFuller {
    lags: LagSelection,
}

impl AugmentedDickeyFuller {
    /// Test with AIC lag selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Test with a fixed number of lagged differences
    pub fn with_fixed_lag(lag: usize) -> Self {
        Self {
            lags: LagSelection::Fixed(lag),
        }
    }

    /// Test with an explicit lag selection rule
    pub fn with_lag_selection(lags: LagSelection) -> Self {
        Self { lags }
    }

    /// Lag selection rule in use
    pub fn lag_selection(&self) -> LagSelection {
        self.lags
    }

    /// Shortest series this test accepts
    pub fn min_observations(&self) -> usize {
        MIN_OBSERVATIONS
    }

    /// Run the test on `series`
    pub fn test(&self, series: &[f64]) -> Result<AdfResult> {
        let n = series.len();
        if n < MIN_OBSERVATIONS {
            return Err(MathError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: n,
            });
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "ADF input contains non-finite values".to_string(),
            ));
        }

        // Leave at least one degree of freedom beyond the constant and level terms
        let lag_cap = (n / 2).saturating_sub(2);
        let used_lag = match self.lags {
            LagSelection::Fixed(lag) => lag.min(lag_cap),
            LagSelection::Aic { max_lag } => {
                let max_lag = max_lag.unwrap_or_else(|| default_max_lag(n)).min(lag_cap);
                select_lag_by_aic(series, max_lag)?
            }
        };

        let (rows, y) = design(series, used_lag, used_lag);
        let fit = ordinary_least_squares(&rows, &y)?;
        // An exact fit leaves the t-ratio to rounding noise
        let scale: f64 = y.iter().map(|v| v * v).sum();
        if fit.ssr <= scale * EXACT_FIT_TOLERANCE {
            return Err(MathError::CalculationError(
                "ADF regression fits the series exactly".to_string(),
            ));
        }
        let statistic = fit.t_statistic(1)?;

        Ok(AdfResult {
            statistic,
            p_value: mackinnon_p_value(statistic),
            used_lag,
            nobs: fit.nobs,
            critical_values: critical_values(fit.nobs),
        })
    }
}

/// `ceil(12 * (n / 100)^(1/4))`
pub fn default_max_lag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize
}

/// Pick the lag count minimizing AIC, all candidates fit on a common sample
fn select_lag_by_aic(series: &[f64], max_lag: usize) -> Result<usize> {
    let mut best: Option<(usize, f64)> = None;
    let mut last_error = None;

    for lag in 0..=max_lag {
        let (rows, y) = design(series, lag, max_lag);
        match ordinary_least_squares(&rows, &y) {
            Ok(fit) => {
                let aic = fit.aic();
                if best.map_or(true, |(_, best_aic)| aic < best_aic) {
                    best = Some((lag, aic));
                }
            }
            Err(err) => last_error = Some(err),
        }
    }

    match (best, last_error) {
        (Some((lag, _)), _) => Ok(lag),
        (None, Some(err)) => Err(err),
        (None, None) => Err(MathError::CalculationError(
            "No candidate lag could be evaluated".to_string(),
        )),
    }
}

/// Test regression rows `[1, y[t-1], dy[t-1], .., dy[t-lag]]` and targets `dy[t]`.
///
/// `trim` lagged differences are dropped from the start so regressions with
/// different `lag <= trim` share one sample.
fn design(series: &[f64], lag: usize, trim: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let diffs = difference(series);
    let mut rows = Vec::with_capacity(diffs.len().saturating_sub(trim));
    let mut y = Vec::with_capacity(diffs.len().saturating_sub(trim));

    // dy[t] = series[t + 1] - series[t], lagged level is series[t]
    for t in trim..diffs.len() {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(series[t]);
        for i in 1..=lag {
            row.push(diffs[t - i]);
        }
        rows.push(row);
        y.push(diffs[t]);
    }

    (rows, y)
}

/// MacKinnon (1994) approximate p-value for the constant-only ADF statistic
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let z = if statistic <= TAU_STAR {
        polynomial(&TAU_SMALL_P, statistic)
    } else {
        polynomial(&TAU_LARGE_P, statistic)
    };

    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(z),
        Err(_) => f64::NAN,
    }
}

/// MacKinnon (2010) finite-sample critical values, constant-only regression
pub fn critical_values(nobs: usize) -> CriticalValues {
    let n = nobs.max(1) as f64;
    CriticalValues {
        one_percent: -3.43035 - 6.5393 / n - 16.786 / n.powi(2) - 79.433 / n.powi(3),
        five_percent: -2.86154 - 2.8903 / n - 4.234 / n.powi(2) - 40.040 / n.powi(3),
        ten_percent: -2.56677 - 1.5384 / n - 2.809 / n.powi(2),
    }
}

fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}
