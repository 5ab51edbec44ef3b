//! ARIMA models for time series forecasting
//!
//! The series is differenced `d` times and centered on its mean, then an
//! ARMA(p, q) is fitted to the centered values by conditional sum of squares.
//! Hannan-Rissanen regressions provide starting values, which a
//! Levenberg-Marquardt search refines while keeping the AR part stationary
//! and the MA part invertible. The mean acts as a drift term when `d > 0`.

use crate::cancel::FitBudget;
use crate::models::{ArimaOrder, FitError, ForecastModel, TrainedForecastModel};
use forecast_math::differencing::{difference_n, integration_tails, Integrator};
use forecast_math::regression::{ordinary_least_squares, solve_linear_system};
use forecast_math::{is_constant, mean};
use std::collections::VecDeque;
use std::iter::FusedIterator;

// Largest partial autocorrelation magnitude still considered admissible
const ADMISSIBLE_LIMIT: f64 = 1.0 - 1e-8;
const INITIAL_DAMPING: f64 = 1e-3;
const MAX_DAMPING: f64 = 1e10;
const DAMPING_FLOOR: f64 = 1e-8;
const JACOBIAN_STEP: f64 = 1e-6;
const SHRINK_FACTOR: f64 = 0.9;
const MAX_SHRINKS: usize = 200;
const STALL_WINDOW: usize = 20;
const SETTLED_IMPROVEMENT: f64 = 1e-3;

/// ARIMA(p, d, q) model family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaModel {
    order: ArimaOrder,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            order: ArimaOrder::new(p, d, q),
        }
    }

    pub fn from_order(order: ArimaOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }
}

/// Fitted ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArima {
    order: ArimaOrder,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    mean: f64,
    sigma2: f64,
    iterations: usize,
    /// Last `p` centered values, oldest first
    recent_values: Vec<f64>,
    /// Last `q` residuals, oldest first
    recent_residuals: Vec<f64>,
    /// Last value of each differencing level
    tails: Vec<f64>,
}

impl TrainedArima {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Mean of the differenced series
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Residual variance estimate
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Optimizer iterations used
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArima;

    fn train(&self, values: &[f64], budget: &FitBudget) -> Result<TrainedArima, FitError> {
        let ArimaOrder { p, d, q } = self.order;
        let required = self.order.min_observations();
        if values.len() < required {
            return Err(FitError::TooShort {
                required,
                actual: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FitError::NumericalFailure(
                "training values must be finite".to_string(),
            ));
        }
        budget.check().map_err(FitError::Interrupted)?;

        let tails = integration_tails(values, d)
            .map_err(|err| FitError::NumericalFailure(err.to_string()))?;
        let differenced = difference_n(values, d);
        let mu = mean(&differenced).unwrap_or(0.0);
        let centered: Vec<f64> = differenced.iter().map(|w| w - mu).collect();

        let (params, iterations) = if is_constant(&differenced) {
            tracing::debug!(order = %self.order, "Differenced series is constant, trivial fit");
            (vec![0.0; p + q], 0)
        } else {
            let initial = initial_parameters(&centered, p, q);
            levenberg_marquardt(&centered, p, q, initial, budget)?
        };

        let residuals = css_residuals(&centered, &params[..p], &params[p..], p);
        let sse: f64 = residuals[p..].iter().map(|e| e * e).sum();
        if !sse.is_finite() {
            return Err(FitError::NumericalFailure(
                "sum of squared residuals is not finite".to_string(),
            ));
        }
        let dof = (centered.len() - p).saturating_sub(p + q).max(1);

        tracing::debug!(
            order = %self.order,
            iterations,
            sse,
            mean = mu,
            "ARIMA fitted"
        );

        Ok(TrainedArima {
            order: self.order,
            ar_coefficients: params[..p].to_vec(),
            ma_coefficients: params[p..].to_vec(),
            mean: mu,
            sigma2: sse / dof as f64,
            iterations,
            recent_values: centered[centered.len() - p..].to_vec(),
            recent_residuals: residuals[residuals.len() - q..].to_vec(),
            tails,
        })
    }

    fn name(&self) -> String {
        self.order.to_string()
    }

    fn min_observations(&self) -> usize {
        self.order.min_observations()
    }
}

impl TrainedForecastModel for TrainedArima {
    type Steps = ArimaSteps;

    fn into_steps(self, horizon: usize) -> ArimaSteps {
        ArimaSteps {
            ar: self.ar_coefficients,
            ma: self.ma_coefficients,
            mean: self.mean,
            values: self.recent_values.into_iter().collect(),
            residuals: self.recent_residuals.into_iter().collect(),
            integrator: Integrator::new(self.tails),
            remaining: horizon,
        }
    }

    fn name(&self) -> String {
        self.order.to_string()
    }
}

/// Recursive multi-step forecast, yielding level values.
///
/// Future shocks are taken as zero, each forecast feeds the next one.
#[derive(Debug, Clone)]
pub struct ArimaSteps {
    ar: Vec<f64>,
    ma: Vec<f64>,
    mean: f64,
    values: VecDeque<f64>,
    residuals: VecDeque<f64>,
    integrator: Integrator,
    remaining: usize,
}

impl Iterator for ArimaSteps {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let ar_part: f64 = self
            .ar
            .iter()
            .zip(self.values.iter().rev())
            .map(|(phi, x)| phi * x)
            .sum();
        let ma_part: f64 = self
            .ma
            .iter()
            .zip(self.residuals.iter().rev())
            .map(|(theta, e)| theta * e)
            .sum();
        let centered = ar_part + ma_part;

        if !self.values.is_empty() {
            self.values.pop_front();
            self.values.push_back(centered);
        }
        if !self.residuals.is_empty() {
            self.residuals.pop_front();
            self.residuals.push_back(0.0);
        }

        Some(self.integrator.push(centered + self.mean))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ArimaSteps {}

impl FusedIterator for ArimaSteps {}

/// Conditional residuals: the first `p` are zero, pre-sample shocks are zero
fn css_residuals(x: &[f64], ar: &[f64], ma: &[f64], p: usize) -> Vec<f64> {
    let mut residuals = vec![0.0; x.len()];
    for t in p..x.len() {
        let mut predicted = 0.0;
        for (i, phi) in ar.iter().enumerate() {
            predicted += phi * x[t - i - 1];
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                predicted += theta * residuals[t - j - 1];
            }
        }
        residuals[t] = x[t] - predicted;
    }
    residuals
}

fn sum_of_squares(x: &[f64], params: &[f64], p: usize) -> f64 {
    let residuals = css_residuals(x, &params[..p], &params[p..], p);
    residuals[p..].iter().map(|e| e * e).sum()
}

/// Hannan-Rissanen starting values, shrunk until admissible
fn initial_parameters(x: &[f64], p: usize, q: usize) -> Vec<f64> {
    let mut params = hannan_rissanen(x, p, q).unwrap_or_else(|| vec![0.0; p + q]);

    let mut shrinks = 0;
    while !is_admissible(&params, p) {
        if shrinks == MAX_SHRINKS {
            return vec![0.0; p + q];
        }
        params.iter_mut().for_each(|v| *v *= SHRINK_FACTOR);
        shrinks += 1;
    }
    params
}

fn hannan_rissanen(x: &[f64], p: usize, q: usize) -> Option<Vec<f64>> {
    if p + q == 0 {
        return Some(Vec::new());
    }

    // Long autoregression approximates the innovations
    let (innovations, start) = if q == 0 {
        (vec![0.0; x.len()], p)
    } else {
        let long = ((x.len() as f64).ln().ceil() as usize).max(p + q);
        let rows: Vec<Vec<f64>> = (long..x.len())
            .map(|t| (1..=long).map(|i| x[t - i]).collect())
            .collect();
        let fit = ordinary_least_squares(&rows, &x[long..]).ok()?;
        let mut innovations = vec![0.0; x.len()];
        innovations[long..].copy_from_slice(&fit.residuals);
        (innovations, long + q)
    };

    let start = start.max(p);
    let rows: Vec<Vec<f64>> = (start..x.len())
        .map(|t| {
            (1..=p)
                .map(|i| x[t - i])
                .chain((1..=q).map(|j| innovations[t - j]))
                .collect()
        })
        .collect();
    let fit = ordinary_least_squares(&rows, x.get(start..)?).ok()?;

    fit.coefficients
        .iter()
        .all(|c| c.is_finite())
        .then_some(fit.coefficients)
}

/// AR part stationary and MA part invertible
fn is_admissible(params: &[f64], p: usize) -> bool {
    let (ar, ma) = params.split_at(p);
    let negated_ma: Vec<f64> = ma.iter().map(|theta| -theta).collect();
    stationary_polynomial(ar) && stationary_polynomial(&negated_ma)
}

/// Step-down recursion: `1 - a1 z - .. - ak z^k` has all roots outside the
/// unit circle iff every partial autocorrelation is below one in magnitude.
fn stationary_polynomial(coefficients: &[f64]) -> bool {
    if coefficients.iter().any(|c| !c.is_finite()) {
        return false;
    }
    let mut current = coefficients.to_vec();
    while let Some(&kappa) = current.last() {
        if kappa.abs() >= ADMISSIBLE_LIMIT {
            return false;
        }
        let k = current.len();
        let denom = 1.0 - kappa * kappa;
        current = (0..k - 1)
            .map(|j| (current[j] + kappa * current[k - 2 - j]) / denom)
            .collect();
    }
    true
}

/// Minimize the conditional sum of squares starting from `initial`.
///
/// Returns the parameters and the number of iterations used.
fn levenberg_marquardt(
    x: &[f64],
    p: usize,
    q: usize,
    initial: Vec<f64>,
    budget: &FitBudget,
) -> Result<(Vec<f64>, usize), FitError> {
    let k = p + q;
    if k == 0 {
        return Ok((initial, 0));
    }

    let mut params = initial;
    let mut sse = sum_of_squares(x, &params, p);
    if !sse.is_finite() {
        params = vec![0.0; k];
        sse = sum_of_squares(x, &params, p);
        if !sse.is_finite() {
            return Err(FitError::NumericalFailure(
                "initial sum of squares is not finite".to_string(),
            ));
        }
    }
    let mut damping = INITIAL_DAMPING;
    let mut recent = VecDeque::with_capacity(STALL_WINDOW + 1);
    recent.push_back(sse);

    for iteration in 1..=budget.max_iterations() {
        budget.check().map_err(FitError::Interrupted)?;

        if sse <= f64::MIN_POSITIVE {
            return Ok((params, iteration));
        }

        let residuals = css_residuals(x, &params[..p], &params[p..], p);
        let jacobian = numerical_jacobian(x, &params, p);

        // Normal equations J'J and J'r over the conditional sample
        let mut normal = vec![vec![0.0; k]; k];
        let mut gradient = vec![0.0; k];
        for (t, row) in jacobian.iter().enumerate() {
            let r = residuals[p + t];
            for a in 0..k {
                gradient[a] += row[a] * r;
                for b in 0..k {
                    normal[a][b] += row[a] * row[b];
                }
            }
        }
        for a in 0..k {
            normal[a][a] += damping * normal[a][a].max(DAMPING_FLOOR);
        }
        let rhs: Vec<f64> = gradient.iter().map(|g| -g).collect();

        let step = solve_linear_system(&normal, &rhs).ok();

        let accepted = step.and_then(|step| {
            let candidate: Vec<f64> = params.iter().zip(&step).map(|(v, s)| v + s).collect();
            if !is_admissible(&candidate, p) {
                return None;
            }
            let candidate_sse = sum_of_squares(x, &candidate, p);
            (candidate_sse.is_finite() && candidate_sse < sse).then_some((candidate, candidate_sse, step))
        });

        match accepted {
            Some((candidate, candidate_sse, step)) => {
                let improvement = (sse - candidate_sse) / sse;
                let step_tolerance = budget.tolerance().sqrt();
                let small_step = norm(&step) <= step_tolerance * (norm(&params) + step_tolerance);
                params = candidate;
                sse = candidate_sse;
                damping = (damping / 10.0).max(f64::EPSILON);
                if improvement < budget.tolerance() || small_step {
                    return Ok((params, iteration));
                }
                recent.push_back(sse);
                if recent.len() > STALL_WINDOW + 1 {
                    recent.pop_front();
                }
                // Near-cancelling AR and MA roots leave a flat ridge the steps crawl along
                if window_improvement(&recent).is_some_and(|gain| gain < step_tolerance) {
                    tracing::debug!(iteration, sse, "Sum of squares stalled");
                    return Ok((params, iteration));
                }
            }
            None => {
                damping *= 10.0;
                if damping > MAX_DAMPING {
                    return Ok((params, iteration));
                }
            }
        }
    }

    match window_improvement(&recent) {
        Some(gain) if gain < SETTLED_IMPROVEMENT => {
            tracing::warn!(
                iterations = budget.max_iterations(),
                sse,
                recent_gain = gain,
                "Iteration budget exhausted on a settled fit, keeping estimates"
            );
            Ok((params, budget.max_iterations()))
        }
        _ => Err(FitError::NonConvergence {
            iterations: budget.max_iterations(),
        }),
    }
}

/// Relative drop in the sum of squares across a full window of accepted steps
fn window_improvement(recent: &VecDeque<f64>) -> Option<f64> {
    if recent.len() <= STALL_WINDOW {
        return None;
    }
    let (first, last) = (recent.front()?, recent.back()?);
    (*first > 0.0).then(|| (first - last) / first)
}

fn norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Central-difference Jacobian of the conditional residuals, one row per `t >= p`
fn numerical_jacobian(x: &[f64], params: &[f64], p: usize) -> Vec<Vec<f64>> {
    let k = params.len();
    let rows = x.len() - p;
    let mut jacobian = vec![vec![0.0; k]; rows];

    for j in 0..k {
        let h = JACOBIAN_STEP * params[j].abs().max(1.0);
        let mut forward = params.to_vec();
        forward[j] += h;
        let mut backward = params.to_vec();
        backward[j] -= h;

        let plus = css_residuals(x, &forward[..p], &forward[p..], p);
        let minus = css_residuals(x, &backward[..p], &backward[p..], p);
        for t in 0..rows {
            jacobian[t][j] = (plus[p + t] - minus[p + t]) / (2.0 * h);
        }
    }

    jacobian
}
