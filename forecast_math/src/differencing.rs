//! Differencing and its inverse
//!
//! `difference_n` removes stochastic trends; `Integrator` rebuilds level
//! values from forecasts made on a differenced series.

use crate::{MathError, Result};

/// First-order difference: `out[i] = values[i + 1] - values[i]`
pub fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Apply first-order differencing `order` times.
///
/// Each round shortens the series by one, so the result has
/// `values.len().saturating_sub(order)` entries.
pub fn difference_n(values: &[f64], order: usize) -> Vec<f64> {
    let mut result = values.to_vec();
    for _ in 0..order {
        result = difference(&result);
    }
    result
}

/// Last value of every differencing level `0..order`.
///
/// Level 0 is the series itself, level `k` its k-th difference. These are the
/// starting points needed to integrate forecasts back to level 0.
pub fn integration_tails(values: &[f64], order: usize) -> Result<Vec<f64>> {
    if values.len() <= order {
        return Err(MathError::InsufficientData {
            required: order + 1,
            actual: values.len(),
        });
    }

    let mut tails = Vec::with_capacity(order);
    let mut level = values.to_vec();
    for _ in 0..order {
        if let Some(&last) = level.last() {
            tails.push(last);
        }
        level = difference(&level);
    }

    Ok(tails)
}

/// Incrementally undoes `d` rounds of differencing.
#[derive(Debug, Clone)]
pub struct Integrator {
    tails: Vec<f64>,
}

impl Integrator {
    /// Create an integrator from the tails returned by [`integration_tails`]
    pub fn new(tails: Vec<f64>) -> Self {
        Self { tails }
    }

    /// Number of differencing rounds this integrator undoes
    pub fn order(&self) -> usize {
        self.tails.len()
    }

    /// Feed the next value of the most differenced level, get the next level-0 value
    pub fn push(&mut self, differenced: f64) -> f64 {
        let mut value = differenced;
        for tail in self.tails.iter_mut().rev() {
            *tail += value;
            value = *tail;
        }
        value
    }
}

/// Integrate a block of differenced values starting from `tails`
pub fn integrate(tails: &[f64], differenced: &[f64]) -> Vec<f64> {
    let mut integrator = Integrator::new(tails.to_vec());
    differenced.iter().map(|&v| integrator.push(v)).collect()
}
