//! Pipeline configuration

use crate::cancel::{CancellationToken, FitBudget};
use crate::error::{ForecastError, Result};
use crate::models::ArimaOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Limits for each model fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Maximum optimizer iterations before giving up
    pub max_iterations: usize,
    /// Relative improvement in the sum of squares treated as converged
    pub tolerance: f64,
    /// Wall-clock limit per fit in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
            timeout_ms: None,
        }
    }
}

impl FitOptions {
    /// Budget for one fit, started now
    pub fn budget(&self, token: Option<&CancellationToken>) -> FitBudget {
        let mut budget = FitBudget::new(self.max_iterations, self.tolerance);
        if let Some(ms) = self.timeout_ms {
            budget = budget.with_timeout(Duration::from_millis(ms));
        }
        if let Some(token) = token {
            budget = budget.with_cancellation(token.clone());
        }
        budget
    }
}

/// Parameters of a forecasting run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rolling-mean window
    pub smoothing_window: usize,
    /// Autoregressive order `p`
    pub ar_order: usize,
    /// Moving-average order `q`
    pub ma_order: usize,
    /// Highest differencing order the resolver may return
    pub max_differencing: usize,
    /// ADF p-value at or below which a series is stationary
    pub significance: f64,
    /// Points held out for evaluation
    pub held_out: usize,
    /// Points to forecast
    pub horizon: usize,
    pub fit: FitOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 7,
            ar_order: 2,
            ma_order: 2,
            max_differencing: 2,
            significance: 0.05,
            held_out: 30,
            horizon: 30,
            fit: FitOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// ARIMA order for a resolved differencing order
    pub fn arima_order(&self, d: usize) -> ArimaOrder {
        ArimaOrder::new(self.ar_order, d, self.ma_order)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.smoothing_window == 0 {
            return Err(ForecastError::ConfigError(
                "smoothing_window must be at least 1".to_string(),
            ));
        }
        if self.held_out == 0 {
            return Err(ForecastError::ConfigError(
                "held_out must be at least 1".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(ForecastError::ConfigError(
                "horizon must be at least 1".to_string(),
            ));
        }
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(ForecastError::ConfigError(format!(
                "significance must lie in (0, 1), got {}",
                self.significance
            )));
        }
        if self.fit.max_iterations == 0 {
            return Err(ForecastError::ConfigError(
                "fit.max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.fit.tolerance > 0.0 && self.fit.tolerance.is_finite()) {
            return Err(ForecastError::ConfigError(format!(
                "fit.tolerance must be positive, got {}",
                self.fit.tolerance
            )));
        }
        Ok(())
    }
}
