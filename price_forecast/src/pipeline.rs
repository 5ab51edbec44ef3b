//! End-to-end forecasting run
//!
//! Each run walks the states
//! `RawFetched -> Smoothed -> OrderResolved -> Scaled -> Evaluated -> Forecasted -> Inverted -> Done`
//! and aborts with no partial output on the first error. The cancellation
//! token is checked between stages and inside every model fit.

use crate::cancel::CancellationToken;
use crate::config::PipelineConfig;
use crate::data::{HistoryWindow, SeriesSource, TimeSeries};
use crate::error::{ForecastError, Result, Stage};
use crate::evaluation::{EvaluationResult, Evaluator};
use crate::forecaster::{ForecastResult, Forecaster};
use crate::models::{ArimaModel, ArimaOrder};
use crate::report::ForecastReport;
use crate::scaling::{Scaler, ScalingTransform};
use crate::smoothing::Smoother;
use crate::stationarity::{DifferencingOrder, StationarityResolver};
use std::fmt;

/// Progress of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    RawFetched,
    Smoothed,
    OrderResolved,
    Scaled,
    Evaluated,
    Forecasted,
    Inverted,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything a completed run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Rolling-mean history the model was fitted on
    pub smoothed: TimeSeries,
    /// Resolved differencing order
    pub differencing: DifferencingOrder,
    /// Model order used for both fits
    pub order: ArimaOrder,
    /// Transform fitted on the smoothed history
    pub transform: ScalingTransform,
    /// Held-out accuracy, in scaled units
    pub evaluation: EvaluationResult,
    /// Forecast in price units
    pub forecast: ForecastResult,
}

impl PipelineOutput {
    /// Smoothed history followed by the forecast
    pub fn trend_series(&self) -> Result<TimeSeries> {
        self.smoothed.concat(self.forecast.series())
    }

    /// Trend series without its first `skip` points
    pub fn trend_tail(&self, skip: usize) -> Result<TimeSeries> {
        Ok(self.trend_series()?.skip(skip))
    }

    /// Held-out RMSE converted to price units
    pub fn rmse_in_price(&self) -> f64 {
        self.evaluation.rmse_in_price(&self.transform)
    }

    /// Summary suitable for display or export
    pub fn report(&self, ticker: &str) -> ForecastReport {
        ForecastReport::from_output(ticker, self)
    }
}

/// Runs smoothing, differencing-order resolution, scaling, evaluation and
/// forecasting for one close-price series
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: PipelineConfig,
    token: Option<CancellationToken>,
}

impl ForecastPipeline {
    /// Create a pipeline from a validated configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            token: None,
        })
    }

    /// Abort the run when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch `ticker` from `source` and run on it
    pub fn run_source<S: SeriesSource + ?Sized>(
        &self,
        source: &S,
        ticker: &str,
        window: &HistoryWindow,
    ) -> Result<PipelineOutput> {
        self.checkpoint(Stage::Loading)?;
        let raw = source.close_series(ticker, window)?;
        self.run(&raw)
    }

    /// Forecast from raw close prices
    pub fn run(&self, raw: &TimeSeries) -> Result<PipelineOutput> {
        let config = &self.config;
        self.enter(PipelineState::RawFetched);

        self.checkpoint(Stage::Smoothing)?;
        let smoothed = Smoother::new(config.smoothing_window)?.smooth(raw)?;
        self.enter(PipelineState::Smoothed);

        self.checkpoint(Stage::Differencing)?;
        let differencing =
            StationarityResolver::new(config.significance, config.max_differencing)?
                .resolve(&smoothed)?;
        let order = config.arima_order(differencing.value());
        self.enter(PipelineState::OrderResolved);

        self.checkpoint(Stage::Scaling)?;
        let scaler = Scaler::new();
        let (scaled, transform) = scaler.fit_transform(&smoothed)?;
        self.enter(PipelineState::Scaled);

        let model = ArimaModel::from_order(order);

        self.checkpoint(Stage::Evaluation)?;
        let evaluation = Evaluator::new(config.held_out).evaluate(
            &model,
            &scaled,
            &config.fit.budget(self.token.as_ref()),
        )?;
        self.enter(PipelineState::Evaluated);

        self.checkpoint(Stage::Forecasting)?;
        let forecast = Forecaster::new(config.horizon)?.forecast(
            &model,
            &scaled,
            &config.fit.budget(self.token.as_ref()),
        )?;
        self.enter(PipelineState::Forecasted);

        let forecast = forecast.invert(&transform)?;
        self.enter(PipelineState::Inverted);

        tracing::info!(
            model = %order,
            rmse = evaluation.rmse,
            rmse_price = evaluation.rmse_in_price(&transform),
            horizon = forecast.horizon(),
            "Forecast complete"
        );
        self.enter(PipelineState::Done);

        Ok(PipelineOutput {
            smoothed,
            differencing,
            order,
            transform,
            evaluation,
            forecast,
        })
    }

    fn enter(&self, state: PipelineState) {
        tracing::debug!(%state, "Pipeline state");
    }

    fn checkpoint(&self, stage: Stage) -> Result<()> {
        if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(ForecastError::Cancelled {
                stage,
                reason: "cancelled by caller".to_string(),
            });
        }
        Ok(())
    }
}
