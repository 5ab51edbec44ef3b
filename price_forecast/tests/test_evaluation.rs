use approx::assert_relative_eq;
use chrono::{Datelike, NaiveDate, Weekday};
use price_forecast::cancel::FitBudget;
use price_forecast::error::{ForecastError, Stage};
use price_forecast::evaluation::Evaluator;
use price_forecast::forecaster::{Forecaster, ValueSpace};
use price_forecast::models::ArimaModel;
use price_forecast::scaling::Scaler;
use price_forecast::synthetic::{constant_series, trending_series};
use price_forecast::TimeSeries;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn weekday_line(len: usize) -> TimeSeries {
    let dates: Vec<NaiveDate> = start()
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(len)
        .collect();
    let values = (0..len).map(|i| 0.1 + 0.002 * i as f64).collect();
    TimeSeries::new(dates, values).unwrap()
}

#[test]
fn test_constant_series_scores_zero() {
    let series = constant_series(start(), 100, 0.0).unwrap();
    let result = Evaluator::default()
        .evaluate(&ArimaModel::new(2, 0, 2), &series, &FitBudget::default())
        .unwrap();

    assert_eq!(result.rmse, 0.0);
    assert_eq!(result.mae, 0.0);
    assert_eq!(result.train_len, 70);
    assert_eq!(result.predictions.len(), 30);
    assert_eq!(result.predictions.dates(), result.actuals.dates());
    assert_eq!(result.model, "ARIMA(2,0,2)");
}

#[test]
fn test_trend_scores_are_finite() {
    let raw = trending_series(start(), 200, 100.0, 0.4, 1.0, 11).unwrap();
    let (scaled, transform) = Scaler::new().fit_transform(&raw).unwrap();
    let result = Evaluator::new(20)
        .evaluate(&ArimaModel::new(2, 1, 2), &scaled, &FitBudget::default())
        .unwrap();

    assert!(result.rmse > 0.0 && result.rmse.is_finite());
    assert!(result.mae <= result.rmse);
    assert_eq!(result.actuals.len(), 20);
    assert_relative_eq!(
        result.rmse_in_price(&transform),
        result.rmse * transform.range()
    );
}

#[test]
fn test_training_prefix_too_short() {
    let series = constant_series(start(), 34, 0.5).unwrap();
    let err = Evaluator::default()
        .evaluate(&ArimaModel::new(2, 1, 2), &series, &FitBudget::default())
        .unwrap_err();

    match err {
        ForecastError::ModelFit { stage, reason } => {
            assert_eq!(stage, Stage::Evaluation);
            assert!(reason.contains("6"));
        }
        other => panic!("Expected ModelFit, got {:?}", other),
    }
}

#[test]
fn test_series_no_longer_than_held_out() {
    let series = constant_series(start(), 30, 1.0).unwrap();
    let result = Evaluator::default().evaluate(&ArimaModel::new(0, 0, 0), &series, &FitBudget::default());
    assert!(matches!(
        result,
        Err(ForecastError::ModelFit {
            stage: Stage::Evaluation,
            ..
        })
    ));
}

#[test]
fn test_forecast_has_horizon_points_after_last_date() {
    let series = trending_series(start(), 120, 0.2, 0.003, 0.01, 4).unwrap();
    let forecast = Forecaster::default()
        .forecast(&ArimaModel::new(2, 1, 2), &series, &FitBudget::default())
        .unwrap();

    assert_eq!(forecast.horizon(), 30);
    assert_eq!(forecast.space(), ValueSpace::Scaled);
    let dates = forecast.series().dates();
    assert_eq!(dates[0], series.last_date().unwrap() + chrono::Days::new(1));
    assert!(dates.windows(2).all(|w| (w[1] - w[0]).num_days() == 1));
}

#[test]
fn test_forecast_continues_trading_days() {
    let series = weekday_line(60);
    let forecast = Forecaster::new(10)
        .unwrap()
        .forecast(&ArimaModel::new(1, 1, 0), &series, &FitBudget::default())
        .unwrap();

    let dates = forecast.series().dates();
    assert_eq!(dates.len(), 10);
    assert!(dates[0] > series.last_date().unwrap());
    assert!(dates
        .iter()
        .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));

    // Linear input with one difference extrapolates exactly
    let last = series.last_value().unwrap();
    for (h, value) in forecast.values().iter().enumerate() {
        assert_relative_eq!(*value, last + 0.002 * (h + 1) as f64, epsilon = 1e-9);
    }
}

#[test]
fn test_invert_forecast_once() {
    let series = constant_series(start(), 50, 80.0).unwrap();
    let scaler = Scaler::new();
    let (scaled, transform) = scaler.fit_transform(&series).unwrap();

    let forecast = Forecaster::new(5)
        .unwrap()
        .forecast(&ArimaModel::new(1, 0, 1), &scaled, &FitBudget::default())
        .unwrap();
    let prices = forecast.invert(&transform).unwrap();

    assert_eq!(prices.space(), ValueSpace::Price);
    assert_eq!(prices.values(), &[80.0; 5]);
    assert!(prices.invert(&transform).is_err());
}

#[test]
fn test_zero_horizon_rejected() {
    assert!(Forecaster::new(0).is_err());
}
