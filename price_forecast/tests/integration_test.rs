use chrono::{Datelike, NaiveDate, Weekday};
use price_forecast::report::ForecastReport;
use price_forecast::synthetic::{constant_series, trending_series};
use price_forecast::{
    CancellationToken, CsvDirectorySource, ForecastError, ForecastPipeline, HistoryWindow,
    PipelineConfig, Stage, TimeSeries, ValueSpace,
};
use std::fs;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
}

fn default_pipeline() -> ForecastPipeline {
    ForecastPipeline::new(PipelineConfig::default()).unwrap()
}

#[test]
fn test_trending_series_forecast() {
    let raw = trending_series(start(), 400, 100.0, 0.5, 1.0, 42).unwrap();
    let output = default_pipeline().run(&raw).unwrap();

    assert!(output.differencing.value() == 1 || output.differencing.value() == 2);
    assert_eq!(output.order.d, output.differencing.value());
    assert_eq!(output.smoothed.len(), 394);
    assert_eq!(output.forecast.horizon(), 30);
    assert_eq!(output.forecast.space(), ValueSpace::Price);
    assert!(output.evaluation.rmse >= 0.0);

    // Dates continue the daily cadence
    let dates = output.forecast.series().dates();
    assert_eq!(dates[0], raw.last_date().unwrap() + chrono::Days::new(1));
    assert!(dates.windows(2).all(|w| (w[1] - w[0]).num_days() == 1));

    // The forecast keeps rising, near the underlying slope
    let last = output.smoothed.last_value().unwrap();
    let values = output.forecast.values();
    assert!(values[29] > last);
    assert!(values[29] > values[0]);
    let band = 5.0 * output.rmse_in_price().max(1.0);
    for (h, value) in values.iter().enumerate() {
        let expected = last + 0.5 * (h + 1) as f64;
        assert!(
            (value - expected).abs() <= band,
            "step {} forecast {} outside {} +/- {}",
            h + 1,
            value,
            expected,
            band
        );
    }
}

#[test]
fn test_trending_series_with_near_cancelling_fit() {
    // This draw gives ARMA(2,2) estimates whose AR and MA roots almost cancel
    let raw = trending_series(start(), 400, 100.0, 0.5, 1.0, 49).unwrap();
    let output = default_pipeline().run(&raw).unwrap();

    assert_eq!(output.forecast.horizon(), 30);
    assert!(output.forecast.values().iter().all(|v| v.is_finite()));
    assert!(output.evaluation.rmse.is_finite());
}

#[test]
fn test_constant_series_forecast() {
    let raw = constant_series(start(), 100, 50.0).unwrap();
    let output = default_pipeline().run(&raw).unwrap();

    assert_eq!(output.differencing.value(), 0);
    assert_eq!(output.forecast.values(), &[50.0; 30]);
    assert_eq!(output.evaluation.rmse, 0.0);
    assert_eq!(output.rmse_in_price(), 0.0);
}

#[test]
fn test_short_series_fails_evaluation() {
    let raw = trending_series(start(), 40, 100.0, 0.5, 1.0, 1).unwrap();
    let err = default_pipeline().run(&raw).unwrap_err();

    assert!(matches!(
        err,
        ForecastError::ModelFit {
            stage: Stage::Evaluation,
            ..
        }
    ));
}

#[test]
fn test_series_shorter_than_window() {
    let raw = trending_series(start(), 5, 100.0, 0.5, 1.0, 1).unwrap();
    let err = default_pipeline().run(&raw).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Smoothing));
}

#[test]
fn test_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();
    let raw = constant_series(start(), 100, 10.0).unwrap();

    let err = default_pipeline()
        .with_cancellation(token)
        .run(&raw)
        .unwrap_err();
    assert!(matches!(
        err,
        ForecastError::Cancelled {
            stage: Stage::Smoothing,
            ..
        }
    ));
}

#[test]
fn test_fit_timeout_cancels_evaluation() {
    let mut config = PipelineConfig::default();
    config.fit.timeout_ms = Some(0);
    let raw = trending_series(start(), 150, 100.0, 0.5, 1.0, 3).unwrap();

    let err = ForecastPipeline::new(config).unwrap().run(&raw).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::Cancelled {
            stage: Stage::Evaluation,
            ..
        }
    ));
}

#[test]
fn test_trend_series_and_tail() {
    let raw = trending_series(start(), 250, 20.0, 0.1, 0.5, 8).unwrap();
    let output = default_pipeline().run(&raw).unwrap();

    let trend = output.trend_series().unwrap();
    assert_eq!(trend.len(), output.smoothed.len() + 30);
    assert_eq!(trend.last_date(), output.forecast.series().last_date());

    let tail = output.trend_tail(150).unwrap();
    assert_eq!(tail.len(), trend.len() - 150);
    assert_eq!(tail.last_value(), trend.last_value());
}

#[test]
fn test_trading_day_input_keeps_weekdays() {
    let dates: Vec<NaiveDate> = start()
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(200)
        .collect();
    let noisy = trending_series(start(), 200, 60.0, 0.2, 0.5, 12).unwrap();
    let raw = TimeSeries::new(dates, noisy.values().to_vec()).unwrap();

    let output = default_pipeline().run(&raw).unwrap();
    let forecast_dates = output.forecast.series().dates();

    assert_eq!(forecast_dates.len(), 30);
    assert!(forecast_dates[0] > raw.last_date().unwrap());
    assert!(forecast_dates
        .iter()
        .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
}

#[test]
fn test_report_formats() {
    let raw = trending_series(start(), 200, 75.0, 0.3, 1.0, 6).unwrap();
    let output = default_pipeline().run(&raw).unwrap();
    let report = output.report("ACME");

    assert_eq!(report.ticker, "ACME");
    assert_eq!(report.model, output.order.to_string());
    assert_eq!(report.rows.len(), 30);
    for row in &report.rows {
        assert_eq!((row.close * 1000.0).round() / 1000.0, row.close);
    }

    let json = report.to_json().unwrap();
    let parsed: ForecastReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.rows.len(), 30);
    assert_eq!(parsed.rows[0].date, report.rows[0].date);
    assert!((parsed.rows[0].close - report.rows[0].close).abs() < 1e-9);

    let csv = report.to_csv().unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("date,close"));
    assert_eq!(lines.count(), 30);

    let table = report.to_string();
    assert!(table.contains("ACME"));
    assert!(table.contains(&format!("{:.4}", report.rmse)));
}

#[test]
fn test_run_from_csv_directory() {
    let dir = tempfile::tempdir().unwrap();
    let raw = trending_series(start(), 180, 30.0, 0.05, 0.3, 2).unwrap();
    let mut contents = String::from("Date,Open,Close\n");
    for (date, close) in raw.iter() {
        contents.push_str(&format!("{},{},{}\n", date, close - 0.1, close));
    }
    fs::write(dir.path().join("ACME.csv"), contents).unwrap();

    let source = CsvDirectorySource::new(dir.path());
    let since = start() + chrono::Days::new(20);
    let output = default_pipeline()
        .run_source(&source, "ACME", &HistoryWindow::since(since))
        .unwrap();

    assert_eq!(output.smoothed.len(), 160 - 6);
    assert_eq!(output.forecast.horizon(), 30);
}
