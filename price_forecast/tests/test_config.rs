use pretty_assertions::assert_eq;
use price_forecast::cancel::{CancellationToken, Interrupt};
use price_forecast::config::{FitOptions, PipelineConfig};
use price_forecast::error::ForecastError;
use price_forecast::models::ArimaOrder;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = PipelineConfig::default();

    assert_eq!(config.smoothing_window, 7);
    assert_eq!(config.ar_order, 2);
    assert_eq!(config.ma_order, 2);
    assert_eq!(config.max_differencing, 2);
    assert_eq!(config.significance, 0.05);
    assert_eq!(config.held_out, 30);
    assert_eq!(config.horizon, 30);
    assert_eq!(config.fit, FitOptions::default());
    assert_eq!(config.arima_order(1), ArimaOrder::new(2, 1, 2));
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = PipelineConfig::from_toml_str(
        r#"
smoothing_window = 5
held_out = 20

[fit]
timeout_ms = 250
"#,
    )
    .unwrap();

    let expected = PipelineConfig {
        smoothing_window: 5,
        held_out: 20,
        fit: FitOptions {
            timeout_ms: Some(250),
            ..FitOptions::default()
        },
        ..PipelineConfig::default()
    };
    assert_eq!(config, expected);
}

#[test]
fn test_toml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "ar_order = 1").unwrap();
    writeln!(file, "ma_order = 0").unwrap();

    let config = PipelineConfig::from_toml_file(file.path()).unwrap();
    assert_eq!(config.arima_order(0), ArimaOrder::new(1, 0, 0));
}

#[test]
fn test_invalid_values_rejected() {
    let cases = [
        "smoothing_window = 0",
        "held_out = 0",
        "horizon = 0",
        "significance = 1.0",
        "significance = -0.1",
        "[fit]\ntolerance = 0.0",
        "[fit]\nmax_iterations = 0",
    ];

    for case in cases {
        let result = PipelineConfig::from_toml_str(case);
        assert!(
            matches!(result, Err(ForecastError::ConfigError(_))),
            "accepted {:?}",
            case
        );
    }
}

#[test]
fn test_malformed_toml() {
    let result = PipelineConfig::from_toml_str("smoothing_window = \"seven\"");
    assert!(matches!(result, Err(ForecastError::ConfigError(_))));
}

#[test]
fn test_fit_budget_from_options() {
    let options = FitOptions {
        max_iterations: 10,
        tolerance: 1e-6,
        timeout_ms: None,
    };
    let token = CancellationToken::new();
    let budget = options.budget(Some(&token));

    assert_eq!(budget.max_iterations(), 10);
    assert_eq!(budget.tolerance(), 1e-6);
    assert_eq!(budget.check(), Ok(()));
    token.cancel();
    assert_eq!(budget.check(), Err(Interrupt::Cancelled));

    let expired = FitOptions {
        timeout_ms: Some(0),
        ..FitOptions::default()
    }
    .budget(None);
    assert_eq!(expired.check(), Err(Interrupt::TimedOut));
}
