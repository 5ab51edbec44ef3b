use forecast_math::MathError;
use price_forecast::error::{ForecastError, Stage};
use std::io;

#[test]
fn test_error_conversion() {
    // Test IO error conversion
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    // Test math error conversion
    let math_error = MathError::CalculationError("singular matrix".to_string());
    let forecast_error = ForecastError::from(math_error);
    assert!(matches!(forecast_error, ForecastError::MathError(_)));

    // Test JSON error conversion
    let json_error = serde_json::from_str::<Vec<f64>>("[1.0,").unwrap_err();
    let forecast_error = ForecastError::from(json_error);
    assert!(matches!(forecast_error, ForecastError::SerializationError(_)));
}

#[test]
fn test_math_error_gets_stage() {
    let err = ForecastError::from_math(
        Stage::Smoothing,
        MathError::InsufficientData {
            required: 7,
            actual: 3,
        },
    );
    assert_eq!(err.stage(), Some(Stage::Smoothing));
    assert!(matches!(
        err,
        ForecastError::InsufficientData {
            required: 7,
            actual: 3,
            ..
        }
    ));

    let other = ForecastError::from_math(
        Stage::Differencing,
        MathError::InvalidInput("nan".to_string()),
    );
    assert_eq!(other.stage(), None);
}

#[test]
fn test_error_display() {
    let error = ForecastError::ModelFit {
        stage: Stage::Evaluation,
        reason: "need at least 6 observations, got 4".to_string(),
    };
    let error_string = format!("{}", error);
    assert!(error_string.contains("evaluation"));
    assert!(error_string.contains("got 4"));

    let error = ForecastError::Cancelled {
        stage: Stage::Forecasting,
        reason: "fit timeout elapsed".to_string(),
    };
    assert_eq!(error.to_string(), "forecasting cancelled: fit timeout elapsed");

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}
