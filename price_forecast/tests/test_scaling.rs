use approx::assert_relative_eq;
use chrono::NaiveDate;
use price_forecast::scaling::{Scaler, ScalingTransform};
use price_forecast::synthetic::{constant_series, trending_series};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 6, 1).unwrap()
}

#[test]
fn test_fit_transform_maps_into_unit_range() {
    let series = trending_series(start(), 120, 250.0, -0.4, 3.0, 9).unwrap();
    let (scaled, transform) = Scaler::new().fit_transform(&series).unwrap();

    let min = scaled.values().iter().cloned().fold(f64::INFINITY, f64::min);
    let max = scaled.values().iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert_relative_eq!(min, 0.0, epsilon = 1e-12);
    assert_relative_eq!(max, 1.0, epsilon = 1e-12);
    assert_eq!(scaled.dates(), series.dates());
    assert!(matches!(transform, ScalingTransform::MinMax { .. }));
}

#[test]
fn test_invert_round_trip() {
    let series = trending_series(start(), 60, 40.0, 0.2, 1.0, 3).unwrap();
    let scaler = Scaler::new();
    let (scaled, transform) = scaler.fit_transform(&series).unwrap();
    let restored = scaler.invert(&transform, &scaled).unwrap();

    for (a, b) in restored.values().iter().zip(series.values()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12);
    }
}

#[test]
fn test_constant_series_is_degenerate() {
    let series = constant_series(start(), 25, 50.0).unwrap();
    let scaler = Scaler::new();
    let (scaled, transform) = scaler.fit_transform(&series).unwrap();

    assert_eq!(transform, ScalingTransform::Constant { value: 50.0 });
    assert!(scaled.values().iter().all(|&v| v == 0.0));
    assert_eq!(transform.range(), 0.0);

    let restored = scaler.invert(&transform, &scaled).unwrap();
    assert_eq!(restored, series);
}

#[test]
fn test_unscale_distance() {
    let transform = ScalingTransform::MinMax {
        min: 10.0,
        max: 30.0,
    };
    assert_relative_eq!(transform.transform(15.0), 0.25);
    assert_relative_eq!(transform.inverse(0.25), 15.0);
    assert_relative_eq!(transform.unscale_distance(0.1), 2.0);
}

#[test]
fn test_empty_series_cannot_be_fitted() {
    assert!(ScalingTransform::fit(&[]).is_err());
}
