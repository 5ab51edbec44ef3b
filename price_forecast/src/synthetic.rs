//! Deterministic synthetic close-price series

use crate::data::{Cadence, TimeSeries};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Daily series `base + slope * i + noise`, noise drawn from `N(0, noise_sd)`
pub fn trending_series(
    start: NaiveDate,
    len: usize,
    base: f64,
    slope: f64,
    noise_sd: f64,
    seed: u64,
) -> Result<TimeSeries> {
    let normal = Normal::new(0.0, noise_sd)
        .map_err(|err| ForecastError::InvalidParameter(format!("noise_sd: {}", err)))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let values = (0..len)
        .map(|i| base + slope * i as f64 + normal.sample(&mut rng))
        .collect();
    TimeSeries::new(daily_dates(start, len)?, values)
}

/// Daily series holding `value` throughout
pub fn constant_series(start: NaiveDate, len: usize, value: f64) -> Result<TimeSeries> {
    TimeSeries::new(daily_dates(start, len)?, vec![value; len])
}

fn daily_dates(start: NaiveDate, len: usize) -> Result<Vec<NaiveDate>> {
    if len == 0 {
        return Ok(Vec::new());
    }
    let mut dates = vec![start];
    dates.extend(Cadence::Calendar { step_days: 1 }.future_dates(start, len - 1)?);
    Ok(dates)
}
