//! Time series data handling for forecasting

use crate::error::{ForecastError, Result, Stage};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Longest gap still read as a trading-day step
const MAX_TRADING_GAP_DAYS: u64 = 4;
/// Share of gaps that must be trading-day steps
const TRADING_GAP_SHARE: f64 = 0.95;

/// Ordered, date-indexed series of finite values.
///
/// Dates are strictly increasing. A series is never mutated; every
/// transformation returns a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series, validating ordering and values
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ForecastError::DataError(format!(
                "Dates must be strictly increasing: {} is followed by {}",
                pair[0], pair[1]
            )));
        }

        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Value at {} is not finite: {}",
                dates[i], v
            )));
        }

        Ok(Self { dates, values })
    }

    /// Create a series from `(date, value)` pairs
    pub fn from_points<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let (dates, values) = points.into_iter().unzip();
        Self::new(dates, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Iterate over `(date, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Same dates, new values
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        Self::new(self.dates.clone(), values)
    }

    /// Attach `values` to the last `values.len()` dates of this series.
    ///
    /// Used by stages that drop leading points, such as smoothing.
    pub fn with_trailing_values(&self, values: Vec<f64>) -> Result<Self> {
        if values.len() > self.len() {
            return Err(ForecastError::DataError(format!(
                "Cannot align {} values to a series of length {}",
                values.len(),
                self.len()
            )));
        }
        let offset = self.len() - values.len();
        Self::new(self.dates[offset..].to_vec(), values)
    }

    /// Split into `[0, at)` and `[at, len)`
    pub fn split_at(&self, at: usize) -> (Self, Self) {
        let at = at.min(self.len());
        (
            Self {
                dates: self.dates[..at].to_vec(),
                values: self.values[..at].to_vec(),
            },
            Self {
                dates: self.dates[at..].to_vec(),
                values: self.values[at..].to_vec(),
            },
        )
    }

    /// Points whose dates fall inside `window`
    pub fn window(&self, window: &HistoryWindow) -> Self {
        let (dates, values) = self.iter().filter(|(d, _)| window.contains(*d)).unzip();
        Self { dates, values }
    }

    /// Drop the first `count` points
    pub fn skip(&self, count: usize) -> Self {
        self.split_at(count).1
    }

    /// Append `later`, which must start after this series ends
    pub fn concat(&self, later: &TimeSeries) -> Result<Self> {
        let mut dates = self.dates.clone();
        let mut values = self.values.clone();
        dates.extend_from_slice(&later.dates);
        values.extend_from_slice(&later.values);
        Self::new(dates, values)
    }

    /// Date step observed in this series
    pub fn cadence(&self) -> Cadence {
        Cadence::detect(&self.dates)
    }
}

/// Step between consecutive observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cadence {
    /// Fixed number of calendar days
    Calendar { step_days: u64 },
    /// Weekdays only, weekends skipped
    TradingDays,
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::Calendar { step_days: 1 }
    }
}

impl Cadence {
    /// Infer the cadence of a strictly increasing date sequence.
    ///
    /// Weekday-only dates whose gaps cross a weekend are trading days when
    /// nearly all gaps are at most four days (market holidays). Occasional
    /// longer holes in the data are tolerated. Anything else uses the most
    /// common gap in calendar days.
    pub fn detect(dates: &[NaiveDate]) -> Self {
        if dates.len() < 2 {
            return Cadence::default();
        }

        let gaps: Vec<u64> = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days().max(1) as u64)
            .collect();

        let weekdays_only = dates.iter().all(|d| !is_weekend(*d));
        let crosses_weekend = dates
            .windows(2)
            .any(|w| w[1].weekday().num_days_from_monday() < w[0].weekday().num_days_from_monday());
        let short_gaps = gaps.iter().filter(|&&g| g <= MAX_TRADING_GAP_DAYS).count();
        let mostly_short = short_gaps as f64 >= TRADING_GAP_SHARE * gaps.len() as f64;
        if weekdays_only && crosses_weekend && mostly_short {
            return Cadence::TradingDays;
        }

        let mut counts: HashMap<u64, usize> = HashMap::new();
        for gap in &gaps {
            *counts.entry(*gap).or_insert(0) += 1;
        }
        let step_days = counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(gap, _)| gap)
            .unwrap_or(1);

        Cadence::Calendar { step_days }
    }

    /// Date following `date`
    pub fn next(&self, date: NaiveDate) -> Result<NaiveDate> {
        let overflow = || ForecastError::DataError(format!("No date follows {}", date));
        match self {
            Cadence::Calendar { step_days } => date
                .checked_add_days(Days::new(*step_days))
                .ok_or_else(overflow),
            Cadence::TradingDays => {
                let mut next = date.checked_add_days(Days::new(1)).ok_or_else(overflow)?;
                while is_weekend(next) {
                    next = next.checked_add_days(Days::new(1)).ok_or_else(overflow)?;
                }
                Ok(next)
            }
        }
    }

    /// `count` dates following `last`
    pub fn future_dates(&self, last: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
        let mut dates = Vec::with_capacity(count);
        let mut current = last;
        for _ in 0..count {
            current = self.next(current)?;
            dates.push(current);
        }
        Ok(dates)
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Inclusive date range of history to use; open ends are unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl HistoryWindow {
    /// Everything available
    pub fn all() -> Self {
        Self::default()
    }

    /// History from `start` onward
    pub fn since(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Supplier of close-price history for a ticker
pub trait SeriesSource {
    /// Close prices for `ticker` inside `window`
    fn close_series(&self, ticker: &str, window: &HistoryWindow) -> Result<TimeSeries>;
}

/// Loads `<root>/<TICKER>.csv` files
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    root: PathBuf,
}

impl CsvDirectorySource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// File expected for `ticker`; tickers must be a bare file stem
    pub fn path_for(&self, ticker: &str) -> Result<PathBuf> {
        let unsafe_name = ticker.is_empty()
            || ticker.contains(&['/', '\\'][..])
            || ticker.contains("..")
            || Path::new(ticker).components().count() != 1;
        if unsafe_name {
            return Err(ForecastError::InvalidParameter(format!(
                "Ticker {:?} is not a plain file name",
                ticker
            )));
        }
        Ok(self.root.join(format!("{}.csv", ticker)))
    }
}

impl SeriesSource for CsvDirectorySource {
    fn close_series(&self, ticker: &str, window: &HistoryWindow) -> Result<TimeSeries> {
        let series = DataLoader::from_csv(self.path_for(ticker)?)?;
        let windowed = series.window(window);
        if windowed.is_empty() {
            return Err(ForecastError::InsufficientData {
                stage: Stage::Loading,
                required: 1,
                actual: 0,
            });
        }
        Ok(windowed)
    }
}

/// Data loader for close-price history
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load close prices from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<TimeSeries> {
        let file = File::open(path)?;
        // Use polars DataFrame reader directly
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Extract close prices from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<TimeSeries> {
        let time_column = Self::detect_time_column(&df)?;
        let close_column = Self::detect_close_column(&df)?;

        let dates_series = df.column(&time_column)?.cast(&DataType::Utf8)?;
        let closes_series = df.column(&close_column)?.cast(&DataType::Float64)?;
        let dates = dates_series.utf8()?;
        let closes = closes_series.f64()?;

        let mut points = Vec::with_capacity(df.height());
        let mut skipped = 0usize;
        for (date, close) in dates.into_iter().zip(closes.into_iter()) {
            match (date, close) {
                (Some(date), Some(close)) => points.push((parse_date(date)?, close)),
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "Dropped rows with a missing date or close");
        }

        points.sort_by_key(|(date, _)| *date);
        TimeSeries::from_points(points)
    }

    /// Detect the time column in a DataFrame
    fn detect_time_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        // Look for common time column names
        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name.contains("time")
                || lower_name.contains("date")
                || lower_name.contains("timestamp")
            {
                return Ok(name.to_string());
            }
        }

        // If not found, use the first column if it looks like a date/time
        if let Some(first_col) = df.get_columns().first() {
            if first_col.dtype().is_temporal() {
                return Ok(first_col.name().to_string());
            }
        }

        Err(ForecastError::DataError(
            "No time column found in data".to_string(),
        ))
    }

    /// Detect the close column, preferring adjusted close, then close, then price
    fn detect_close_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();
        let lowered: Vec<String> = column_names.iter().map(|n| n.to_lowercase()).collect();

        let preferences: [fn(&str) -> bool; 3] = [
            |n| n.contains("adj") && n.contains("close"),
            |n| n.contains("close"),
            |n| n.contains("price"),
        ];
        for matches in preferences {
            if let Some(i) = lowered.iter().position(|n| matches(n)) {
                return Ok(column_names[i].to_string());
            }
        }

        Err(ForecastError::DataError(
            "No close price column found in data".to_string(),
        ))
    }
}

/// Parse a date written as `YYYY-MM-DD`, optionally followed by a time
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }
    // Timestamps with an offset, e.g. 2024-01-02 00:00:00-05:00
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .ok_or_else(|| ForecastError::DataError(format!("Unrecognized date: {}", text)))
}
