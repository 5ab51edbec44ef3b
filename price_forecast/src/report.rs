//! Forecast summaries for display and export

use crate::error::{ForecastError, Result};
use crate::pipeline::PipelineOutput;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One forecast point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    /// Close price rounded to 3 decimals
    pub close: f64,
}

/// Forecast rows plus the accuracy figures of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub ticker: String,
    pub model: String,
    pub differencing_order: usize,
    /// Held-out RMSE in scaled units
    pub rmse: f64,
    /// Held-out RMSE in price units
    pub rmse_price: f64,
    /// Held-out MAE in scaled units
    pub mae: f64,
    pub rows: Vec<ForecastRow>,
}

impl ForecastReport {
    pub fn from_output(ticker: &str, output: &PipelineOutput) -> Self {
        let rows = output
            .forecast
            .series()
            .iter()
            .map(|(date, close)| ForecastRow {
                date,
                close: round_to(close, 3),
            })
            .collect();

        Self {
            ticker: ticker.to_string(),
            model: output.order.to_string(),
            differencing_order: output.differencing.value(),
            rmse: output.evaluation.rmse,
            rmse_price: output.rmse_in_price(),
            mae: output.evaluation.mae,
            rows,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Forecast rows as `date,close` CSV
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ForecastError::SerializationError(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| ForecastError::SerializationError(err.to_string()))
    }
}

impl fmt::Display for ForecastReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} forecast", self.ticker, self.model)?;
        writeln!(f, "  RMSE:        {:.4}", self.rmse)?;
        writeln!(f, "  RMSE (price): {:.4}", self.rmse_price)?;
        writeln!(f, "  MAE:         {:.4}", self.mae)?;
        writeln!(f, "{:<12} {:>12}", "Date", "Close")?;
        for row in &self.rows {
            writeln!(f, "{:<12} {:>12.3}", row.date.to_string(), row.close)?;
        }
        Ok(())
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
