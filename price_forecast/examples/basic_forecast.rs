use chrono::NaiveDate;
use price_forecast::synthetic::trending_series;
use price_forecast::{ForecastPipeline, PipelineConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Price Forecast: Basic Forecasting Example");
    println!("=========================================\n");

    // Create sample data
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).ok_or("invalid start date")?;
    let closes = trending_series(start, 400, 100.0, 0.25, 1.5, 2024)?;
    println!(
        "Sample data created: {} daily closes from {} to {}\n",
        closes.len(),
        start,
        closes.last_date().ok_or("empty series")?
    );

    // Run the pipeline with a shorter held-out window
    let config = PipelineConfig {
        held_out: 20,
        ..PipelineConfig::default()
    };
    let output = ForecastPipeline::new(config)?.run(&closes)?;

    println!("Differencing order: {}", output.differencing);
    println!("Model: {}", output.order);
    println!(
        "Held-out RMSE: {:.4} (scaled), {:.2} (price)\n",
        output.evaluation.rmse,
        output.rmse_in_price()
    );

    println!("{}", output.report("DEMO"));

    // Last points of the smoothed history followed by the forecast
    let trend = output.trend_tail(output.smoothed.len() - 10)?;
    println!("Trend (last 10 smoothed points + forecast):");
    for (date, value) in trend.iter() {
        println!("  {}: {:.2}", date, value);
    }

    Ok(())
}
