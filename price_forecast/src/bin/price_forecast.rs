//! # price_forecast
//!
//! Command-line interface for 30-day close-price forecasts.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use price_forecast::data::parse_date;
use price_forecast::synthetic::trending_series;
use price_forecast::{
    CancellationToken, CsvDirectorySource, DataLoader, ForecastPipeline, ForecastReport,
    HistoryWindow, PipelineConfig, TimeSeries,
};
use std::path::PathBuf;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "price_forecast")]
#[command(about = "Forecast the next 30 daily closes of a ticker", long_about = None)]
struct Cli {
    /// CSV file with a date column and a close column
    #[arg(short, long, conflicts_with_all = ["data_dir", "synthetic"])]
    input: Option<PathBuf>,

    /// Directory holding `<TICKER>.csv` files
    #[arg(short, long, requires = "ticker")]
    data_dir: Option<PathBuf>,

    /// Tickers to forecast from --data-dir, run concurrently
    #[arg(short, long, num_args = 1..)]
    ticker: Vec<String>,

    /// Forecast a generated trending series of this many points
    #[arg(long, conflicts_with = "data_dir")]
    synthetic: Option<usize>,

    /// Pipeline configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore history before this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_start)]
    start: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Wall-clock limit per model fit in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn parse_start(text: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(text).map_err(|err| err.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&cli.log_level))
                .context("Invalid --log-level filter")?,
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if cli.timeout_ms.is_some() {
        config.fit.timeout_ms = cli.timeout_ms;
    }
    let pipeline = ForecastPipeline::new(config)?;
    let window = HistoryWindow {
        start: cli.start,
        end: None,
    };

    let reports = if let Some(dir) = &cli.data_dir {
        forecast_tickers(&pipeline, &CsvDirectorySource::new(dir), &cli.ticker, &window)?
    } else {
        let (label, series) = single_series(&cli)?;
        let output = pipeline
            .run(&series.window(&window))
            .with_context(|| format!("Forecast failed for {}", label))?;
        vec![output.report(&label)]
    };

    let rendered = render(&reports, cli.format)?;
    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", rendered),
    }

    Ok(())
}

fn single_series(cli: &Cli) -> Result<(String, TimeSeries)> {
    if let Some(path) = &cli.input {
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        let series = DataLoader::from_csv(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        return Ok((label, series));
    }
    if let Some(len) = cli.synthetic {
        let start = cli
            .start
            .or_else(|| NaiveDate::from_ymd_opt(2020, 1, 1))
            .context("Invalid start date")?;
        return Ok(("SYNTHETIC".to_string(), trending_series(start, len, 100.0, 0.25, 1.0, 7)?));
    }
    bail!("Provide --input, --data-dir with --ticker, or --synthetic")
}

/// Forecast every ticker on its own thread; the first failure cancels the rest
fn forecast_tickers(
    pipeline: &ForecastPipeline,
    source: &CsvDirectorySource,
    tickers: &[String],
    window: &HistoryWindow,
) -> Result<Vec<ForecastReport>> {
    let token = CancellationToken::new();
    let pipeline = pipeline.clone().with_cancellation(token.clone());

    thread::scope(|scope| {
        let handles: Vec<_> = tickers
            .iter()
            .map(|ticker| {
                let pipeline = &pipeline;
                let token = &token;
                scope.spawn(move || {
                    let result = pipeline
                        .run_source(source, ticker, window)
                        .map(|output| output.report(ticker))
                        .with_context(|| format!("Forecast failed for {}", ticker));
                    if result.is_err() {
                        token.cancel();
                    }
                    result
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(_) => bail!("Forecast thread panicked"),
            })
            .collect()
    })
}

fn render(reports: &[ForecastReport], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(reports
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => {
            if let [single] = reports {
                Ok(single.to_json()?)
            } else {
                Ok(serde_json::to_string_pretty(reports)?)
            }
        }
        OutputFormat::Csv => {
            let mut out = String::new();
            for report in reports {
                if reports.len() > 1 {
                    out.push_str(&format!("# {}\n", report.ticker));
                }
                out.push_str(&report.to_csv()?);
            }
            Ok(out)
        }
    }
}
