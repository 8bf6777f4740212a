//! # co2cast
//!
//! Command-line interface for the CO2 forecasting model: training,
//! data inspection and offline forecasts.

use anyhow::Context;
use clap::{Parser, Subcommand};
use co2_core::config::{DEFAULT_DATA_FILE, DEFAULT_MODEL_PATH};
use co2_core::model::load_model;
use co2_core::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Parser)]
#[command(name = "co2cast")]
#[command(about = "Monthly CO2 forecasting CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the seasonal model and save the artifact
    Train {
        /// Source table
        #[arg(short, long, default_value = DEFAULT_DATA_FILE)]
        input: PathBuf,

        /// Artifact to write
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        output: PathBuf,
    },

    /// Load and clean the source table, then print the series
    Prepare {
        /// Source table
        #[arg(short, long, default_value = DEFAULT_DATA_FILE)]
        input: PathBuf,

        /// Number of leading months to print
        #[arg(long, default_value = "5")]
        head: usize,

        /// Print the full prepared table as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Forecast from a saved artifact
    Forecast {
        /// Artifact to read
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Number of months to forecast
        #[arg(short, long, default_value = "12")]
        steps: usize,
    },
}

/// Run train command
fn run_train(input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let config = TrainingConfig::builder()
        .data_path(&input)
        .model_path(&output)
        .build();

    info!(input = %input.display(), output = %output.display(), "training started");
    let model = train_and_save(&config)
        .with_context(|| format!("training from {} failed", input.display()))?;

    let summary = model.summary();
    println!(
        "Trained SARIMA{:?}x{:?} on {} months ({} to {})",
        (summary.order.p, summary.order.d, summary.order.q),
        (
            summary.seasonal_order.p,
            summary.seasonal_order.d,
            summary.seasonal_order.q,
            summary.seasonal_order.period
        ),
        summary.n_obs,
        summary.series_start,
        summary.series_end,
    );
    println!("  ma.L1     {:>10.4}", first_or_nan(&summary.params.ma));
    println!("  ma.S.L12  {:>10.4}", first_or_nan(&summary.params.seasonal_ma));
    println!("  sigma2    {:>10.4}", summary.params.sigma2);
    println!("  loglik    {:>10.2}", summary.log_likelihood);
    println!("  aic       {:>10.2}", summary.aic);
    if !summary.converged {
        println!("  (optimizer stopped at the iteration limit)");
    }
    println!("Model saved to {:?}", output);

    Ok(())
}

fn first_or_nan(values: &[f64]) -> f64 {
    values.first().copied().unwrap_or(f64::NAN)
}

/// Render the prepared table, rows included, as JSON.
fn prepared_json(table: &PreparedTable) -> serde_json::Result<String> {
    serde_json::to_string_pretty(table)
}

/// Run prepare command
fn run_prepare(input: PathBuf, head: usize, json: bool) -> anyhow::Result<()> {
    let (series, table) =
        load(&input).with_context(|| format!("failed to prepare {}", input.display()))?;
    info!(months = series.len(), "source table prepared");

    if json {
        println!("{}", prepared_json(&table)?);
        return Ok(());
    }

    println!(
        "Loaded {} records from {:?}",
        table.total_records,
        input.file_name().unwrap_or_default()
    );
    println!(
        "  filled {}, dropped {}, duplicate months {}, inserted months {}",
        table.filled_values, table.dropped_rows, table.duplicate_months, table.inserted_months
    );
    println!(
        "Series: {} months, {} to {}",
        series.len(),
        series.start(),
        series.end()
    );

    println!("{:<12} {:>10}", "date", "co2_ppm");
    for obs in series.head(head) {
        println!(
            "{:<12} {:>10.2}",
            obs.date.format(DATE_FORMAT),
            obs.concentration_ppm
        );
    }

    Ok(())
}

/// Build the JSON document printed by the forecast command.
fn forecast_json(points: &[ForecastPoint]) -> serde_json::Value {
    let predictions: serde_json::Map<String, serde_json::Value> = points
        .iter()
        .map(|p| (p.date.format(DATE_FORMAT).to_string(), serde_json::json!(p.value)))
        .collect();

    serde_json::json!({
        "forecast_start_date": points.first().map(|p| p.date.format(DATE_FORMAT).to_string()),
        "forecast_end_date": points.last().map(|p| p.date.format(DATE_FORMAT).to_string()),
        "predictions": predictions,
    })
}

/// Run forecast command
fn run_forecast(model_path: PathBuf, steps: usize) -> anyhow::Result<()> {
    let model = load_model(&model_path)
        .with_context(|| format!("failed to load model from {}", model_path.display()))?;
    info!(path = %model_path.display(), steps, "forecasting from saved model");
    let points = model.forecast(steps).context("forecast failed")?;

    println!("{}", serde_json::to_string_pretty(&forecast_json(&points))?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "co2_cli=info,co2_core=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { input, output } => run_train(input, output),
        Commands::Prepare { input, head, json } => run_prepare(input, head, json),
        Commands::Forecast { model, steps } => run_forecast(model, steps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["co2cast", "train"]).unwrap();
        match cli.command {
            Commands::Train { input, output } => {
                assert_eq!(input, PathBuf::from("monthly_flask_co2_mlo.csv"));
                assert_eq!(output, PathBuf::from("sarima_model.json"));
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_train_paths() {
        let cli =
            Cli::try_parse_from(["co2cast", "train", "-i", "data.csv", "--output", "m.json"])
                .unwrap();
        match cli.command {
            Commands::Train { input, output } => {
                assert_eq!(input, PathBuf::from("data.csv"));
                assert_eq!(output, PathBuf::from("m.json"));
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_prepare_head() {
        let cli = Cli::try_parse_from(["co2cast", "prepare", "--head", "24"]).unwrap();
        match cli.command {
            Commands::Prepare { input, head, json } => {
                assert_eq!(input, PathBuf::from("monthly_flask_co2_mlo.csv"));
                assert_eq!(head, 24);
                assert!(!json);
            }
            _ => panic!("expected prepare"),
        }
    }

    #[test]
    fn test_prepare_json_flag() {
        let cli = Cli::try_parse_from(["co2cast", "prepare", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Prepare { json: true, .. }));
    }

    #[test]
    fn test_prepared_json() {
        let source = "\
Monthly flask CO2, Mauna Loa
Yr,Mn,Date,Date,CO2
1960,1,21930,1960.0410,316.10
1960,2,21961,1960.1257,-99.99
1960,3,21990,1960.2049,317.50
";
        let (_, table) =
            load_from_reader(source.as_bytes(), &LoaderOptions::default()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&prepared_json(&table).unwrap()).unwrap();
        assert_eq!(json["total_records"], 3);
        assert_eq!(json["filled_values"], 1);

        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0]["date"].as_str().unwrap().starts_with("1960-01-"));
        assert!(rows[1]["co2_raw_ppm"].is_null());
        assert_eq!(rows[1]["co2_ppm"], 316.1);
    }

    #[test]
    fn test_forecast_defaults() {
        let cli = Cli::try_parse_from(["co2cast", "forecast"]).unwrap();
        match cli.command {
            Commands::Forecast { model, steps } => {
                assert_eq!(model, PathBuf::from("sarima_model.json"));
                assert_eq!(steps, 12);
            }
            _ => panic!("expected forecast"),
        }
    }

    #[test]
    fn test_forecast_rejects_negative_steps() {
        assert!(Cli::try_parse_from(["co2cast", "forecast", "--steps", "-1"]).is_err());
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["co2cast"]).is_err());
    }

    #[test]
    fn test_forecast_json() {
        let points = vec![
            ForecastPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                value: 421.5,
            },
            ForecastPoint {
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                value: 422.25,
            },
        ];

        let json = forecast_json(&points);
        assert_eq!(json["forecast_start_date"], "2024-01-01");
        assert_eq!(json["forecast_end_date"], "2024-02-01");
        assert_eq!(json["predictions"]["2024-02-01"], 422.25);
        assert_eq!(json["predictions"].as_object().unwrap().len(), 2);
    }
}
