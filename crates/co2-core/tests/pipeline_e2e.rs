//! End-to-end tests for the training pipeline
//!
//! Writes a table shaped like the monthly flask file, trains, persists and
//! reloads the model using only this crate's public API.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use co2_core::data::add_months;
use co2_core::model::load_model;
use co2_core::prelude::*;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Ten years of mid-month readings starting January 1960, with a few holes.
fn flask_table() -> String {
    let mut text = String::from("\"Atmospheric CO2 concentrations (ppm) derived from flask air samples\"\n");
    text.push_str("Yr,Mn,Date,Date,CO2,seasonally,fit,seasonally,CO2,seasonally\n");

    for i in 0..120 {
        let year = 1960 + i / 12;
        let month = i % 12 + 1;
        let t = i as f64;
        let decimal = year as f64 + (month as f64 - 0.5) / 12.0;
        let co2 = 316.0 + 0.07 * t
            + 3.0 * (t * std::f64::consts::PI / 6.0).sin()
            + 0.2 * (t * 1.9).cos();

        let reading = match i {
            5 => "-99.99".to_string(),
            40 => "NaN".to_string(),
            41 => String::new(),
            _ => format!("{:.2}", co2),
        };
        writeln!(
            text,
            "{},{},{},{:.4},{},{:.2},{:.2},{:.2},{},{:.2}",
            year, month, 21000 + i * 30, decimal, reading, co2, co2, co2, reading, co2
        )
        .unwrap();
    }
    text
}

fn write_table(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("monthly_flask_co2_mlo.csv");
    fs::write(&path, flask_table()).unwrap();
    path
}

#[test]
fn e2e_load_produces_monthly_series() {
    let dir = tempfile::tempdir().unwrap();
    let (series, table) = load(write_table(dir.path())).unwrap();

    assert_eq!(series.len(), 120);
    assert_eq!(series.start(), ymd(1960, 1, 1));
    assert_eq!(series.end(), ymd(1969, 12, 1));
    assert_eq!(table.filled_values, 3);
    assert_eq!(table.dropped_rows, 0);

    // Holes take the preceding valid reading
    assert_eq!(series.values()[5], series.values()[4]);
    assert_eq!(series.values()[41], series.values()[39]);

    let dates: Vec<NaiveDate> = series.iter().map(|o| o.date).collect();
    for pair in dates.windows(2) {
        assert_eq!(add_months(pair[0], 1), Some(pair[1]));
    }
}

#[test]
fn e2e_train_save_load_forecast() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainingConfig::builder()
        .data_path(write_table(dir.path()))
        .model_path(dir.path().join("sarima_model.json"))
        .build();

    let trained = train_and_save(&config).unwrap();
    let loaded = load_model(&config.model_path).unwrap();

    let forecast = loaded.forecast(12).unwrap();
    assert_eq!(forecast.len(), 12);
    assert_eq!(forecast[0].date, ymd(1970, 1, 1));
    assert_eq!(forecast[11].date, ymd(1970, 12, 1));
    for pair in forecast.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }

    let original = trained.forecast(12).unwrap();
    for (a, b) in forecast.iter().zip(&original) {
        assert!((a.value - b.value).abs() < 1e-9);
    }

    // Forecasts stay in a plausible band around the last year of data
    for point in &forecast {
        assert!(point.value > 315.0 && point.value < 330.0, "{:?}", point);
    }
}

#[test]
fn e2e_training_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainingConfig::new(write_table(dir.path()), dir.path().join("unused.json"));

    let (first, _) = train(&config).unwrap();
    let (second, _) = train(&config).unwrap();

    assert_eq!(first.summary().params, second.summary().params);
    assert_eq!(first.forecast(36).unwrap(), second.forecast(36).unwrap());
}

#[test]
fn e2e_missing_source_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainingConfig::new(dir.path().join("absent.csv"), dir.path().join("model.json"));

    let result = train_and_save(&config);
    assert!(matches!(result, Err(TrainError::Data(DataError::Io { .. }))));
    assert!(!config.model_path.exists());
}

#[test]
fn e2e_short_source_is_a_model_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.csv");
    let short: String = flask_table().lines().take(12).map(|l| format!("{}\n", l)).collect();
    fs::write(&path, short).unwrap();

    let config = TrainingConfig::new(&path, dir.path().join("model.json"));
    assert!(matches!(
        train(&config),
        Err(TrainError::Model(TsError::InsufficientData { .. }))
    ));
}
