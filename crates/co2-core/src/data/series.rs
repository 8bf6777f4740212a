//! Monthly time series types.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::{DataError, Result};

/// One cleaned reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Month-start date
    pub date: NaiveDate,
    /// CO2 concentration in parts per million
    pub concentration_ppm: f64,
}

/// A gap-free series at month-start cadence.
///
/// Dates are implied by `start` and the position of each value, so the index
/// is strictly increasing, exactly one calendar month apart and free of
/// duplicates by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    start: NaiveDate,
    end: NaiveDate,
    values: Vec<f64>,
}

impl MonthlySeries {
    /// Create a series starting at `start`.
    ///
    /// `start` must be the first day of a month and every value finite.
    pub fn new(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        if start.day() != 1 {
            return Err(DataError::InvalidSeries(format!(
                "start date {} is not the first of a month",
                start
            )));
        }
        if values.is_empty() {
            return Err(DataError::InvalidSeries("series is empty".to_string()));
        }
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(DataError::InvalidSeries(format!(
                "non-finite value at position {}",
                position
            )));
        }

        let end = u32::try_from(values.len() - 1)
            .ok()
            .and_then(|offset| add_months(start, offset))
            .ok_or_else(|| DataError::InvalidSeries("series exceeds the calendar range".to_string()))?;

        Ok(Self { start, end, values })
    }

    /// First index date.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last index date.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of months.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; a series holds at least one month.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Concentration values in date order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Date of the value at `index`.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.values.len() {
            return None;
        }
        u32::try_from(index)
            .ok()
            .and_then(|offset| add_months(self.start, offset))
    }

    /// Observations in date order.
    pub fn iter(&self) -> impl Iterator<Item = Observation> + '_ {
        (0u32..)
            .zip(self.values.iter())
            .filter_map(move |(offset, &concentration_ppm)| {
                add_months(self.start, offset).map(|date| Observation {
                    date,
                    concentration_ppm,
                })
            })
    }

    /// The first `n` observations.
    pub fn head(&self, n: usize) -> Vec<Observation> {
        self.iter().take(n).collect()
    }
}

/// `date` moved forward by `months` calendar months.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}
