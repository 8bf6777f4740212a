//! Series loading for the monthly flask CO2 table.
//!
//! ## Schema contract
//!
//! The source is comma-separated text with one title row, one header row and
//! then data rows. Columns are selected by position, never by header name,
//! because the published headers repeat names across columns:
//!
//! | Position | Meaning |
//! |----------|---------|
//! | [`FRACTIONAL_YEAR_COLUMN`] | date as a fractional year (e.g. `1960.0410`) |
//! | [`CONCENTRATION_COLUMN`] | raw CO2 concentration (ppm) |
//!
//! ## Cleaning
//!
//! 1. Both columns are coerced to numbers; failures and sentinels become gaps.
//! 2. Concentration gaps are forward-filled, then backward-filled.
//! 3. Rows still lacking a date or a concentration are dropped.
//! 4. Dates are normalised and snapped to the first of their month.
//! 5. The series is sorted, de-duplicated and gap-filled at monthly cadence.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{DataError, Result};
use super::fractional_year::{fractional_year_to_date, month_start};
use super::series::{add_months, MonthlySeries};
use crate::utils::preprocessing::{count_missing, fill_missing};

/// Rows preceding the header row.
pub const TITLE_ROWS: usize = 1;

/// Column holding the fractional-year date.
pub const FRACTIONAL_YEAR_COLUMN: usize = 3;

/// Column holding the raw concentration in ppm.
pub const CONCENTRATION_COLUMN: usize = 4;

/// Placeholder the Scripps monthly files use for a missing reading.
pub const SCRIPPS_MISSING_SENTINEL: f64 = -99.99;

/// Values within this distance of a sentinel count as the sentinel.
const SENTINEL_TOLERANCE: f64 = 1e-9;

/// Options for [`load_with_options`] and [`load_from_reader`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderOptions {
    /// Numeric placeholders that mark a missing value
    pub missing_sentinels: Vec<f64>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            missing_sentinels: vec![SCRIPPS_MISSING_SENTINEL],
        }
    }
}

impl LoaderOptions {
    /// Options with no sentinel values.
    pub fn without_sentinels() -> Self {
        Self {
            missing_sentinels: Vec::new(),
        }
    }

    fn is_sentinel(&self, value: f64) -> bool {
        self.missing_sentinels
            .iter()
            .any(|s| (value - s).abs() < SENTINEL_TOLERANCE)
    }
}

/// A data row that survived cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedRow {
    /// Zero-based data row position (after the title and header rows)
    pub record: usize,
    /// Fractional-year date as read
    pub date_decimal: f64,
    /// Concentration as read, `None` if it was missing or invalid
    pub co2_raw_ppm: Option<f64>,
    /// Concentration after gap repair
    pub co2_ppm: f64,
    /// Normalised calendar date
    pub date: NaiveDate,
}

/// The intermediate table kept for inspection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreparedTable {
    /// Header row as read
    pub header: Vec<String>,
    /// Surviving rows in source order
    pub rows: Vec<PreparedRow>,
    /// Data rows read
    pub total_records: usize,
    /// Concentration gaps repaired by fill
    pub filled_values: usize,
    /// Rows dropped for an unusable date or concentration
    pub dropped_rows: usize,
    /// Rows discarded because their month was already taken
    pub duplicate_months: usize,
    /// Months missing from the source and filled from the previous month
    pub inserted_months: usize,
}

/// Load and clean the table at `path` with default options.
pub fn load(path: impl AsRef<Path>) -> Result<(MonthlySeries, PreparedTable)> {
    load_with_options(path, &LoaderOptions::default())
}

/// Load and clean the table at `path`.
pub fn load_with_options(
    path: impl AsRef<Path>,
    options: &LoaderOptions,
) -> Result<(MonthlySeries, PreparedTable)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), "reading source table");
    load_from_reader(BufReader::new(file), options)
}

/// Load and clean a table from any reader.
pub fn load_from_reader<R: Read>(
    reader: R,
    options: &LoaderOptions,
) -> Result<(MonthlySeries, PreparedTable)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = csv_reader.records();

    for seen in 0..TITLE_ROWS {
        match records.next() {
            Some(record) => {
                record?;
            }
            None => return Err(DataError::MissingHeader { found: seen }),
        }
    }
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(DataError::MissingHeader { found: TITLE_ROWS }),
    };

    let required = FRACTIONAL_YEAR_COLUMN.max(CONCENTRATION_COLUMN) + 1;
    if header.len() < required {
        return Err(DataError::MissingColumns {
            required,
            found: header.len(),
        });
    }

    let mut date_decimal = Vec::new();
    let mut co2_raw = Vec::new();
    for record in records {
        let record = record?;
        date_decimal.push(
            coerce(record.get(FRACTIONAL_YEAR_COLUMN), options).filter(|year| *year > 0.0),
        );
        co2_raw.push(coerce(record.get(CONCENTRATION_COLUMN), options));
    }

    let total_records = co2_raw.len();
    let missing = count_missing(&co2_raw);
    let co2_filled = fill_missing(&co2_raw);
    let filled_values = missing - count_missing(&co2_filled);
    if filled_values > 0 {
        warn!(filled_values, "repaired missing concentration values by forward/backward fill");
    }

    let mut rows = Vec::with_capacity(total_records);
    for (record, ((decimal, raw), filled)) in date_decimal
        .iter()
        .zip(&co2_raw)
        .zip(&co2_filled)
        .enumerate()
    {
        let (Some(decimal), Some(co2_ppm)) = (*decimal, *filled) else {
            continue;
        };
        match fractional_year_to_date(decimal) {
            Ok(date) => rows.push(PreparedRow {
                record,
                date_decimal: decimal,
                co2_raw_ppm: *raw,
                co2_ppm,
                date,
            }),
            Err(err) => debug!(record, error = %err, "dropping row with unconvertible date"),
        }
    }

    let dropped_rows = total_records - rows.len();
    if dropped_rows > 0 {
        warn!(dropped_rows, total_records, "dropped rows without a usable date or concentration");
    }
    if rows.is_empty() {
        return Err(DataError::NoValidRows);
    }

    let mut table = PreparedTable {
        header: header.iter().map(str::to_string).collect(),
        rows,
        total_records,
        filled_values,
        dropped_rows,
        duplicate_months: 0,
        inserted_months: 0,
    };
    let series = to_monthly(&mut table)?;

    info!(
        start = %series.start(),
        end = %series.end(),
        months = series.len(),
        "data loaded, cleaned, and indexed"
    );
    Ok((series, table))
}

/// Parse a field as a number, mapping failures and sentinels to `None`.
fn coerce(field: Option<&str>, options: &LoaderOptions) -> Option<f64> {
    let value = field?.trim().parse::<f64>().ok()?;
    if !value.is_finite() || options.is_sentinel(value) {
        return None;
    }
    Some(value)
}

/// Index surviving rows by month start and close any gaps.
///
/// The first row seen for a month wins; missing months take the value of the
/// month before them.
fn to_monthly(table: &mut PreparedTable) -> Result<MonthlySeries> {
    let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in &table.rows {
        let month = month_start(row.date);
        if by_month.contains_key(&month) {
            table.duplicate_months += 1;
            debug!(record = row.record, %month, "discarding duplicate month");
        } else {
            by_month.insert(month, row.co2_ppm);
        }
    }
    if table.duplicate_months > 0 {
        warn!(duplicates = table.duplicate_months, "source contained duplicate months");
    }

    let (Some((&start, _)), Some((&end, _))) =
        (by_month.first_key_value(), by_month.last_key_value())
    else {
        return Err(DataError::NoValidRows);
    };

    let mut values = Vec::with_capacity(by_month.len());
    let mut month = start;
    let mut previous = None;
    while month <= end {
        let value = match (by_month.get(&month), previous) {
            (Some(&value), _) => value,
            (None, Some(value)) => {
                table.inserted_months += 1;
                value
            }
            (None, None) => return Err(DataError::NoValidRows),
        };
        values.push(value);
        previous = Some(value);
        month = add_months(month, 1).ok_or_else(|| {
            DataError::InvalidSeries("month index exceeds the calendar range".to_string())
        })?;
    }
    if table.inserted_months > 0 {
        warn!(inserted = table.inserted_months, "filled months absent from the source");
    }

    MonthlySeries::new(start, values)
}
