//! Data preparation for monthly CO2 concentration records
//!
//! Turns a tabular source with fractional-year dates into a gap-free,
//! month-start indexed series.

pub mod error;
pub mod fractional_year;
pub mod loader;
pub mod series;

pub use error::{DataError, Result};
pub use fractional_year::{fractional_year_to_date, month_start, DAYS_PER_YEAR};
pub use loader::{
    load, load_from_reader, load_with_options, LoaderOptions, PreparedRow, PreparedTable,
    CONCENTRATION_COLUMN, FRACTIONAL_YEAR_COLUMN, TITLE_ROWS,
};
pub use series::{add_months, MonthlySeries, Observation};
