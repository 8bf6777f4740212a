//! Fractional-year dates
//!
//! A fractional year such as `2023.2027` carries the calendar year in its
//! integer part and the elapsed fraction of that year in the remainder. The
//! remainder is scaled by [`DAYS_PER_YEAR`] and added to January 1, then
//! rounded to the nearest whole day. No timezone handling.

use chrono::{Datelike, Duration, NaiveDate};

use super::error::{DataError, Result};

/// Mean Julian year used to scale the fractional remainder.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Convert a fractional year into a calendar date.
///
/// The input must be finite and strictly positive.
///
/// ```rust
/// use chrono::NaiveDate;
/// use co2_core::data::fractional_year_to_date;
///
/// let date = fractional_year_to_date(2023.0).unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
/// ```
pub fn fractional_year_to_date(value: f64) -> Result<NaiveDate> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DataError::InvalidFractionalYear(value));
    }

    let whole = value.trunc();
    let days = ((value - whole) * DAYS_PER_YEAR).round() as i64;
    let year = i32::try_from(whole as i64).map_err(|_| DataError::InvalidFractionalYear(value))?;

    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|jan1| jan1.checked_add_signed(Duration::days(days)))
        .ok_or(DataError::InvalidFractionalYear(value))
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_whole_year_is_january_first() {
        assert_eq!(fractional_year_to_date(2023.0).unwrap(), ymd(2023, 1, 1));
        assert_eq!(fractional_year_to_date(1960.0).unwrap(), ymd(1960, 1, 1));
    }

    #[test]
    fn test_mid_year() {
        let date = fractional_year_to_date(2023.5).unwrap();
        let expected = ymd(2023, 7, 2);
        assert!((date - expected).num_days().abs() <= 1, "got {}", date);
    }

    #[test]
    fn test_first_scripps_month() {
        let date = fractional_year_to_date(1960.042).unwrap();
        assert!(date >= ymd(1960, 1, 15) && date <= ymd(1960, 2, 15), "got {}", date);
    }

    #[test]
    fn test_result_stays_within_year() {
        for year in [1958, 1960, 1999, 2000, 2023, 2024] {
            for step in 0..1000 {
                let value = year as f64 + step as f64 / 1000.0;
                let date = fractional_year_to_date(value).unwrap();
                assert!(date >= ymd(year, 1, 1), "{} -> {}", value, date);
                assert!(date <= ymd(year + 1, 1, 1), "{} -> {}", value, date);
            }
        }
    }

    #[test]
    fn test_rejects_invalid_values() {
        for value in [0.0, -1.5, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e12] {
            assert!(fractional_year_to_date(value).is_err(), "accepted {}", value);
        }
    }

    #[test]
    fn test_month_start() {
        assert_eq!(month_start(ymd(1960, 1, 16)), ymd(1960, 1, 1));
        assert_eq!(month_start(ymd(1960, 2, 29)), ymd(1960, 2, 1));
        assert_eq!(month_start(ymd(2023, 12, 1)), ymd(2023, 12, 1));
    }
}
