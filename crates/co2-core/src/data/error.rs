//! Data error types.

use thiserror::Error;

/// Errors raised while reading or shaping the source table.
#[derive(Debug, Error)]
pub enum DataError {
    /// Source could not be opened or read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Table could not be parsed
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Table ended before the header row
    #[error("Missing header row: found {found} row(s) before end of input")]
    MissingHeader { found: usize },

    /// Header row is narrower than the column contract
    #[error("Missing columns: expected at least {required}, found {found}")]
    MissingColumns { required: usize, found: usize },

    /// Nothing survived cleaning
    #[error("No valid rows: every row lacked a usable date or concentration")]
    NoValidRows,

    /// Fractional year outside the convertible range
    #[error("Invalid fractional year: {0}")]
    InvalidFractionalYear(f64),

    /// Series construction violated the monthly-index contract
    #[error("Invalid series: {0}")]
    InvalidSeries(String),
}

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_error() {
        let error = DataError::MissingColumns {
            required: 5,
            found: 3,
        };
        assert_eq!(
            error.to_string(),
            "Missing columns: expected at least 5, found 3"
        );
    }

    #[test]
    fn test_missing_header_error() {
        let error = DataError::MissingHeader { found: 1 };
        assert_eq!(
            error.to_string(),
            "Missing header row: found 1 row(s) before end of input"
        );
    }

    #[test]
    fn test_no_valid_rows_error() {
        assert!(DataError::NoValidRows.to_string().starts_with("No valid rows"));
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;

        let error = DataError::Io {
            path: "missing.csv".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(error.to_string().contains("missing.csv"));
        assert!(error.source().is_some());
    }
}
