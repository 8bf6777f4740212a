//! Model error types
//!
//! Defines the error type shared by the forecasting algorithms and the
//! fitted model.

use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, TsError>;

/// Errors that can occur while fitting or forecasting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TsError {
    /// Insufficient data points for the operation
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Model has not been fitted yet
    #[error("Model must be fitted before prediction")]
    NotFitted,

    /// Numerical computation error
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Invalid time series data
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_display() {
        let error = TsError::InsufficientData {
            required: 30,
            actual: 5,
        };
        assert_eq!(
            error.to_string(),
            "Insufficient data: need at least 30 points, got 5"
        );
    }

    #[test]
    fn test_invalid_parameter_display() {
        let error = TsError::InvalidParameter {
            name: "steps".to_string(),
            reason: "forecast horizon must be at least 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid parameter 'steps': forecast horizon must be at least 1"
        );
    }

    #[test]
    fn test_not_fitted_display() {
        assert_eq!(
            TsError::NotFitted.to_string(),
            "Model must be fitted before prediction"
        );
    }

    #[test]
    fn test_numerical_error_display() {
        let error = TsError::NumericalError("non-positive innovation variance".to_string());
        assert_eq!(
            error.to_string(),
            "Numerical error: non-positive innovation variance"
        );
    }

    #[test]
    fn test_error_propagation() {
        fn inner() -> Result<f64> {
            Err(TsError::NotFitted)
        }

        fn outer() -> Result<f64> {
            let value = inner()?;
            Ok(value * 2.0)
        }

        assert_eq!(outer().unwrap_err(), TsError::NotFitted);
    }
}
