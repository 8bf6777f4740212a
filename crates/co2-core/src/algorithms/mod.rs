//! Forecasting algorithms
//!
//! The seasonal ARIMA model and the state-space machinery it is estimated
//! with.

pub mod sarima;
pub(crate) mod state_space;

/// Common trait for time series predictors
pub trait Predictor {
    /// Fit the model to historical data
    fn fit(&mut self, data: &[f64]) -> crate::Result<()>;

    /// Predict future values
    fn predict(&self, steps: usize) -> crate::Result<Vec<f64>>;

    /// Check if the model has been fitted
    fn is_fitted(&self) -> bool;
}
