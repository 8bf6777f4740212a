//! # co2-core
//!
//! Monthly atmospheric CO2 forecasting. This is the core library behind the
//! `co2cast` training CLI and the `co2-server` prediction service.
//!
//! ## Pipeline
//!
//! - **Data** - fractional-year dates, tabular loading, gap repair and a
//!   gap-free monthly series
//! - **Algorithms** - seasonal ARIMA fitted by exact Gaussian likelihood
//!   (Kalman filter, approximate diffuse start)
//! - **Model** - the fitted, date-aware model and its JSON artifact
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use co2_core::prelude::*;
//!
//! let values: Vec<f64> = (0..72)
//!     .map(|t| {
//!         let t = t as f64;
//!         315.0 + 0.1 * t
//!             + 3.0 * (t * std::f64::consts::PI / 6.0).sin()
//!             + 0.2 * (t * 1.3).sin()
//!     })
//!     .collect();
//! let start = NaiveDate::from_ymd_opt(1960, 1, 1).unwrap();
//! let series = MonthlySeries::new(start, values).unwrap();
//!
//! let model = FittedModel::fit(&series, SarimaConfig::co2_default()).unwrap();
//! let forecast = model.forecast(12).unwrap();
//! assert_eq!(forecast.len(), 12);
//! assert_eq!(forecast[0].date, NaiveDate::from_ymd_opt(1966, 1, 1).unwrap());
//! ```

pub mod algorithms;
pub mod config;
pub mod data;
pub mod model;
pub mod training;
pub mod utils;
mod error;

pub use error::{Result, TsError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::Predictor;
    pub use crate::algorithms::sarima::{
        Sarima, SarimaConfig, SarimaOrder, SarimaParams, SeasonalOrder,
    };
    pub use crate::config::TrainingConfig;
    pub use crate::data::{
        fractional_year_to_date, load, load_from_reader, DataError, LoaderOptions,
        MonthlySeries, Observation, PreparedTable,
    };
    pub use crate::model::{ArtifactError, FittedModel, ForecastPoint, ModelSummary};
    pub use crate::training::{train, train_and_save, TrainError};
    pub use crate::error::{Result, TsError};
}
