//! Fitted forecasting model and its persisted artifact

pub mod artifact;
pub mod fitted;

pub use artifact::{load_model, save_model, ArtifactError, FORMAT_VERSION};
pub use fitted::{FittedModel, ForecastPoint, ModelSummary};
