//! Training configuration types.

use std::path::{Path, PathBuf};

use crate::algorithms::sarima::SarimaConfig;
use crate::data::LoaderOptions;

/// Source table read by the training step.
pub const DEFAULT_DATA_FILE: &str = "monthly_flask_co2_mlo.csv";

/// Artifact written by training and read by the prediction service.
pub const DEFAULT_MODEL_PATH: &str = "sarima_model.json";

/// Configuration for one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Source table
    pub data_path: PathBuf,
    /// Where the fitted model is written
    pub model_path: PathBuf,
    /// Model specification
    pub sarima: SarimaConfig,
    /// Loader behaviour
    pub loader: LoaderOptions,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            sarima: SarimaConfig::co2_default(),
            loader: LoaderOptions::default(),
        }
    }
}

impl TrainingConfig {
    /// Create a configuration with the default model and loader settings.
    pub fn new(data_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Self {
        Self {
            data_path: data_path.as_ref().to_path_buf(),
            model_path: model_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Start a builder from the defaults.
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::new()
    }
}

/// Builder for TrainingConfig.
#[derive(Debug, Default)]
pub struct TrainingConfigBuilder {
    data_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    sarima: Option<SarimaConfig>,
    loader: Option<LoaderOptions>,
}

impl TrainingConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source table.
    pub fn data_path(mut self, path: impl AsRef<Path>) -> Self {
        self.data_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the artifact path.
    pub fn model_path(mut self, path: impl AsRef<Path>) -> Self {
        self.model_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the model specification.
    pub fn sarima(mut self, sarima: SarimaConfig) -> Self {
        self.sarima = Some(sarima);
        self
    }

    /// Set the loader options.
    pub fn loader(mut self, loader: LoaderOptions) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Build the configuration, filling unset fields with defaults.
    pub fn build(self) -> TrainingConfig {
        let defaults = TrainingConfig::default();
        TrainingConfig {
            data_path: self.data_path.unwrap_or(defaults.data_path),
            model_path: self.model_path.unwrap_or(defaults.model_path),
            sarima: self.sarima.unwrap_or(defaults.sarima),
            loader: self.loader.unwrap_or(defaults.loader),
        }
    }
}
