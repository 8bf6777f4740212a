//! Batch training: load the source table, fit the model, write the artifact.

use thiserror::Error;
use tracing::info;

use crate::config::TrainingConfig;
use crate::data::{load_with_options, DataError, PreparedTable};
use crate::error::TsError;
use crate::model::{save_model, ArtifactError, FittedModel};

/// Errors raised by the training pipeline.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Model(#[from] TsError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Load the configured table and fit the configured model.
pub fn train(config: &TrainingConfig) -> Result<(FittedModel, PreparedTable), TrainError> {
    let (series, table) = load_with_options(&config.data_path, &config.loader)?;
    info!(
        order = ?config.sarima.order,
        seasonal_order = ?config.sarima.seasonal_order,
        "training seasonal ARIMA model"
    );
    let model = FittedModel::fit(&series, config.sarima.clone())?;
    Ok((model, table))
}

/// [`train`], then write the artifact to `config.model_path`.
pub fn train_and_save(config: &TrainingConfig) -> Result<FittedModel, TrainError> {
    let (model, _) = train(config)?;
    save_model(&model, &config.model_path)?;
    info!(path = %config.model_path.display(), "model successfully trained and saved");
    Ok(model)
}
