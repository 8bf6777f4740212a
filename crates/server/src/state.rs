//! Shared application state.

use std::path::Path;
use std::sync::Arc;

use co2_core::model::{load_model, ArtifactError, FittedModel};

/// State shared across handlers.
///
/// Holds at most one model, set when the state is built and never replaced.
#[derive(Clone, Default)]
pub struct AppState {
    model: Option<Arc<FittedModel>>,
}

impl AppState {
    /// State serving `model`.
    pub fn new(model: FittedModel) -> Self {
        Self {
            model: Some(Arc::new(model)),
        }
    }

    /// State with no model; forecasts report the service as not ready.
    pub fn unloaded() -> Self {
        Self { model: None }
    }

    /// Load the artifact at `path` and serve it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        load_model(path).map(Self::new)
    }

    /// The loaded model, if any.
    pub fn model(&self) -> Option<&FittedModel> {
        self.model.as_deref()
    }

    /// Whether a model is loaded.
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloaded_state() {
        let state = AppState::unloaded();
        assert!(!state.is_loaded());
        assert!(state.model().is_none());
    }

    #[test]
    fn test_load_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppState::load(dir.path().join("sarima_model.json"));
        assert!(matches!(result, Err(ArtifactError::NotFound { .. })));
    }
}
