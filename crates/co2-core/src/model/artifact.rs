//! Model artifact persistence.
//!
//! The fitted model is stored as a single JSON document:
//!
//! ```json
//! { "format_version": 1, "model": { ... } }
//! ```
//!
//! Writes go to a sibling temporary file that is renamed into place, so a
//! reader never observes a half-written artifact.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::fitted::FittedModel;
use crate::error::TsError;

/// Artifact layout version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// Errors raised while saving or loading an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No file at the given path
    #[error("Model artifact not found at {}", .path.display())]
    NotFound { path: PathBuf },

    /// File could not be read or written
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid artifact document
    #[error("Corrupt model artifact {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Artifact written by an incompatible version
    #[error("Unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Artifact decoded but the model inside is inconsistent
    #[error("Invalid model in artifact: {0}")]
    InvalidModel(#[from] TsError),

    /// Model could not be encoded
    #[error("Failed to encode model artifact: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Serialize)]
struct ArtifactRef<'a> {
    format_version: u32,
    model: &'a FittedModel,
}

#[derive(Deserialize)]
struct VersionProbe {
    format_version: u32,
}

#[derive(Deserialize)]
struct Artifact {
    model: FittedModel,
}

/// Write `model` to `path`.
pub fn save_model(model: &FittedModel, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
    let path = path.as_ref();
    let document = ArtifactRef {
        format_version: FORMAT_VERSION,
        model,
    };
    let bytes = serde_json::to_vec_pretty(&document).map_err(ArtifactError::Encode)?;

    let mut temp = OsString::from(path.as_os_str());
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, &bytes).map_err(|source| ArtifactError::Io {
        path: temp.clone(),
        source,
    })?;
    fs::rename(&temp, path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), bytes = bytes.len(), "model artifact saved");
    Ok(())
}

/// Read and validate the model stored at `path`.
pub fn load_model(path: impl AsRef<Path>) -> Result<FittedModel, ArtifactError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ArtifactError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let corrupt = |source: serde_json::Error| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        source,
    };
    let probe: VersionProbe = serde_json::from_slice(&bytes).map_err(corrupt)?;
    if probe.format_version != FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: probe.format_version,
            expected: FORMAT_VERSION,
        });
    }

    let artifact: Artifact = serde_json::from_slice(&bytes).map_err(corrupt)?;
    artifact.model.validate()?;

    debug!(path = %path.display(), n_obs = artifact.model.n_obs(), "model artifact loaded");
    Ok(artifact.model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::sarima::SarimaConfig;
    use crate::data::MonthlySeries;
    use chrono::NaiveDate;

    fn fitted() -> FittedModel {
        let values = (0..60)
            .map(|i| {
                let t = i as f64;
                320.0 + 0.1 * t + 3.0 * (t * std::f64::consts::PI / 6.0).cos() + 0.3 * (t * 0.9).sin()
            })
            .collect();
        let start = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let series = MonthlySeries::new(start, values).unwrap();
        FittedModel::fit(&series, SarimaConfig::co2_default()).unwrap()
    }

    #[test]
    fn test_save_then_load_preserves_forecasts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sarima_model.json");
        let model = fitted();

        save_model(&model, &path).unwrap();
        let loaded = load_model(&path).unwrap();

        assert_eq!(loaded.series_end(), model.series_end());
        let expected = model.forecast(12).unwrap();
        let actual = loaded.forecast(12).unwrap();
        for (a, e) in actual.iter().zip(&expected) {
            assert_eq!(a.date, e.date);
            assert!((a.value - e.value).abs() < 1e-9);
        }
        assert!(!dir.path().join("sarima_model.json.tmp").exists());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_model(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ArtifactError::NotFound { .. })));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(load_model(&path), Err(ArtifactError::Corrupt { .. })));
    }

    #[test]
    fn test_unsupported_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, br#"{ "format_version": 99, "model": {} }"#).unwrap();
        assert!(matches!(
            load_model(&path),
            Err(ArtifactError::UnsupportedVersion { found: 99, expected: FORMAT_VERSION })
        ));
    }

    #[test]
    fn test_unfitted_model_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = fitted();
        save_model(&model, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let tampered = text.replace("\"fitted\": true", "\"fitted\": false");
        assert_ne!(text, tampered);
        fs::write(&path, tampered).unwrap();

        assert!(matches!(load_model(&path), Err(ArtifactError::InvalidModel(TsError::NotFitted))));
    }
}
