//! Model artifacts: the fitted feature scaler and the logistic regression classifier
//!
//! Both artifacts are produced outside this program and loaded once at
//! startup. After loading they are plain immutable values; any failure while
//! reading them is fatal.

pub mod classifier;
pub mod scaler;

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub use classifier::LogisticRegression;
pub use scaler::StandardScaler;

/// Number of input features the artifacts were fitted on
pub const FEATURE_COUNT: usize = 5;

/// Feature names in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["gender", "hemoglobin", "mch", "mchc", "mcv"];

/// Errors raised while loading a model artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{artifact} expects {expected} features, found {found}")]
    FeatureCount {
        artifact: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{artifact} parameter `{name}` is not finite")]
    NonFinite {
        artifact: &'static str,
        name: &'static str,
    },
}

/// The scaler and classifier, loaded together
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub scaler: StandardScaler,
    pub classifier: LogisticRegression,
}

impl ModelArtifacts {
    pub fn new(scaler: StandardScaler, classifier: LogisticRegression) -> Self {
        Self { scaler, classifier }
    }

    /// Load both artifacts from their JSON files
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, ArtifactError> {
        let scaler = StandardScaler::load(scaler_path)?;
        let classifier = LogisticRegression::load(model_path)?;

        info!(
            "Loaded model artifacts (scaler: {}, classifier: {})",
            scaler_path.display(),
            model_path.display()
        );

        Ok(Self::new(scaler, classifier))
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing { path: path.to_path_buf() }
        } else {
            ArtifactError::Io { path: path.to_path_buf(), source }
        }
    })?;

    serde_json::from_str(&contents).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn to_features(artifact: &'static str, values: Vec<f64>) -> Result<[f64; FEATURE_COUNT], ArtifactError> {
    let found = values.len();
    values.try_into().map_err(|_| ArtifactError::FeatureCount {
        artifact,
        expected: FEATURE_COUNT,
        found,
    })
}

fn check_finite(artifact: &'static str, name: &'static str, values: &[f64]) -> Result<(), ArtifactError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ArtifactError::NonFinite { artifact, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let scaler = write(dir.path(), "scaler.json", r#"{"mean": [0, 0, 0, 0, 0], "scale": [1, 1, 1, 1, 1]}"#);
        let model = write(dir.path(), "model.json", r#"{"coefficients": [0, -1, 0, 0, 0], "intercept": 12.0}"#);

        let artifacts = ModelArtifacts::load(&scaler, &model).unwrap();
        let scaled = artifacts.scaler.transform(&[0.0, 10.0, 0.0, 0.0, 0.0]);
        assert_eq!(artifacts.classifier.predict(&scaled), 1);
    }

    #[test]
    fn test_missing_classifier_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let scaler = write(dir.path(), "scaler.json", r#"{"mean": [0, 0, 0, 0, 0], "scale": [1, 1, 1, 1, 1]}"#);

        let err = ModelArtifacts::load(&scaler, &dir.path().join("model.json")).unwrap_err();
        assert!(err.to_string().contains("artifact not found"));
    }

    #[test]
    fn test_incompatible_classifier_shape() {
        let dir = tempfile::tempdir().unwrap();
        let scaler = write(dir.path(), "scaler.json", r#"{"mean": [0, 0, 0, 0, 0], "scale": [1, 1, 1, 1, 1]}"#);
        let model = write(dir.path(), "model.json", r#"{"coefficients": [1, 2, 3, 4, 5, 6], "intercept": 0}"#);

        let err = ModelArtifacts::load(&scaler, &model).unwrap_err();
        assert!(matches!(err, ArtifactError::FeatureCount { found: 6, .. }));
    }

    #[test]
    fn test_non_finite_parameters_rejected() {
        assert!(check_finite("scaler", "mean", &[1.0, f64::NAN]).is_err());
        assert!(check_finite("scaler", "mean", &[1.0, 2.0]).is_ok());
    }
}
