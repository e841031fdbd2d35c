//! Pre-fitted standard scaler

use serde::Deserialize;
use std::path::Path;

use super::{check_finite, read_artifact, to_features, ArtifactError, FEATURE_COUNT};

/// On-disk layout of the scaler artifact
#[derive(Debug, Deserialize)]
struct ScalerFile {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Mean/variance normalization fitted on the training set
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Build a scaler from fitted parameters.
    ///
    /// A zero scale marks a constant feature in the training data and is
    /// replaced by 1 so the feature is only centered.
    pub fn new(mean: [f64; FEATURE_COUNT], scale: [f64; FEATURE_COUNT]) -> Self {
        let scale = scale.map(|s| if s == 0.0 { 1.0 } else { s });
        Self { mean, scale }
    }

    /// Load the scaler artifact from a JSON file
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file: ScalerFile = read_artifact(path)?;

        let mean = to_features("scaler mean", file.mean)?;
        let scale = to_features("scaler scale", file.scale)?;
        check_finite("scaler", "mean", &mean)?;
        check_finite("scaler", "scale", &scale)?;

        Ok(Self::new(mean, scale))
    }

    pub fn mean(&self) -> &[f64; FEATURE_COUNT] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64; FEATURE_COUNT] {
        &self.scale
    }

    /// Apply `(x - mean) / scale` to every feature
    pub fn transform(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0; FEATURE_COUNT];
        for (i, value) in features.iter().enumerate() {
            scaled[i] = (value - self.mean[i]) / self.scale[i];
        }
        scaled
    }
}
