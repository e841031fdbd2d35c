//! Pre-trained logistic regression classifier

use serde::Deserialize;
use std::path::Path;

use super::{check_finite, read_artifact, to_features, ArtifactError, FEATURE_COUNT};

#[derive(Debug, Deserialize)]
struct ClassifierFile {
    coefficients: Vec<f64>,
    intercept: f64,
}

/// Binary logistic regression over the scaled feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
}

impl LogisticRegression {
    pub fn new(coefficients: [f64; FEATURE_COUNT], intercept: f64) -> Self {
        Self { coefficients, intercept }
    }

    /// Load the classifier artifact from a JSON file
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file: ClassifierFile = read_artifact(path)?;

        let coefficients = to_features("classifier coefficients", file.coefficients)?;
        check_finite("classifier", "coefficients", &coefficients)?;
        check_finite("classifier", "intercept", &[file.intercept])?;

        Ok(Self::new(coefficients, file.intercept))
    }

    /// Signed distance to the decision boundary (`w·x + b`)
    pub fn decision(&self, scaled: &[f64; FEATURE_COUNT]) -> f64 {
        self.coefficients
            .iter()
            .zip(scaled.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }

    /// Probability of the positive (anemia) class
    pub fn probability(&self, scaled: &[f64; FEATURE_COUNT]) -> f64 {
        1.0 / (1.0 + (-self.decision(scaled)).exp())
    }

    /// Predicted label: 1 when the decision value is strictly positive, else 0
    pub fn predict(&self, scaled: &[f64; FEATURE_COUNT]) -> u8 {
        if self.decision(scaled) > 0.0 {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn hemoglobin_only() -> LogisticRegression {
        LogisticRegression::new([0.0, -2.0, 0.0, 0.0, 0.0], 0.0)
    }

    #[test]
    fn test_predict_sign_of_decision() {
        let model = hemoglobin_only();
        assert_eq!(model.predict(&[0.0, -1.0, 0.0, 0.0, 0.0]), 1);
        assert_eq!(model.predict(&[0.0, 1.0, 0.0, 0.0, 0.0]), 0);
    }

    #[test]
    fn test_boundary_is_negative_class() {
        let model = hemoglobin_only();
        assert_eq!(model.decision(&[0.0; FEATURE_COUNT]), 0.0);
        assert_eq!(model.predict(&[0.0; FEATURE_COUNT]), 0);
        assert!((model.probability(&[0.0; FEATURE_COUNT]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_probability_agrees_with_label() {
        let model = LogisticRegression::new([0.3, -4.1, 0.2, -0.6, 0.1], -0.4);
        let x = [1.0, -1.2, 0.4, -0.3, 0.8];
        let p = model.probability(&x);
        assert_eq!(model.predict(&x) == 1, p > 0.5);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogisticRegression::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { .. }));
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = LogisticRegression::load(file.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }
}
