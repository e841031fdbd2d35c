//! Prediction inputs and outcomes
//!
//! Turns the raw form fields into a validated, encoded feature vector and
//! maps classifier labels back to the text shown to the user.

pub mod predictor;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::model::FEATURE_COUNT;
use crate::store::NewRecord;

pub use predictor::{Prediction, PredictionOutcome, Predictor};

/// Encoded inputs in model order: gender, hemoglobin, mch, mchc, mcv
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Rejected form input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be a decimal number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field `{field}` must be a finite number")]
    NonFinite { field: &'static str },
}

/// Patient gender as the model encodes it
///
/// The model only distinguishes male from everything else, so `Female`
/// stands for "not Male": it also covers unrecognized and empty form values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Encode a form value. Only the exact string `"Male"` maps to `Male`;
    /// every other value, including the empty string, maps to `Female`.
    pub fn from_form(value: &str) -> Self {
        match value {
            "Male" => Gender::Male,
            "Female" => Gender::Female,
            other => {
                warn!("Unrecognized gender value {:?}, encoding as Female", other);
                Gender::Female
            }
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
        }
    }

    /// Decode a stored gender column
    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    /// Label for listings; code 1 is shown as "Female/other"
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female/other",
        }
    }
}

/// Classifier outcome as presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnosis {
    Anemia,
    NoAnemia,
}

impl Diagnosis {
    /// Label 1 is anemia; anything else is treated as the negative class
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Diagnosis::Anemia
        } else {
            Diagnosis::NoAnemia
        }
    }

    pub fn label(self) -> u8 {
        match self {
            Diagnosis::Anemia => 1,
            Diagnosis::NoAnemia => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Diagnosis::Anemia => "Anemia",
            Diagnosis::NoAnemia => "No Anemia",
        }
    }

    /// Text rendered on the result page
    pub fn result_text(self) -> String {
        format!("Result: {}", self.as_str())
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw fields of the prediction form, as submitted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionForm {
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub hemoglobin: Option<String>,
    #[serde(default)]
    pub mch: Option<String>,
    #[serde(default)]
    pub mchc: Option<String>,
    #[serde(default)]
    pub mcv: Option<String>,
}

impl PredictionForm {
    /// Parse and encode the submitted fields
    pub fn validate(&self) -> Result<PredictionInput, InputError> {
        let gender = self.gender.as_deref().ok_or(InputError::MissingField("gender"))?;

        Ok(PredictionInput {
            gender: Gender::from_form(gender),
            hemoglobin: parse_measurement("hemoglobin", self.hemoglobin.as_deref())?,
            mch: parse_measurement("mch", self.mch.as_deref())?,
            mchc: parse_measurement("mchc", self.mchc.as_deref())?,
            mcv: parse_measurement("mcv", self.mcv.as_deref())?,
        })
    }
}

fn parse_measurement(field: &'static str, raw: Option<&str>) -> Result<f64, InputError> {
    let raw = raw.ok_or(InputError::MissingField(field))?;

    let value: f64 = raw.trim().parse().map_err(|_| InputError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;

    if !value.is_finite() {
        return Err(InputError::NonFinite { field });
    }

    Ok(value)
}

/// Validated, encoded prediction input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub gender: Gender,
    pub hemoglobin: f64,
    pub mch: f64,
    pub mchc: f64,
    pub mcv: f64,
}

impl PredictionInput {
    pub fn features(&self) -> FeatureVector {
        [
            f64::from(self.gender.code()),
            self.hemoglobin,
            self.mch,
            self.mchc,
            self.mcv,
        ]
    }

    /// Build the row persisted for this input and its diagnosis
    pub fn to_record(&self, diagnosis: Diagnosis) -> NewRecord {
        NewRecord {
            gender: self.gender.code(),
            hemoglobin: self.hemoglobin,
            mch: self.mch,
            mchc: self.mchc,
            mcv: self.mcv,
            result: diagnosis.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(gender: &str, hemoglobin: &str) -> PredictionForm {
        PredictionForm {
            gender: Some(gender.to_string()),
            hemoglobin: Some(hemoglobin.to_string()),
            mch: Some("27.0".to_string()),
            mchc: Some("33.0".to_string()),
            mcv: Some("85.0".to_string()),
        }
    }

    #[test]
    fn test_gender_encoding() {
        assert_eq!(Gender::from_form("Male").code(), 0);
        assert_eq!(Gender::from_form("Female").code(), 1);
        assert_eq!(Gender::from_form("male").code(), 1);
        assert_eq!(Gender::from_form("").code(), 1);
        assert_eq!(Gender::from_form("Other").code(), 1);
    }

    #[test]
    fn test_stored_gender_label() {
        assert_eq!(Gender::from_code(0).label(), "Male");
        assert_eq!(Gender::from_code(1).label(), "Female/other");
        assert_eq!(Gender::from_code(Gender::from_form("").code()).label(), "Female/other");
    }

    #[test]
    fn test_diagnosis_mapping() {
        assert_eq!(Diagnosis::from_label(1), Diagnosis::Anemia);
        assert_eq!(Diagnosis::from_label(0), Diagnosis::NoAnemia);
        assert_eq!(Diagnosis::Anemia.result_text(), "Result: Anemia");
        assert_eq!(Diagnosis::NoAnemia.result_text(), "Result: No Anemia");
        assert_eq!(Diagnosis::NoAnemia.label(), 0);
    }

    #[test]
    fn test_validate_builds_feature_vector() {
        let input = form("Male", "13.5").validate().unwrap();
        assert_eq!(input.features(), [0.0, 13.5, 27.0, 33.0, 85.0]);
    }

    #[test]
    fn test_validate_trims_whitespace() {
        let input = form("Female", " 11.25 ").validate().unwrap();
        assert_eq!(input.hemoglobin, 11.25);
        assert_eq!(input.gender, Gender::Female);
    }

    #[test]
    fn test_validate_rejects_non_numeric() {
        let err = form("Male", "abc").validate().unwrap_err();
        assert_eq!(
            err,
            InputError::InvalidNumber {
                field: "hemoglobin",
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let err = form("Male", "NaN").validate().unwrap_err();
        assert_eq!(err, InputError::NonFinite { field: "hemoglobin" });

        let err = form("Male", "inf").validate().unwrap_err();
        assert_eq!(err, InputError::NonFinite { field: "hemoglobin" });
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let mut missing_mcv = form("Male", "13.5");
        missing_mcv.mcv = None;
        assert_eq!(missing_mcv.validate().unwrap_err(), InputError::MissingField("mcv"));

        let empty = PredictionForm::default();
        assert_eq!(empty.validate().unwrap_err(), InputError::MissingField("gender"));
    }

    #[test]
    fn test_to_record_copies_encoded_inputs() {
        let input = form("Male", "13.5").validate().unwrap();
        let record = input.to_record(Diagnosis::Anemia);
        assert_eq!(record.gender, 0);
        assert_eq!(record.hemoglobin, 13.5);
        assert_eq!(record.mcv, 85.0);
        assert_eq!(record.result, 1);
    }
}
