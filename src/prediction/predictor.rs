//! Scale → classify → persist

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::{Diagnosis, FeatureVector, PredictionInput};
use crate::model::ModelArtifacts;
use crate::store::RecordStore;

/// Result of running the model on one input
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub diagnosis: Diagnosis,
    /// Probability of anemia from the classifier
    pub probability: f64,
}

impl Prediction {
    /// Run the scaler and classifier over the encoded input
    pub fn compute(artifacts: &ModelArtifacts, input: &PredictionInput) -> Self {
        let features: FeatureVector = input.features();
        let scaled = artifacts.scaler.transform(&features);
        debug!("Features {:?} scaled to {:?}", features, scaled);

        let classifier = &artifacts.classifier;
        Self {
            diagnosis: Diagnosis::from_label(classifier.predict(&scaled)),
            probability: classifier.probability(&scaled),
        }
    }
}

/// A prediction that has been persisted
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub id: i64,
    pub prediction: Prediction,
}

/// Runs the loaded model and records every prediction
///
/// Shared read-only between requests; the only mutable resource is the
/// store connection, which serializes writes internally.
pub struct Predictor {
    artifacts: Arc<ModelArtifacts>,
    store: Arc<RecordStore>,
}

impl Predictor {
    pub fn new(artifacts: ModelArtifacts, store: RecordStore) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
            store: Arc::new(store),
        }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Scale and classify without touching the store
    pub fn predict(&self, input: &PredictionInput) -> Prediction {
        Prediction::compute(&self.artifacts, input)
    }

    /// Predict and insert one record for the result
    pub async fn predict_and_record(&self, input: &PredictionInput) -> Result<PredictionOutcome> {
        let prediction = self.predict(input);
        let id = self.store.insert(&input.to_record(prediction.diagnosis)).await?;

        info!(
            "Prediction {}: {} (p={:.3})",
            id, prediction.diagnosis, prediction.probability
        );

        Ok(PredictionOutcome { id, prediction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogisticRegression, StandardScaler};
    use crate::prediction::Gender;

    /// Anemia whenever hemoglobin is below 12
    fn threshold_artifacts() -> ModelArtifacts {
        ModelArtifacts::new(
            StandardScaler::new([0.0; 5], [1.0; 5]),
            LogisticRegression::new([0.0, -1.0, 0.0, 0.0, 0.0], 12.0),
        )
    }

    fn input(hemoglobin: f64) -> PredictionInput {
        PredictionInput {
            gender: Gender::Male,
            hemoglobin,
            mch: 27.0,
            mchc: 33.0,
            mcv: 85.0,
        }
    }

    #[tokio::test]
    async fn test_predict_and_record_persists_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("test.db")).unwrap();
        let predictor = Predictor::new(threshold_artifacts(), store);

        let outcome = predictor.predict_and_record(&input(13.5)).await.unwrap();
        assert_eq!(outcome.prediction.diagnosis, Diagnosis::NoAnemia);

        let record = predictor.store().get(outcome.id).await.unwrap().unwrap();
        assert_eq!(record.gender, 0);
        assert_eq!(record.hemoglobin, 13.5);
        assert_eq!(record.mch, 27.0);
        assert_eq!(record.mchc, 33.0);
        assert_eq!(record.mcv, 85.0);
        assert_eq!(record.result, 0);
    }

    #[tokio::test]
    async fn test_low_hemoglobin_is_anemia() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("test.db")).unwrap();
        let predictor = Predictor::new(threshold_artifacts(), store);

        let prediction = predictor.predict(&input(9.0));
        assert_eq!(prediction.diagnosis, Diagnosis::Anemia);
        assert!(prediction.probability > 0.5);

        // predict alone never writes
        assert_eq!(predictor.store().count().await.unwrap(), 0);
    }
}
