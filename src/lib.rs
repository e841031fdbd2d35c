//! Anemia Predictor Library
//!
//! Serves a pre-trained logistic regression model that classifies a blood
//! panel (gender, hemoglobin, MCH, MCHC, MCV) as anemia or no anemia:
//! - Model artifacts (feature scaler + classifier) loaded once at startup
//! - Web form and JSON API for predictions
//! - SQLite record of every prediction
//!
//! # Example
//!
//! ```ignore
//! use anemia_predictor::{Config, ModelArtifacts, Predictor, RecordStore};
//!
//! let config = Config::default();
//! let artifacts = ModelArtifacts::load(&config.model.scaler_path, &config.model.model_path)?;
//! let store = RecordStore::open(&config.storage.database_path)?;
//! let predictor = Predictor::new(artifacts, store);
//! ```

pub mod config;
pub mod model;
pub mod store;
pub mod prediction;
pub mod server;
pub mod cli;

pub use config::Config;

pub use model::{ArtifactError, LogisticRegression, ModelArtifacts, StandardScaler};

pub use prediction::{
    Diagnosis,
    Gender,
    InputError,
    Prediction,
    PredictionForm,
    PredictionInput,
    Predictor,
};

pub use store::{BootstrapOutcome, PredictionRecord, RecordStore};

pub use server::{router, ServerState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
