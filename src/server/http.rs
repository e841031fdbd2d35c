//! HTTP handlers

use axum::{
    extract::{Form, Json, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::prediction::{PredictionForm, PredictionInput};
use crate::server::page::{self, Notice};
use crate::server::ServerState;

/// Prediction response for the JSON API
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub id: i64,
    pub label: u8,
    pub result: String,
    pub probability: f64,
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub records: usize,
    pub anemia_records: usize,
    pub database: String,
    pub started_at: DateTime<Utc>,
}

/// `GET /`
pub async fn home_handler() -> Html<String> {
    Html(page::render(Notice::None))
}

/// `POST /predict`
pub async fn predict_handler(
    State(state): State<ServerState>,
    Form(form): Form<PredictionForm>,
) -> impl IntoResponse {
    let input = match validate(&form) {
        Ok(input) => input,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Html(page::render(Notice::Error(&message)))).into_response();
        }
    };

    match state.predictor.predict_and_record(&input).await {
        Ok(outcome) => {
            let text = outcome.prediction.diagnosis.result_text();
            (StatusCode::OK, Html(page::render(Notice::Result(&text)))).into_response()
        }
        Err(e) => {
            error!("Prediction failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(page::render(Notice::Error("Prediction could not be completed"))),
            )
                .into_response()
        }
    }
}

/// `POST /api/predict`, same form body as `/predict` with a JSON reply
pub async fn api_predict_handler(
    State(state): State<ServerState>,
    Form(form): Form<PredictionForm>,
) -> impl IntoResponse {
    let input = match validate(&form) {
        Ok(input) => input,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid prediction input",
                    "details": message
                })),
            )
                .into_response();
        }
    };

    match state.predictor.predict_and_record(&input).await {
        Ok(outcome) => {
            let diagnosis = outcome.prediction.diagnosis;
            let response = PredictResponse {
                id: outcome.id,
                label: diagnosis.label(),
                result: diagnosis.as_str().to_string(),
                probability: outcome.prediction.probability,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Prediction failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to record prediction",
                    "details": e.to_string()
                })),
            )
                .into_response()
        }
    }
}

/// `GET /api/status`
pub async fn status_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = match state.predictor.store().stats().await {
        Ok(stats) => stats,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Record store unavailable",
                    "details": e.to_string()
                })),
            )
                .into_response();
        }
    };

    let response = StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        records: stats.total_records,
        anemia_records: stats.anemia_records,
        database: state.config.storage.database_path.display().to_string(),
        started_at: state.started_at,
    };

    (StatusCode::OK, Json(response)).into_response()
}

fn validate(form: &PredictionForm) -> Result<PredictionInput, String> {
    form.validate().map_err(|e| {
        warn!("Rejected prediction input: {}", e);
        e.to_string()
    })
}
