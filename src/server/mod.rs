//! Web server for the prediction form

pub mod http;
pub mod page;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::model::ModelArtifacts;
use crate::prediction::Predictor;
use crate::store::RecordStore;

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub predictor: Arc<Predictor>,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(config: Config, predictor: Predictor) -> Self {
        Self {
            config: Arc::new(config),
            predictor: Arc::new(predictor),
            started_at: Utc::now(),
        }
    }
}

/// Build the application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(http::home_handler))
        .route("/predict", post(http::predict_handler))
        .route("/api/predict", post(http::api_predict_handler))
        .route("/api/status", get(http::status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load the model, bootstrap the store and serve until Ctrl+C
pub async fn start(config: Config) -> Result<()> {
    let artifacts = ModelArtifacts::load(&config.model.scaler_path, &config.model.model_path)
        .context("Failed to load model artifacts")?;

    // Schema must exist before the listener accepts traffic
    let store = RecordStore::open(&config.storage.database_path)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = ServerState::new(config, Predictor::new(artifacts, store));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("     Anemia Predictor Server Starting");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("🚀 Listening on http://{}", addr);
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
