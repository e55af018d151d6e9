//! Fire Sentinel
//!
//! Ingestion server for IoT fire-risk readings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FIRE SENTINEL                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  device ──► /update, /predict ──► IngestService             │
//! │                                      │                      │
//! │             ┌────────────┬───────────┼─────────────┐        │
//! │             ▼            ▼           ▼             ▼        │
//! │        Normalizer   Classifier   StatusPolicy  HistoryStore │
//! │                     (artifact)                 (≤ N events) │
//! │                                                    │        │
//! │  dashboard ◄── /, /last_event, /history ◄──────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use error::{AppError, AppResult};

use crate::config::Config;
use crate::logic::{model::ClassifierAdapter, HistoryStore, IngestService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<IngestService>,
    pub config: Config,
}

impl AppState {
    /// Build the pipeline described by `config`. The model artifact is not
    /// read here; see [`ClassifierAdapter::load`].
    pub fn from_config(config: Config) -> Self {
        let classifier = ClassifierAdapter::new(&config.model_path, config.scoring_budget());
        Self::with_classifier(config, classifier)
    }

    pub fn with_classifier(config: Config, classifier: ClassifierAdapter) -> Self {
        let ingest = IngestService::new(
            config.ingest_defaults(),
            config.policy_config(),
            Arc::new(classifier),
            HistoryStore::new(config.history_capacity),
        );

        Self {
            ingest: Arc::new(ingest),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Dashboard
        .route("/", get(handlers::dashboard::index))

        // Events
        .route("/last_event", get(handlers::events::last_event))
        .route("/history", get(handlers::events::history))
        .route("/update", get(handlers::events::update))
        .route("/predict", post(handlers::events::predict))

        // Service
        .route("/health", get(handlers::health::check))
        .route("/model/reload", post(handlers::model::reload))

        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
