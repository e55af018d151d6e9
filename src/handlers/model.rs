//! Classifier management handlers

use axum::{extract::State, Json};

use crate::{AppState, AppResult};
use crate::logic::model::ClassifierStatus;

/// Re-read the model artifact without restarting
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<ClassifierStatus>> {
    let ingest = state.ingest.clone();
    let status = tokio::task::spawn_blocking(move || ingest.classifier().reload()).await?;
    Ok(Json(status))
}
