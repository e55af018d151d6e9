//! Event ingestion and history handlers

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{AppState, AppResult};
use crate::logic::{IngestOutcome, MODEL_NOT_TRAINED};
use crate::models::{ClassifiedEvent, RawReading, UpdateQuery};

/// Latest event, or the "awaiting data" placeholder
pub async fn last_event(State(state): State<AppState>) -> Json<ClassifiedEvent> {
    Json(state.ingest.latest())
}

/// Full history, oldest first
pub async fn history(State(state): State<AppState>) -> Json<Vec<ClassifiedEvent>> {
    Json(state.ingest.all())
}

/// Reading pushed by the device firmware as a query string
pub async fn update(
    State(state): State<AppState>,
    query: Result<Query<UpdateQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    tracing::debug!(
        "Update received: temp={:?} flame={:?} device={:?}",
        query.temp, query.flame, query.device
    );

    prime_classifier(&state).await?;
    let outcome = state.ingest.submit(&RawReading::from(query))?;
    Ok(respond(outcome))
}

/// Reading posted as JSON
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<RawReading>, JsonRejection>,
) -> AppResult<Response> {
    let Json(raw) = body?;
    prime_classifier(&state).await?;
    let outcome = state.ingest.submit(&raw)?;
    Ok(respond(outcome))
}

/// Run the one-time lazy model load off the async workers.
async fn prime_classifier(state: &AppState) -> AppResult<()> {
    if state.ingest.classifier().needs_lazy_load() {
        let ingest = state.ingest.clone();
        tokio::task::spawn_blocking(move || ingest.classifier().ensure_loaded()).await?;
    }
    Ok(())
}

fn respond(outcome: IngestOutcome) -> Response {
    match outcome {
        IngestOutcome::Classified(event) => Json(event).into_response(),
        IngestOutcome::ModelNotTrained => Json(json!({ "error": MODEL_NOT_TRAINED })).into_response(),
    }
}
