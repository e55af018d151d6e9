//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use crate::logic::model::ClassifierStatus;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    timestamp: i64,
    policy: &'static str,
    history_size: usize,
    history_capacity: usize,
    classifier: ClassifierStatus,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let history = state.ingest.history();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        timestamp: chrono::Utc::now().timestamp(),
        policy: state.ingest.policy().policy.as_str(),
        history_size: history.len(),
        history_capacity: history.capacity(),
        classifier: state.ingest.classifier().status(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logic::model::ClassifierAdapter;

    #[test]
    fn test_health_without_model() {
        let state = AppState::with_classifier(Config::default(), ClassifierAdapter::disabled());
        let Json(health) = tokio_test::block_on(check(State(state)));

        assert_eq!(health.status, "healthy");
        assert_eq!(health.environment, "development");
        assert_eq!(health.history_size, 0);
        assert!(!health.classifier.loaded);
    }
}
