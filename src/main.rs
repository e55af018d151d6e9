//! Fire Sentinel server binary

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fire_sentinel::{config::Config, create_router, logic::model::ModelLoadError, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Load configuration
    let config = Config::from_env();

    tracing::info!("Fire Sentinel starting ({})", config.environment);
    tracing::info!(
        "Policy: {}, threshold {}, fallback {}",
        config.status_policy.as_str(), config.fire_threshold, config.model_fallback
    );

    // Build application state
    let state = AppState::from_config(config.clone());

    // The model is optional at startup; scoring retries lazily.
    match state.ingest.classifier().load() {
        Ok(()) => {}
        Err(ModelLoadError::NotFound(path)) => {
            tracing::info!("No classifier artifact at {}, will load on first use", path);
        }
        Err(e) => tracing::warn!("Classifier not loaded: {}", e),
    }

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🔥 Dashboard listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}

/// JSON output in production, human-readable otherwise
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fire_sentinel=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("ENVIRONMENT").is_ok_and(|e| e == "production") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
