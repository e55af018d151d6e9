//! Classifier Adapter
//!
//! Owns the fire classifier loaded from the model artifact. The model is
//! loaded at startup when present, lazily on first use otherwise, and can be
//! swapped at runtime with [`ClassifierAdapter::reload`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::artifact::{ModelArtifact, ModelLoadError};

/// Model inputs: temperature (°C), humidity (%)
pub const FEATURE_COUNT: usize = 2;

pub type Features = [f64; FEATURE_COUNT];

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Errors raised inside a model
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("model does not provide probability estimates")]
    ProbaUnsupported,

    #[error("{0}")]
    Internal(String),
}

/// Outcome of a failed [`ClassifierAdapter::score`] call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("no classifier model is loaded")]
    Unavailable,

    #[error("scoring failed: {0}")]
    Failed(String),
}

impl From<ModelError> for ScoreError {
    fn from(err: ModelError) -> Self {
        ScoreError::Failed(err.to_string())
    }
}

// ============================================================================
// MODEL TRAIT
// ============================================================================

/// A binary fire classifier
pub trait FireModel: Send + Sync {
    fn kind(&self) -> &'static str;

    /// Probability of the fire class. Models that only classify keep the
    /// default.
    fn predict_proba(&self, _features: &Features) -> Result<f64, ModelError> {
        Err(ModelError::ProbaUnsupported)
    }

    /// Hard class: 1 = fire, 0 = no fire
    fn predict(&self, features: &Features) -> Result<u8, ModelError>;
}

// ============================================================================
// ADAPTER
// ============================================================================

#[derive(Clone)]
struct LoadedModel {
    model: Arc<dyn FireModel>,
    loaded_at: DateTime<Utc>,
}

/// Classifier status for the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierStatus {
    pub loaded: bool,
    pub kind: Option<String>,
    pub model_path: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub score_count: u64,
    pub failure_count: u64,
}

pub struct ClassifierAdapter {
    model_path: Option<PathBuf>,
    model: RwLock<Option<LoadedModel>>,
    scoring_budget: Duration,
    /// Set once the lazy load has been tried; cleared by `reload`
    lazy_attempted: AtomicBool,
    score_count: AtomicU64,
    failure_count: AtomicU64,
}

impl ClassifierAdapter {
    /// Adapter backed by an artifact file. Nothing is read until [`load`]
    /// or the first [`score`].
    ///
    /// [`load`]: ClassifierAdapter::load
    /// [`score`]: ClassifierAdapter::score
    pub fn new(model_path: impl Into<PathBuf>, scoring_budget: Duration) -> Self {
        Self {
            model_path: Some(model_path.into()),
            model: RwLock::new(None),
            scoring_budget,
            lazy_attempted: AtomicBool::new(false),
            score_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
        }
    }

    /// Adapter with no artifact; always unavailable.
    pub fn disabled() -> Self {
        Self {
            model_path: None,
            model: RwLock::new(None),
            scoring_budget: Duration::from_millis(5),
            lazy_attempted: AtomicBool::new(false),
            score_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
        }
    }

    /// Adapter wrapping an in-memory model
    pub fn with_model(model: Arc<dyn FireModel>) -> Self {
        let adapter = Self::disabled();
        *adapter.model.write() = Some(LoadedModel {
            model,
            loaded_at: Utc::now(),
        });
        adapter
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.read().is_some()
    }

    /// Read the artifact and swap it in. On failure the current model, if
    /// any, stays in place.
    pub fn load(&self) -> Result<(), ModelLoadError> {
        let path = self
            .model_path
            .as_deref()
            .ok_or_else(|| ModelLoadError::NotFound("no model path configured".into()))?;

        let artifact = ModelArtifact::from_file(path)?;
        let kind = artifact.kind();

        *self.model.write() = Some(LoadedModel {
            model: Arc::new(artifact),
            loaded_at: Utc::now(),
        });

        tracing::info!("Classifier loaded: {} from {}", kind, path.display());
        Ok(())
    }

    /// Reload the artifact, logging the outcome, and report the new status.
    /// Also re-arms the lazy load for the next score.
    pub fn reload(&self) -> ClassifierStatus {
        self.lazy_attempted.store(false, Ordering::Release);
        match self.load() {
            Ok(()) => {}
            Err(ModelLoadError::NotFound(path)) => {
                tracing::info!("Classifier reload skipped, artifact not found: {}", path);
            }
            Err(e) => tracing::warn!("Classifier reload failed: {}", e),
        }
        self.status()
    }

    /// Probability of fire for one reading
    pub fn score(&self, temperature: f64, humidity: f64) -> Result<f64, ScoreError> {
        let model = self.current_or_load().ok_or(ScoreError::Unavailable)?;

        let started = Instant::now();
        let result = score_with(model.as_ref(), &[temperature, humidity]);
        let elapsed = started.elapsed();

        self.score_count.fetch_add(1, Ordering::Relaxed);
        if result.is_err() {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }
        if elapsed > self.scoring_budget {
            tracing::warn!(
                "Slow scoring: {} took {:?} (budget {:?})",
                model.kind(), elapsed, self.scoring_budget
            );
        }

        result
    }

    pub fn status(&self) -> ClassifierStatus {
        let current = self.model.read().clone();
        ClassifierStatus {
            loaded: current.is_some(),
            kind: current.as_ref().map(|m| m.model.kind().to_string()),
            model_path: self.model_path.as_ref().map(|p| p.display().to_string()),
            loaded_at: current.map(|m| m.loaded_at),
            score_count: self.score_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
        }
    }

    /// True while no model is loaded and the lazy load is still pending.
    pub fn needs_lazy_load(&self) -> bool {
        self.model_path.is_some()
            && !self.lazy_attempted.load(Ordering::Acquire)
            && !self.is_loaded()
    }

    /// Try the lazy load once. Later calls touch the filesystem only after
    /// a [`reload`](ClassifierAdapter::reload).
    pub fn ensure_loaded(&self) -> bool {
        if self.is_loaded() {
            return true;
        }
        if self.model_path.is_none() || self.lazy_attempted.swap(true, Ordering::AcqRel) {
            return false;
        }

        match self.load() {
            Ok(()) => true,
            Err(ModelLoadError::NotFound(path)) => {
                tracing::debug!("No classifier artifact at {}", path);
                false
            }
            Err(e) => {
                tracing::warn!("Lazy classifier load failed: {}", e);
                false
            }
        }
    }

    /// Current model. The lock is released before the caller scores.
    fn current_or_load(&self) -> Option<Arc<dyn FireModel>> {
        if let Some(loaded) = self.model.read().as_ref() {
            return Some(Arc::clone(&loaded.model));
        }

        if !self.ensure_loaded() {
            return None;
        }
        self.model.read().as_ref().map(|loaded| Arc::clone(&loaded.model))
    }
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("model_path", &self.model_path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Probability if the model estimates one, otherwise class 1 → 1.0, class 0 → 0.0
fn score_with(model: &dyn FireModel, features: &Features) -> Result<f64, ScoreError> {
    let probability = match model.predict_proba(features) {
        Ok(p) => p,
        Err(ModelError::ProbaUnsupported) => match model.predict(features)? {
            1 => 1.0,
            _ => 0.0,
        },
        Err(e) => return Err(e.into()),
    };

    if !probability.is_finite() {
        return Err(ScoreError::Failed(format!("non-finite probability {}", probability)));
    }
    Ok(probability.clamp(0.0, 1.0))
}
