//! Ingestion Service
//!
//! normalize → score → flame override → append. Reads go straight to the
//! history store.

use std::sync::Arc;

use crate::models::{ClassifiedEvent, RawReading, Reading};

use super::history::HistoryStore;
use super::model::{ClassifierAdapter, ScoreError};
use super::normalizer::{normalize, IngestDefaults, ValidationError};
use super::policy::{PolicyConfig, StatusPolicy, Verdict};

/// Body returned when no model is loaded and fallback is disabled
pub const MODEL_NOT_TRAINED: &str = "Model not trained";

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Classified(ClassifiedEvent),
    /// Nothing was stored
    ModelNotTrained,
}

#[derive(Debug)]
pub struct IngestService {
    defaults: IngestDefaults,
    policy: PolicyConfig,
    classifier: Arc<ClassifierAdapter>,
    history: HistoryStore,
}

impl IngestService {
    pub fn new(
        defaults: IngestDefaults,
        policy: PolicyConfig,
        classifier: Arc<ClassifierAdapter>,
        history: HistoryStore,
    ) -> Self {
        Self {
            defaults,
            policy,
            classifier,
            history,
        }
    }

    /// Validate a raw reading and run it through the pipeline. A rejected
    /// reading leaves the history untouched.
    pub fn submit(&self, raw: &RawReading) -> Result<IngestOutcome, ValidationError> {
        let reading = normalize(raw, &self.defaults)?;
        Ok(self.ingest(reading))
    }

    pub fn ingest(&self, reading: Reading) -> IngestOutcome {
        let verdict = match self.decide(&reading) {
            Some(verdict) => verdict,
            None => return IngestOutcome::ModelNotTrained,
        };

        let event = ClassifiedEvent::new(reading, verdict.probability, verdict.flame_text, verdict.status);
        tracing::info!(
            "[{}] {} {:.1}C {:.1}% flame={} p={:.2} -> {}",
            event.timestamp, event.device_id, event.temperature, event.humidity,
            event.flame, event.probability, event.status
        );

        self.history.append(event.clone());
        IngestOutcome::Classified(event)
    }

    /// `None` means the model-gated policy has no model and may not fall
    /// back. That check comes before the flame override.
    fn decide(&self, reading: &Reading) -> Option<Verdict> {
        let policy = self.policy.policy;

        let score = match policy {
            StatusPolicy::TemperatureLinear => None,
            StatusPolicy::ModelGated => {
                match self.classifier.score(reading.temperature, reading.humidity) {
                    Err(ScoreError::Unavailable) if !self.policy.fallback_enabled => {
                        tracing::warn!("No classifier loaded and fallback disabled, reading from {} dropped", reading.device_id);
                        return None;
                    }
                    result => Some(result),
                }
            }
        };

        if reading.flame_detected() {
            return Some(Verdict::flame_confirmed(policy));
        }

        let verdict = match score {
            None => Verdict::temperature_linear(reading.temperature),
            Some(Ok(probability)) => Verdict::model_gated(probability, self.policy.threshold),
            Some(Err(ScoreError::Unavailable)) => {
                tracing::debug!("No classifier loaded, using temperature-linear fallback");
                Verdict::temperature_linear(reading.temperature)
            }
            Some(Err(e @ ScoreError::Failed(_))) => {
                tracing::warn!("{} for {}, scoring as 0.0", e, reading.device_id);
                Verdict::model_gated(0.0, self.policy.threshold)
            }
        };
        Some(verdict)
    }

    pub fn latest(&self) -> ClassifiedEvent {
        self.history.latest()
    }

    pub fn all(&self) -> Vec<ClassifiedEvent> {
        self.history.all()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn classifier(&self) -> &ClassifierAdapter {
        &self.classifier
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }
}
