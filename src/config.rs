//! Configuration module

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::logic::history::DEFAULT_CAPACITY;
use crate::logic::normalizer::DEFAULT_DEVICE_ID;
use crate::logic::{IngestDefaults, PolicyConfig, StatusPolicy};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Classifier artifact exported by the training job
    pub model_path: String,

    /// Status policy (model-gated or temperature-linear)
    pub status_policy: StatusPolicy,

    /// Model-gated fire threshold
    pub fire_threshold: f64,

    /// Use the temperature-linear policy while no model is loaded
    pub model_fallback: bool,

    /// Maximum number of events kept in memory
    pub history_capacity: usize,

    /// Device id assumed when a reading omits it
    pub default_device_id: String,

    /// Humidity assumed when a reading omits it
    pub default_humidity: f64,

    /// Scoring calls slower than this are logged
    pub scoring_budget_ms: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults for
    /// absent or unparsable values.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            port: parsed(&var, "PORT").unwrap_or(5000),

            model_path: var("MODEL_PATH")
                .unwrap_or_else(|| "ai/fire_model.json".to_string()),

            status_policy: var("STATUS_POLICY")
                .and_then(|v| match StatusPolicy::from_str(&v) {
                    Ok(policy) => Some(policy),
                    Err(e) => {
                        tracing::warn!("{}, using model-gated", e);
                        None
                    }
                })
                .unwrap_or(StatusPolicy::ModelGated),

            fire_threshold: parsed(&var, "FIRE_THRESHOLD")
                .filter(|t: &f64| (0.0..=1.0).contains(t))
                .unwrap_or(0.7),

            model_fallback: var("MODEL_FALLBACK")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),

            history_capacity: parsed(&var, "HISTORY_CAPACITY")
                .filter(|c: &usize| *c > 0)
                .unwrap_or(DEFAULT_CAPACITY),

            default_device_id: var("DEFAULT_DEVICE_ID")
                .unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string()),

            default_humidity: parsed(&var, "DEFAULT_HUMIDITY").unwrap_or(0.0),

            scoring_budget_ms: parsed(&var, "SCORING_BUDGET_MS").unwrap_or(5),

            environment: var("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn ingest_defaults(&self) -> IngestDefaults {
        IngestDefaults {
            device_id: self.default_device_id.clone(),
            humidity: self.default_humidity,
        }
    }

    pub fn policy_config(&self) -> PolicyConfig {
        PolicyConfig {
            policy: self.status_policy,
            threshold: self.fire_threshold,
            fallback_enabled: self.model_fallback,
        }
    }

    pub fn scoring_budget(&self) -> Duration {
        Duration::from_millis(self.scoring_budget_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

fn parsed<T, F>(var: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key).and_then(|v| v.trim().parse().ok())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.model_path, "ai/fire_model.json");
        assert_eq!(config.status_policy, StatusPolicy::ModelGated);
        assert_eq!(config.fire_threshold, 0.7);
        assert!(config.model_fallback);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.default_device_id, "pico_w");
        assert_eq!(config.default_humidity, 0.0);
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("PORT", "8080"),
            ("STATUS_POLICY", "temperature"),
            ("FIRE_THRESHOLD", "0.55"),
            ("MODEL_FALLBACK", "off"),
            ("HISTORY_CAPACITY", "25"),
            ("DEFAULT_DEVICE_ID", "esp32"),
            ("ENVIRONMENT", "production"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.status_policy, StatusPolicy::TemperatureLinear);
        assert_eq!(config.fire_threshold, 0.55);
        assert!(!config.model_fallback);
        assert_eq!(config.history_capacity, 25);
        assert_eq!(config.ingest_defaults().device_id, "esp32");
        assert!(config.is_production());

        let policy = config.policy_config();
        assert_eq!(policy.threshold, 0.55);
        assert!(!policy.fallback_enabled);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_map(&[
            ("PORT", "http"),
            ("STATUS_POLICY", "astrology"),
            ("FIRE_THRESHOLD", "1.5"),
            ("MODEL_FALLBACK", "maybe"),
            ("HISTORY_CAPACITY", "0"),
        ]);

        assert_eq!(config.port, 5000);
        assert_eq!(config.status_policy, StatusPolicy::ModelGated);
        assert_eq!(config.fire_threshold, 0.7);
        assert!(config.model_fallback);
        assert_eq!(config.history_capacity, 100);
    }
}
