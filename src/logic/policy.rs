//! Status Policy
//!
//! Turns a probability into the labels stored with an event. Two deployment
//! variants exist; one is selected at startup.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{FLAME_TEXT_DETECTED, FLAME_TEXT_NORMAL, STATUS_NORMAL};

pub const STATUS_FIRE: &str = "Incêndio";
pub const STATUS_FIRE_CONFIRMED: &str = "INCÊNDIO CONFIRMADO";
pub const STATUS_FIRE_ALERT: &str = "ALERTA DE INCÊNDIO";

/// Probability assigned by the temperature-linear variant at or below 30 °C
pub const LINEAR_BASELINE: f64 = 0.05;
const LINEAR_ONSET_C: f64 = 30.0;
const LINEAR_SPAN_C: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Classifier probability compared against a threshold
    ModelGated,
    /// Probability derived from temperature alone
    TemperatureLinear,
}

impl StatusPolicy {
    /// Status used when the flame sensor fires
    pub fn fire_confirmed_label(self) -> &'static str {
        match self {
            StatusPolicy::ModelGated => STATUS_FIRE_CONFIRMED,
            StatusPolicy::TemperatureLinear => STATUS_FIRE_ALERT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusPolicy::ModelGated => "model_gated",
            StatusPolicy::TemperatureLinear => "temperature_linear",
        }
    }
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" | "model_gated" | "model-gated" => Ok(StatusPolicy::ModelGated),
            "temperature" | "temperature_linear" | "temperature-linear" | "linear" => {
                Ok(StatusPolicy::TemperatureLinear)
            }
            other => Err(format!("unknown status policy '{}'", other)),
        }
    }
}

/// Policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub policy: StatusPolicy,

    /// Model-gated fire threshold (0.0 - 1.0), exclusive
    pub threshold: f64,

    /// Fall back to the temperature-linear variant when no model is loaded
    pub fallback_enabled: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            policy: StatusPolicy::ModelGated,
            threshold: 0.7,
            fallback_enabled: true,
        }
    }
}

/// Final probability and labels for one reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub probability: f64,
    pub flame_text: &'static str,
    pub status: &'static str,
}

impl Verdict {
    /// Flame override: direct detection beats any score.
    pub fn flame_confirmed(policy: StatusPolicy) -> Self {
        Self {
            probability: 1.0,
            flame_text: FLAME_TEXT_DETECTED,
            status: policy.fire_confirmed_label(),
        }
    }

    pub fn model_gated(probability: f64, threshold: f64) -> Self {
        Self {
            probability,
            flame_text: FLAME_TEXT_NORMAL,
            status: if probability > threshold { STATUS_FIRE } else { STATUS_NORMAL },
        }
    }

    pub fn temperature_linear(temperature: f64) -> Self {
        Self {
            probability: linear_probability(temperature),
            flame_text: FLAME_TEXT_NORMAL,
            status: STATUS_NORMAL,
        }
    }
}

/// `clamp((t - 30) / 20, 0, 1)` above 30 °C, baseline otherwise.
pub fn linear_probability(temperature: f64) -> f64 {
    if temperature > LINEAR_ONSET_C {
        ((temperature - LINEAR_ONSET_C) / LINEAR_SPAN_C).clamp(0.0, 1.0)
    } else {
        LINEAR_BASELINE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_probability_points() {
        assert_eq!(linear_probability(30.0), LINEAR_BASELINE);
        assert_eq!(linear_probability(-10.0), LINEAR_BASELINE);
        assert_eq!(linear_probability(40.0), 0.5);
        assert_eq!(linear_probability(50.0), 1.0);
        assert_eq!(linear_probability(500.0), 1.0);
        assert_eq!(linear_probability(f64::NAN), LINEAR_BASELINE);
    }

    #[test]
    fn test_model_gated_threshold_is_exclusive() {
        assert_eq!(Verdict::model_gated(0.7, 0.7).status, STATUS_NORMAL);
        assert_eq!(Verdict::model_gated(0.71, 0.7).status, STATUS_FIRE);
        assert_eq!(Verdict::model_gated(0.0, 0.7).flame_text, FLAME_TEXT_NORMAL);
    }

    #[test]
    fn test_flame_confirmed_labels() {
        let verdict = Verdict::flame_confirmed(StatusPolicy::ModelGated);
        assert_eq!(verdict.probability, 1.0);
        assert_eq!(verdict.flame_text, FLAME_TEXT_DETECTED);
        assert_eq!(verdict.status, STATUS_FIRE_CONFIRMED);

        let verdict = Verdict::flame_confirmed(StatusPolicy::TemperatureLinear);
        assert_eq!(verdict.status, STATUS_FIRE_ALERT);
    }

    #[test]
    fn test_temperature_linear_never_alerts_without_flame() {
        let verdict = Verdict::temperature_linear(90.0);
        assert_eq!(verdict.probability, 1.0);
        assert_eq!(verdict.status, STATUS_NORMAL);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("model".parse::<StatusPolicy>(), Ok(StatusPolicy::ModelGated));
        assert_eq!("Temperature-Linear".parse::<StatusPolicy>(), Ok(StatusPolicy::TemperatureLinear));
        assert!("quantum".parse::<StatusPolicy>().is_err());
    }
}
