//! Event Normalizer
//!
//! Coerces raw inbound fields into a canonical [`Reading`]. Only type
//! coercion happens here: physically implausible values are accepted as-is.

use serde_json::Value;

use crate::models::{RawReading, Reading};

/// Default device tag used by the Pico W firmware
pub const DEFAULT_DEVICE_ID: &str = "pico_w";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("field '{0}' is required")]
    Missing(&'static str),

    #[error("field '{field}' must be {expected}, got {found}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
}

/// Values substituted for optional fields a device left out
#[derive(Debug, Clone, PartialEq)]
pub struct IngestDefaults {
    pub device_id: String,
    pub humidity: f64,
}

impl Default for IngestDefaults {
    fn default() -> Self {
        Self {
            device_id: DEFAULT_DEVICE_ID.to_string(),
            humidity: 0.0,
        }
    }
}

/// Validate and coerce a raw reading
pub fn normalize(raw: &RawReading, defaults: &IngestDefaults) -> Result<Reading, ValidationError> {
    let temperature = match present(&raw.temperature) {
        Some(value) => coerce_float("temperature", value)?,
        None => return Err(ValidationError::Missing("temperature")),
    };

    let flame = match present(&raw.flame) {
        Some(value) => coerce_int("flame", value)?,
        None => return Err(ValidationError::Missing("flame")),
    };

    let humidity = match present(&raw.humidity) {
        Some(value) => coerce_float("humidity", value)?,
        None => defaults.humidity,
    };

    let device_id = match present(&raw.device_id) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => return Err(invalid("device_id", "a string", other)),
        None => defaults.device_id.clone(),
    };

    Ok(Reading {
        temperature,
        humidity,
        flame,
        device_id,
    })
}

/// JSON `null` counts as absent
fn present(field: &Option<Value>) -> Option<&Value> {
    field.as_ref().filter(|v| !v.is_null())
}

fn coerce_float(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(field, "a number", value))
}

fn coerce_int(field: &'static str, value: &Value) -> Result<i64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(field, "an integer", value))
}

fn invalid(field: &'static str, expected: &'static str, value: &Value) -> ValidationError {
    ValidationError::Invalid {
        field,
        expected,
        found: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawReading {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_reading() {
        let reading = normalize(
            &raw(json!({"temperature": 27.5, "humidity": 61.0, "flame": 1, "device_id": "lab"})),
            &IngestDefaults::default(),
        ).unwrap();

        assert_eq!(reading.temperature, 27.5);
        assert_eq!(reading.humidity, 61.0);
        assert_eq!(reading.flame, 1);
        assert_eq!(reading.device_id, "lab");
    }

    #[test]
    fn test_optional_fields_take_defaults() {
        let defaults = IngestDefaults {
            device_id: "garage".to_string(),
            humidity: 45.0,
        };
        let reading = normalize(&raw(json!({"temperature": 20, "flame": 1})), &defaults).unwrap();
        assert_eq!(reading.humidity, 45.0);
        assert_eq!(reading.device_id, "garage");

        let reading = normalize(
            &raw(json!({"temperature": 20, "flame": 1, "humidity": null, "device_id": null})),
            &IngestDefaults::default(),
        ).unwrap();
        assert_eq!(reading.humidity, 0.0);
        assert_eq!(reading.device_id, DEFAULT_DEVICE_ID);
    }

    #[test]
    fn test_missing_required_fields() {
        let defaults = IngestDefaults::default();

        let err = normalize(&raw(json!({"flame": 1})), &defaults).unwrap_err();
        assert_eq!(err, ValidationError::Missing("temperature"));

        let err = normalize(&raw(json!({"temperature": 30.0})), &defaults).unwrap_err();
        assert_eq!(err, ValidationError::Missing("flame"));

        let err = normalize(&raw(json!({"temperature": null, "flame": 0})), &defaults).unwrap_err();
        assert_eq!(err, ValidationError::Missing("temperature"));
    }

    #[test]
    fn test_string_coercion() {
        let reading = normalize(
            &raw(json!({"temperature": " 33.25 ", "flame": "0", "humidity": "12"})),
            &IngestDefaults::default(),
        ).unwrap();

        assert_eq!(reading.temperature, 33.25);
        assert_eq!(reading.flame, 0);
        assert_eq!(reading.humidity, 12.0);
    }

    #[test]
    fn test_integral_float_flame_accepted() {
        let reading = normalize(
            &raw(json!({"temperature": 20, "flame": 1.0})),
            &IngestDefaults::default(),
        ).unwrap();
        assert_eq!(reading.flame, 1);
    }

    #[test]
    fn test_uncoercible_values_rejected() {
        let defaults = IngestDefaults::default();

        let cases = [
            (json!({"temperature": "hot", "flame": 1}), "temperature"),
            (json!({"temperature": true, "flame": 1}), "temperature"),
            (json!({"temperature": 20, "flame": 0.5}), "flame"),
            (json!({"temperature": 20, "flame": "yes"}), "flame"),
            (json!({"temperature": 20, "flame": [1]}), "flame"),
            (json!({"temperature": 20, "flame": 1, "humidity": {"v": 3}}), "humidity"),
            (json!({"temperature": 20, "flame": 1, "device_id": 7}), "device_id"),
        ];

        for (input, expected_field) in cases {
            match normalize(&raw(input.clone()), &defaults) {
                Err(ValidationError::Invalid { field, .. }) => assert_eq!(field, expected_field, "{}", input),
                other => panic!("expected invalid {} for {}, got {:?}", expected_field, input, other),
            }
        }
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        let reading = normalize(
            &raw(json!({"temperature": -273.5, "humidity": 250.0, "flame": 7})),
            &IngestDefaults::default(),
        ).unwrap();

        assert_eq!(reading.temperature, -273.5);
        assert_eq!(reading.humidity, 250.0);
        assert_eq!(reading.flame, 7);
    }
}
