//! Sensor reading model

use serde::Deserialize;
use serde_json::Value;

/// Flame sensor code for "flame detected". The sensor pulls its line low.
pub const FLAME_DETECTED: i64 = 0;

/// Flame sensor code for "no flame".
pub const FLAME_NORMAL: i64 = 1;

/// Fields exactly as a device sent them, before coercion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReading {
    #[serde(default)]
    pub temperature: Option<Value>,
    #[serde(default)]
    pub humidity: Option<Value>,
    #[serde(default)]
    pub flame: Option<Value>,
    #[serde(default)]
    pub device_id: Option<Value>,
}

/// Query string of `GET /update`, as sent by the Pico firmware.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuery {
    pub temp: Option<String>,
    pub flame: Option<String>,
    pub device: Option<String>,
    pub humidity: Option<String>,
}

impl From<UpdateQuery> for RawReading {
    fn from(query: UpdateQuery) -> Self {
        Self {
            temperature: query.temp.map(Value::String),
            humidity: query.humidity.map(Value::String),
            flame: query.flame.map(Value::String),
            device_id: query.device.map(Value::String),
        }
    }
}

/// Canonical reading produced by the normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub temperature: f64,
    pub humidity: f64,
    pub flame: i64,
    pub device_id: String,
}

impl Reading {
    pub fn flame_detected(&self) -> bool {
        self.flame == FLAME_DETECTED
    }
}
