//! Classified event model

use serde::{Deserialize, Serialize};

use super::reading::{Reading, FLAME_NORMAL};

pub const FLAME_TEXT_DETECTED: &str = "Fogo detectado";
pub const FLAME_TEXT_NORMAL: &str = "Normal";

pub const STATUS_NORMAL: &str = "Sistema Normal";
pub const STATUS_AWAITING_DATA: &str = "Aguardando Dados";

/// Device id reported by the empty-history placeholder
pub const NO_DEVICE: &str = "none";

/// A reading enriched with its fire probability and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    pub timestamp: String,
    pub temperature: f64,
    pub humidity: f64,
    pub flame: i64,
    pub flame_text: String,
    pub probability: f64,
    pub status: String,
    pub device_id: String,
}

impl ClassifiedEvent {
    pub fn new(reading: Reading, probability: f64, flame_text: &str, status: &str) -> Self {
        Self {
            timestamp: clock_time(),
            temperature: reading.temperature,
            humidity: reading.humidity,
            flame: reading.flame,
            flame_text: flame_text.to_string(),
            probability,
            status: status.to_string(),
            device_id: reading.device_id,
        }
    }

    /// Placeholder returned while the history is still empty.
    pub fn awaiting_data() -> Self {
        Self {
            timestamp: clock_time(),
            temperature: 0.0,
            humidity: 0.0,
            flame: FLAME_NORMAL,
            flame_text: FLAME_TEXT_NORMAL.to_string(),
            probability: 0.0,
            status: STATUS_AWAITING_DATA.to_string(),
            device_id: NO_DEVICE.to_string(),
        }
    }
}

/// Local wall-clock time as `HH:MM:SS`
pub fn clock_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
