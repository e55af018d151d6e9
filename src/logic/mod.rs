//! Ingestion pipeline

pub mod history;
pub mod ingest;
pub mod model;
pub mod normalizer;
pub mod policy;

pub use history::HistoryStore;
pub use ingest::{IngestOutcome, IngestService, MODEL_NOT_TRAINED};
pub use normalizer::{IngestDefaults, ValidationError};
pub use policy::{PolicyConfig, StatusPolicy};
