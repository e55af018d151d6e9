//! HTTP handlers

pub mod health;
pub mod events;
pub mod dashboard;
pub mod model;
