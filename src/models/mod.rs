//! Data models

pub mod reading;
pub mod event;

pub use reading::*;
pub use event::*;
