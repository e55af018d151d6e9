//! Model Module - fire classifier
//!
//! Artifact format and validation live in `artifact`, loading and scoring in
//! `inference`.

pub mod artifact;
pub mod inference;

pub use artifact::{ModelArtifact, ModelLoadError, TreeNode};
pub use inference::{
    ClassifierAdapter, ClassifierStatus, Features, FireModel, ModelError, ScoreError, FEATURE_COUNT,
};
