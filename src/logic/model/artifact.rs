//! Model Artifact - serialized classifier exported by the training job
//!
//! The artifact is a JSON document tagged by `kind`:
//!
//! ```json
//! {"kind": "decision_tree", "nodes": [
//!     {"feature": 0, "threshold": 40.0, "left": 1, "right": 2},
//!     {"value": [90.0, 10.0]},
//!     {"value": [5.0, 95.0]}
//! ]}
//! ```
//!
//! Feature 0 is temperature (°C), feature 1 is humidity (%).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::inference::{Features, FireModel, ModelError, FEATURE_COUNT};

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model artifact not found: {0}")]
    NotFound(String),

    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// Decision tree node, scikit-learn layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// `x[feature] <= threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Training class counts `[no_fire, fire]`
    Leaf { value: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    DecisionTree {
        nodes: Vec<TreeNode>,
    },
    LogisticRegression {
        coefficients: [f64; FEATURE_COUNT],
        intercept: f64,
    },
    /// Hard classifier without probability estimates
    LinearSvm {
        coefficients: [f64; FEATURE_COUNT],
        intercept: f64,
    },
}

impl ModelArtifact {
    pub fn from_file(path: &Path) -> Result<Self, ModelLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ModelLoadError::NotFound(path.display().to_string())
            } else {
                ModelLoadError::Io {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ModelLoadError> {
        let artifact: Self = serde_json::from_str(content)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Structural checks. For trees, every child index must be greater than
    /// its parent's, so traversal visits at most `nodes.len()` nodes.
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        match self {
            ModelArtifact::DecisionTree { nodes } => {
                if nodes.is_empty() {
                    return Err(ModelLoadError::Invalid("decision tree has no nodes".into()));
                }
                for (i, node) in nodes.iter().enumerate() {
                    match node {
                        TreeNode::Split { feature, threshold, left, right } => {
                            if *feature >= FEATURE_COUNT {
                                return Err(ModelLoadError::Invalid(format!(
                                    "node {}: feature index {} out of range", i, feature
                                )));
                            }
                            if !threshold.is_finite() {
                                return Err(ModelLoadError::Invalid(format!(
                                    "node {}: threshold is not finite", i
                                )));
                            }
                            for child in [*left, *right] {
                                if child <= i || child >= nodes.len() {
                                    return Err(ModelLoadError::Invalid(format!(
                                        "node {}: child index {} must be in {}..{}",
                                        i, child, i + 1, nodes.len()
                                    )));
                                }
                            }
                        }
                        TreeNode::Leaf { value } => {
                            if value.iter().any(|v| !v.is_finite() || *v < 0.0) || value.iter().sum::<f64>() <= 0.0 {
                                return Err(ModelLoadError::Invalid(format!(
                                    "node {}: leaf counts must be non-negative with a positive total", i
                                )));
                            }
                        }
                    }
                }
                Ok(())
            }
            ModelArtifact::LogisticRegression { coefficients, intercept }
            | ModelArtifact::LinearSvm { coefficients, intercept } => {
                if coefficients.iter().chain(std::iter::once(intercept)).all(|v| v.is_finite()) {
                    Ok(())
                } else {
                    Err(ModelLoadError::Invalid("linear model weights must be finite".into()))
                }
            }
        }
    }
}

fn tree_leaf(nodes: &[TreeNode], features: &Features) -> Result<[f64; 2], ModelError> {
    let mut index = 0;
    // Bounded by the child-index ordering checked in `validate`
    for _ in 0..nodes.len() {
        match nodes.get(index) {
            Some(TreeNode::Split { feature, threshold, left, right }) => {
                let x = features.get(*feature).ok_or_else(|| {
                    ModelError::Internal(format!("node {}: feature index {} out of range", index, feature))
                })?;
                index = if *x <= *threshold { *left } else { *right };
            }
            Some(TreeNode::Leaf { value }) => return Ok(*value),
            None => return Err(ModelError::Internal(format!("node {} does not exist", index))),
        }
    }
    Err(ModelError::Internal("tree traversal did not reach a leaf".into()))
}

fn linear_decision(coefficients: &[f64; FEATURE_COUNT], intercept: f64, features: &Features) -> f64 {
    coefficients.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + intercept
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl FireModel for ModelArtifact {
    fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::DecisionTree { .. } => "decision_tree",
            ModelArtifact::LogisticRegression { .. } => "logistic_regression",
            ModelArtifact::LinearSvm { .. } => "linear_svm",
        }
    }

    fn predict_proba(&self, features: &Features) -> Result<f64, ModelError> {
        match self {
            ModelArtifact::DecisionTree { nodes } => {
                let [negatives, positives] = tree_leaf(nodes, features)?;
                Ok(positives / (negatives + positives))
            }
            ModelArtifact::LogisticRegression { coefficients, intercept } => {
                Ok(sigmoid(linear_decision(coefficients, *intercept, features)))
            }
            ModelArtifact::LinearSvm { .. } => Err(ModelError::ProbaUnsupported),
        }
    }

    fn predict(&self, features: &Features) -> Result<u8, ModelError> {
        match self {
            ModelArtifact::LinearSvm { coefficients, intercept } => {
                let decision = linear_decision(coefficients, *intercept, features);
                if decision.is_nan() {
                    return Err(ModelError::Internal("decision value is NaN".into()));
                }
                Ok(u8::from(decision > 0.0))
            }
            _ => {
                let p = self.predict_proba(features)?;
                Ok(u8::from(p > 0.5))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"{"kind": "decision_tree", "nodes": [
        {"feature": 0, "threshold": 40.0, "left": 1, "right": 2},
        {"value": [90.0, 10.0]},
        {"feature": 1, "threshold": 30.0, "left": 3, "right": 4},
        {"value": [0.0, 20.0]},
        {"value": [15.0, 5.0]}
    ]}"#;

    #[test]
    fn test_decision_tree_traversal() {
        let model = ModelArtifact::from_json(TREE).unwrap();
        assert_eq!(model.kind(), "decision_tree");

        assert_eq!(model.predict_proba(&[25.0, 50.0]).unwrap(), 0.1);
        assert_eq!(model.predict_proba(&[40.0, 50.0]).unwrap(), 0.1);
        assert_eq!(model.predict_proba(&[45.0, 20.0]).unwrap(), 1.0);
        assert_eq!(model.predict_proba(&[45.0, 60.0]).unwrap(), 0.25);

        assert_eq!(model.predict(&[45.0, 20.0]).unwrap(), 1);
        assert_eq!(model.predict(&[25.0, 20.0]).unwrap(), 0);
    }

    #[test]
    fn test_logistic_regression() {
        let model = ModelArtifact::from_json(
            r#"{"kind": "logistic_regression", "coefficients": [0.5, 0.0], "intercept": -20.0}"#,
        ).unwrap();

        assert!((model.predict_proba(&[40.0, 0.0]).unwrap() - 0.5).abs() < 1e-12);
        assert!(model.predict_proba(&[60.0, 0.0]).unwrap() > 0.99);
        assert!(model.predict_proba(&[20.0, 0.0]).unwrap() < 0.01);
    }

    #[test]
    fn test_linear_svm_is_classification_only() {
        let model = ModelArtifact::from_json(
            r#"{"kind": "linear_svm", "coefficients": [1.0, -0.1], "intercept": -35.0}"#,
        ).unwrap();

        assert!(matches!(model.predict_proba(&[50.0, 10.0]), Err(ModelError::ProbaUnsupported)));
        assert_eq!(model.predict(&[50.0, 10.0]).unwrap(), 1);
        assert_eq!(model.predict(&[20.0, 10.0]).unwrap(), 0);
        assert!(model.predict(&[f64::NAN, 10.0]).is_err());
    }

    #[test]
    fn test_rejects_cyclic_tree() {
        let err = ModelArtifact::from_json(
            r#"{"kind": "decision_tree", "nodes": [
                {"feature": 0, "threshold": 1.0, "left": 1, "right": 0},
                {"value": [1.0, 1.0]}
            ]}"#,
        ).unwrap_err();
        assert!(matches!(err, ModelLoadError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_artifacts() {
        let cases = [
            r#"{"kind": "decision_tree", "nodes": []}"#,
            r#"{"kind": "decision_tree", "nodes": [{"feature": 5, "threshold": 1.0, "left": 1, "right": 2}, {"value": [1, 0]}, {"value": [0, 1]}]}"#,
            r#"{"kind": "decision_tree", "nodes": [{"value": [0.0, 0.0]}]}"#,
            r#"{"kind": "decision_tree", "nodes": [{"value": [-1.0, 2.0]}]}"#,
        ];
        for case in cases {
            assert!(matches!(ModelArtifact::from_json(case), Err(ModelLoadError::Invalid(_))), "{}", case);
        }

        assert!(matches!(ModelArtifact::from_json("not json"), Err(ModelLoadError::Parse(_))));
        assert!(matches!(
            ModelArtifact::from_json(r#"{"kind": "random_forest", "trees": []}"#),
            Err(ModelLoadError::Parse(_))
        ));
    }

    #[test]
    fn test_shipped_artifact_is_valid() {
        let model = ModelArtifact::from_json(include_str!("../../../ai/fire_model.json")).unwrap();
        assert_eq!(model.predict(&[55.0, 60.0]).unwrap(), 1);
        assert_eq!(model.predict(&[22.0, 55.0]).unwrap(), 0);
        assert_eq!(model.predict(&[22.0, 15.0]).unwrap(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelArtifact::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound(_)));
    }
}
