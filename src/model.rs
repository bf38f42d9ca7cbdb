//! Classifier adapter.
//!
//! The engine only ever sees the [`Scorer`] trait; the bundled implementation
//! is a JSON tree ensemble scored by averaging leaf probabilities. Training
//! happens offline, away from this crate.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("feature vector has {got} values, model expects {expected}")]
    FeatureCount { expected: usize, got: usize },
    #[error("model has no trees")]
    NoTrees,
    #[error("tree node index {0} out of range")]
    NodeOutOfRange(usize),
    #[error("feature index {0} out of range")]
    FeatureOutOfRange(usize),
    #[error("tree walk never reached a leaf")]
    NoLeaf,
}

/// One-method seam between the decision engine and whatever model backs it.
pub trait Scorer: Send + Sync {
    /// Phishing probability in [0,1] for a schema-ordered feature vector.
    fn score(&self, features: &[f64]) -> Result<f64, ScoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probability: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root. `value <= threshold` descends left.
    fn probability(&self, features: &[f64]) -> Result<f64, ScoreError> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index).ok_or(ScoreError::NodeOutOfRange(index))? {
                Node::Leaf { probability } => return Ok(*probability),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features
                        .get(*feature)
                        .copied()
                        .ok_or(ScoreError::FeatureOutOfRange(*feature))?;
                    index = if value <= *threshold { *left } else { *right };
                }
            }
        }
        Err(ScoreError::NoLeaf)
    }
}

/// Persisted tree-ensemble classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

impl ForestModel {
    /// Load and validate a model artifact. Called once at startup; a model
    /// that passes validation cannot fail structurally during scoring.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact {path}"))?;
        let model: ForestModel = serde_json::from_str(&content)
            .with_context(|| format!("model artifact {path} is not a valid tree ensemble"))?;
        model
            .validate()
            .with_context(|| format!("invalid model artifact {path}"))?;
        Ok(model)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.trees.is_empty() {
            anyhow::bail!("model has no trees");
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                anyhow::bail!("tree {t} has no nodes");
            }
            for (n, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= self.n_features {
                            anyhow::bail!(
                                "tree {t} node {n} references feature {feature}, model has {}",
                                self.n_features
                            );
                        }
                        if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            anyhow::bail!("tree {t} node {n} has a child index out of range");
                        }
                    }
                    Node::Leaf { probability } => {
                        if !(0.0..=1.0).contains(probability) {
                            anyhow::bail!(
                                "tree {t} node {n} has leaf probability {probability} outside [0,1]"
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Scorer for ForestModel {
    fn score(&self, features: &[f64]) -> Result<f64, ScoreError> {
        if features.len() != self.n_features {
            return Err(ScoreError::FeatureCount {
                expected: self.n_features,
                got: features.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ScoreError::NoTrees);
        }
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.probability(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> Tree {
        Tree {
            nodes: vec![
                Node::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { probability: low },
                Node::Leaf { probability: high },
            ],
        }
    }

    #[test]
    fn test_single_leaf_model() {
        let model = ForestModel {
            n_features: 2,
            trees: vec![Tree {
                nodes: vec![Node::Leaf { probability: 0.42 }],
            }],
        };
        assert_eq!(model.score(&[0.0, 0.0]).unwrap(), 0.42);
    }

    #[test]
    fn test_split_routing() {
        let model = ForestModel {
            n_features: 1,
            trees: vec![stump(0, 0.5, 0.1, 0.9)],
        };
        // At the threshold goes left
        assert_eq!(model.score(&[0.5]).unwrap(), 0.1);
        assert_eq!(model.score(&[0.6]).unwrap(), 0.9);
    }

    #[test]
    fn test_probability_averaged_across_trees() {
        let model = ForestModel {
            n_features: 2,
            trees: vec![stump(0, 0.5, 0.0, 0.8), stump(1, 0.5, 0.2, 1.0)],
        };
        let p = model.score(&[1.0, 0.0]).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let model = ForestModel {
            n_features: 3,
            trees: vec![stump(0, 0.5, 0.1, 0.9)],
        };
        match model.score(&[1.0]) {
            Err(ScoreError::FeatureCount { expected: 3, got: 1 }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_cyclic_tree_is_an_error_not_a_hang() {
        let model = ForestModel {
            n_features: 1,
            trees: vec![Tree {
                nodes: vec![Node::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 0,
                    right: 0,
                }],
            }],
        };
        assert!(matches!(model.score(&[0.0]), Err(ScoreError::NoLeaf)));
    }

    #[test]
    fn test_validate_rejects_bad_feature_index() {
        let model = ForestModel {
            n_features: 1,
            trees: vec![stump(7, 0.5, 0.1, 0.9)],
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_child_index() {
        let model = ForestModel {
            n_features: 1,
            trees: vec![Tree {
                nodes: vec![Node::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 1,
                    right: 9,
                }],
            }],
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_probability_out_of_range() {
        let model = ForestModel {
            n_features: 1,
            trees: vec![Tree {
                nodes: vec![Node::Leaf { probability: 1.5 }],
            }],
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let model = ForestModel {
            n_features: 1,
            trees: Vec::new(),
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = ForestModel {
            n_features: 2,
            trees: vec![stump(1, 2.5, 0.2, 0.9)],
        };
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", serde_json::to_string(&model).unwrap()).unwrap();

        let loaded = ForestModel::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.n_features, 2);
        assert_eq!(loaded.score(&[0.0, 3.0]).unwrap(), 0.9);
    }

    #[test]
    fn test_from_file_rejects_invalid_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{{\"n_features\": 1}}").unwrap();

        assert!(ForestModel::from_file(path.to_str().unwrap()).is_err());
    }
}
