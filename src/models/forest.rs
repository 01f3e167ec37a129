//! Random forest evaluator.
//!
//! Evaluates the JSON export of a fitted binary decision forest. Trees
//! use the flat array layout (`children_left`, `children_right`,
//! `feature`, `threshold`, `value`) with `-1` children marking leaves.
//! The layout is validated once at load so evaluation cannot index out
//! of bounds or loop.

use std::path::Path;

use serde::Deserialize;

use crate::error::ModelError;

use super::artifact::{load_json, ArtifactFingerprint};
use super::tabular::TabularClassifier;

const LEAF: i64 = -1;

fn default_positive_class() -> usize {
    1
}

/// On-disk form of one tree.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts or class distribution.
    pub value: Vec<Vec<f64>>,
}

/// On-disk form of the forest.
#[derive(Debug, Clone, Deserialize)]
pub struct ForestSpec {
    pub n_features: usize,
    #[serde(default = "default_positive_class")]
    pub positive_class: usize,
    pub trees: Vec<TreeSpec>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        positive: f64,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_spec(spec: TreeSpec, n_features: usize, positive_class: usize) -> Result<Self, ModelError> {
        let count = spec.children_left.len();
        if count == 0 {
            return Err(ModelError::InvalidArtifact("tree has no nodes".into()));
        }
        if spec.children_right.len() != count
            || spec.feature.len() != count
            || spec.threshold.len() != count
            || spec.value.len() != count
        {
            return Err(ModelError::InvalidArtifact(
                "tree arrays have mismatched lengths".into(),
            ));
        }

        let mut nodes = Vec::with_capacity(count);
        for i in 0..count {
            let (left, right) = (spec.children_left[i], spec.children_right[i]);
            if left == LEAF && right == LEAF {
                let distribution = &spec.value[i];
                let total: f64 = distribution.iter().sum();
                let positive = distribution.get(positive_class).copied().ok_or_else(|| {
                    ModelError::InvalidArtifact(format!(
                        "leaf {} has no class {}",
                        i, positive_class
                    ))
                })?;
                if !(total > 0.0) || distribution.iter().any(|v| *v < 0.0 || !v.is_finite()) {
                    return Err(ModelError::InvalidArtifact(format!(
                        "leaf {} has invalid class values",
                        i
                    )));
                }
                nodes.push(Node::Leaf {
                    positive: positive / total,
                });
                continue;
            }

            // Children must come after their parent, which rules out cycles.
            let child = |c: i64| -> Result<usize, ModelError> {
                if c > i as i64 && (c as usize) < count {
                    Ok(c as usize)
                } else {
                    Err(ModelError::InvalidArtifact(format!(
                        "node {} has invalid child {}",
                        i, c
                    )))
                }
            };
            let feature = spec.feature[i];
            if feature < 0 || feature as usize >= n_features {
                return Err(ModelError::InvalidArtifact(format!(
                    "node {} splits on feature {} of {}",
                    i, feature, n_features
                )));
            }
            nodes.push(Node::Split {
                feature: feature as usize,
                threshold: spec.threshold[i],
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    fn positive_probability(&self, row: &[f32]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { positive } => return *positive,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if (row[*feature] as f64) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// A validated binary random forest.
#[derive(Debug, Clone)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<Tree>,
}

impl RandomForest {
    pub fn from_spec(spec: ForestSpec) -> Result<Self, ModelError> {
        if spec.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no trees".into()));
        }
        let trees = spec
            .trees
            .into_iter()
            .map(|tree| Tree::from_spec(tree, spec.n_features, spec.positive_class))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            n_features: spec.n_features,
            trees,
        })
    }

    pub fn load(path: &Path) -> Result<(Self, ArtifactFingerprint), ModelError> {
        let (spec, fingerprint) = load_json::<ForestSpec>(path)?;
        Ok((Self::from_spec(spec)?, fingerprint))
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl TabularClassifier for RandomForest {
    fn backend(&self) -> &'static str {
        "forest-json"
    }

    fn expected_width(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn phishing_probability(&self, features: &[f32]) -> Result<f64, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.positive_probability(features))
            .sum();
        Ok(sum / self.trees.len() as f64)
    }
}
