use super::ProbabilityModel;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A tree node. Leaves hold the phishing-class probability of the samples
/// that reached them; splits send `x[feature] <= threshold` to `left`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Nodes stored root first; children always come after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::InvalidModel("tree has no nodes".to_string()));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(Error::InvalidModel(format!(
                            "node {} splits on feature {} but model has {} features",
                            index, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(Error::InvalidModel(format!(
                            "node {} has a non-finite threshold",
                            index
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(Error::InvalidModel(format!(
                                "node {} has invalid child index {}",
                                index, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !(0.0..=1.0).contains(value) {
                        return Err(Error::InvalidModel(format!(
                            "leaf {} probability {} is outside [0, 1]",
                            index, value
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Leaf probability for `features`. NaN if a split feature is missing or
    /// the walk leaves the node array or revisits a node, which only an
    /// unvalidated tree can do.
    fn predict(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        for _ in 0..self.nodes.len() {
            let Some(node) = self.nodes.get(index) else {
                return f64::NAN;
            };
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let Some(x) = features.get(*feature) else {
                        return f64::NAN;
                    };
                    index = if *x <= *threshold { *left } else { *right };
                }
            }
        }
        f64::NAN
    }
}

/// Averages per-tree leaf probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::InvalidModel("forest has no trees".to_string()));
        }
        for tree in &self.trees {
            tree.validate(self.n_features)?;
        }
        Ok(())
    }
}

impl ProbabilityModel for RandomForest {
    fn predict_proba(&self, features: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        total / self.trees.len() as f64
    }

    fn expected_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn name(&self) -> &str {
        "RandomForest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        }
    }

    #[test]
    fn test_forest_averages_leaves() {
        let forest = RandomForest {
            n_features: 2,
            trees: vec![stump(0, 75.0, 0.1, 0.9), stump(1, 0.5, 0.2, 0.6)],
        };
        forest.validate().unwrap();

        assert!((forest.predict_proba(&[10.0, 0.0]) - 0.15).abs() < 1e-12);
        assert!((forest.predict_proba(&[100.0, 1.0]) - 0.75).abs() < 1e-12);
        assert!((forest.predict_proba(&[75.0, 1.0]) - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_validation_rejects_cycles_and_bad_features() {
        let cyclic = RandomForest {
            n_features: 1,
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 0,
                        threshold: 1.0,
                        left: 0,
                        right: 1,
                    },
                    TreeNode::Leaf { value: 0.5 },
                ],
            }],
        };
        assert!(matches!(cyclic.validate(), Err(Error::InvalidModel(_))));

        let wide = RandomForest {
            n_features: 1,
            trees: vec![stump(3, 1.0, 0.0, 1.0)],
        };
        assert!(matches!(wide.validate(), Err(Error::InvalidModel(_))));

        let bad_leaf = RandomForest {
            n_features: 1,
            trees: vec![stump(0, 1.0, 0.0, 1.5)],
        };
        assert!(matches!(bad_leaf.validate(), Err(Error::InvalidModel(_))));

        let empty = RandomForest {
            n_features: 1,
            trees: vec![],
        };
        assert!(matches!(empty.validate(), Err(Error::InvalidModel(_))));
    }

    #[test]
    fn test_short_input_is_nan() {
        let forest = RandomForest {
            n_features: 2,
            trees: vec![stump(1, 0.5, 0.2, 0.6)],
        };
        assert!(forest.predict_proba(&[1.0]).is_nan());
    }

    #[test]
    fn test_unvalidated_tree_is_nan_not_panic() {
        let dangling = RandomForest {
            n_features: 1,
            trees: vec![DecisionTree {
                nodes: vec![TreeNode::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 5,
                    right: 6,
                }],
            }],
        };
        assert!(dangling.predict_proba(&[1.0]).is_nan());

        let looping = RandomForest {
            n_features: 1,
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 0,
                        threshold: 0.5,
                        left: 1,
                        right: 1,
                    },
                    TreeNode::Split {
                        feature: 0,
                        threshold: 0.5,
                        left: 0,
                        right: 0,
                    },
                ],
            }],
        };
        assert!(looping.predict_proba(&[1.0]).is_nan());

        let empty = DecisionTree { nodes: vec![] };
        assert!(empty.predict(&[1.0]).is_nan());
    }

    #[test]
    fn test_nodes_deserialize_untagged() {
        let json = r#"{"nodes":[{"feature":0,"threshold":0.5,"left":1,"right":2},{"value":0.0},{"value":1.0}]}"#;
        let tree: DecisionTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree, stump(0, 0.5, 0.0, 1.0));
    }
}
