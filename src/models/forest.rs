//! Tree-ensemble regressor.
//!
//! Trees use the flat node layout of scikit-learn's `tree_` attribute: node
//! `i` is a leaf when `children_left[i] == -1`, otherwise samples go left when
//! `x[feature[i]] <= threshold[i]`. The ensemble prediction is the mean of the
//! tree predictions.

use super::Regressor;
use crate::error::{ArtifactError, PredictError, Result};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

const LEAF: i64 = -1;

/// A single regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl DecisionTree {
    fn validate(&self, estimator: usize, n_features: usize) -> std::result::Result<(), ArtifactError> {
        let n_nodes = self.value.len();
        if n_nodes == 0 {
            return Err(ArtifactError::EmptyTree { estimator });
        }
        if [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ]
        .iter()
        .any(|&len| len != n_nodes)
        {
            return Err(ArtifactError::NodeArrayLength { estimator });
        }

        for node in 0..n_nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                continue;
            }
            // Children always follow their parent, so traversal cannot cycle.
            let in_range = |child: i64| child > node as i64 && (child as usize) < n_nodes;
            if !in_range(left) || !in_range(right) {
                return Err(ArtifactError::InvalidChildren {
                    estimator,
                    node,
                    left,
                    right,
                });
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(ArtifactError::UnknownFeature {
                    estimator,
                    node,
                    feature,
                });
            }
        }
        Ok(())
    }

    /// Predict one sample
    pub fn predict_row(&self, x: ArrayView1<'_, f64>) -> f64 {
        let mut node = 0;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return self.value[node];
            }
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// Random forest exported as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features_in: usize,
    pub estimators: Vec<DecisionTree>,
}

impl TreeEnsemble {
    /// Parse and validate an exported forest
    pub fn from_json(json: &str) -> std::result::Result<Self, ArtifactError> {
        let forest: TreeEnsemble = serde_json::from_str(json)?;
        forest.validate()?;
        Ok(forest)
    }

    pub fn validate(&self) -> std::result::Result<(), ArtifactError> {
        if self.estimators.is_empty() {
            return Err(ArtifactError::NoEstimators);
        }
        for (i, tree) in self.estimators.iter().enumerate() {
            tree.validate(i, self.n_features_in)?;
        }
        Ok(())
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&mut self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
        if x.ncols() != self.n_features_in {
            return Err(PredictError::TransformError(format!(
                "input has {} features but the forest expects {}",
                x.ncols(),
                self.n_features_in
            )));
        }

        let n_trees = self.estimators.len() as f64;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                self.estimators
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
                    / n_trees
            })
            .collect())
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features_in)
    }
}
