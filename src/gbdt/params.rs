//! Boosting hyperparameters

use serde::{Deserialize, Serialize};

/// Hyperparameters of [`super::GradientBoostedTrees`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GbdtParams {
    /// Boosting rounds
    pub n_estimators: usize,
    /// Shrinkage η applied to every leaf value
    pub learning_rate: f32,
    pub max_depth: usize,
    /// Minimum hessian sum in each child
    pub min_child_weight: f32,
    /// L2 regularization λ on leaf values
    pub reg_lambda: f32,
    /// Minimum split gain γ
    pub gamma: f32,
    /// Row sampling ratio per tree
    pub subsample: f32,
    /// Feature sampling ratio per tree
    pub colsample_bytree: f32,
    /// Maximum histogram bins per feature
    pub max_bin: usize,
    pub seed: u64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.1,
            max_depth: 6,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            gamma: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            max_bin: 256,
            seed: 42,
        }
    }
}
