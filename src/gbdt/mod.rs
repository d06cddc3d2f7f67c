//! Gradient-boosted decision trees for binary classification
//!
//! Second-order boosting of logistic loss over quantile-binned features,
//! grown depth-wise. The fitted ensemble is a plain serde value persisted as
//! JSON.

mod binning;
mod booster;
mod params;
mod tree;

pub use binning::FeatureBins;
pub use booster::GradientBoostedTrees;
pub use params::GbdtParams;
pub use tree::Tree;

/// Logistic function in f64
pub(crate) fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
