//! Boosted ensemble: fitting, prediction and persistence

use super::binning::FeatureBins;
use super::params::GbdtParams;
use super::sigmoid;
use super::tree::Tree;
use crate::error::{Error, Result};
use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Binary classifier over dense feature vectors
///
/// Class 1 is predicted exactly when its probability is at least
/// [`GradientBoostedTrees::THRESHOLD`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    pub params: GbdtParams,
    /// Initial probability before any tree
    pub base_score: f32,
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

impl GradientBoostedTrees {
    pub const THRESHOLD: f32 = 0.5;

    /// Fit on rows of `x` with labels in {0, 1}
    pub fn fit(x: ArrayView2<'_, f32>, y: &[usize], params: &GbdtParams) -> Result<Self> {
        let (n_rows, n_features) = x.dim();
        if y.len() != n_rows {
            return Err(Error::shape("tree classifier labels", vec![n_rows], vec![y.len()]));
        }
        if n_rows == 0 {
            return Err(Error::ConfigError("cannot fit the tree classifier on zero rows".into()));
        }
        if let Some(row) = y.iter().position(|&label| label > 1) {
            return Err(Error::InvalidLabel { row, value: y[row].to_string() });
        }

        let base_score = 0.5f32;
        let base_margin = f64::from(base_score / (1.0 - base_score)).ln();

        let bins = FeatureBins::fit(x, params.max_bin);
        let binned = bins.transform(x);
        let targets: Vec<f64> = y.iter().map(|&label| label as f64).collect();
        let mut margins = vec![base_margin; n_rows];
        let mut grad = vec![0.0f64; n_rows];
        let mut hess = vec![0.0f64; n_rows];
        let mut rng = StdRng::seed_from_u64(params.seed);

        let n_sampled_features =
            ((params.colsample_bytree as f64 * n_features as f64).round() as usize).clamp(1, n_features.max(1));

        let mut trees = Vec::with_capacity(params.n_estimators);
        for _ in 0..params.n_estimators {
            for i in 0..n_rows {
                let p = sigmoid(margins[i]);
                grad[i] = p - targets[i];
                hess[i] = p * (1.0 - p);
            }

            let rows = sample_rows(n_rows, params.subsample, &mut rng);
            let features = if n_sampled_features < n_features {
                let mut picked = rand::seq::index::sample(&mut rng, n_features, n_sampled_features).into_vec();
                picked.sort_unstable();
                picked
            } else {
                (0..n_features).collect()
            };

            let tree = Tree::grow(&bins, &binned, &grad, &hess, rows, &features, params);
            for (i, margin) in margins.iter_mut().enumerate() {
                *margin += f64::from(tree.predict(x.row(i)));
            }
            trees.push(tree);
        }

        Ok(Self { params: params.clone(), base_score, n_features, trees })
    }

    fn margin(&self, row: ArrayView1<'_, f32>) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(Error::shape("tree classifier input", vec![self.n_features], vec![row.len()]));
        }
        let base = f64::from(self.base_score / (1.0 - self.base_score)).ln();
        Ok(base + self.trees.iter().map(|t| f64::from(t.predict(row))).sum::<f64>())
    }

    /// Probability of class 1 for one row
    pub fn predict_proba_one(&self, row: ArrayView1<'_, f32>) -> Result<f32> {
        Ok(sigmoid(self.margin(row)?) as f32)
    }

    /// Probability of class 1 for every row
    pub fn predict_proba(&self, x: ArrayView2<'_, f32>) -> Result<Vec<f32>> {
        x.rows().into_iter().map(|row| self.predict_proba_one(row)).collect()
    }

    /// Predicted class for every row
    pub fn predict(&self, x: ArrayView2<'_, f32>) -> Result<Vec<usize>> {
        Ok(self.predict_proba(x)?.into_iter().map(Self::class_of).collect())
    }

    /// Class for a class-1 probability
    pub fn class_of(probability: f32) -> usize {
        usize::from(probability >= Self::THRESHOLD)
    }

    /// Write the ensemble as JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Read an ensemble written by [`save`](Self::save)
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ArtifactNotFound {
                path: path.to_path_buf(),
                hint: "Run `veraz train` first to fit the tree classifier".into(),
            });
        }
        let model: Self = serde_json::from_str(&fs::read_to_string(path)?)?;

        let trees_valid = model.trees.iter().all(|tree| {
            tree.is_well_formed() && tree.max_feature().map_or(true, |f| f < model.n_features)
        });
        let base_valid = model.base_score > 0.0 && model.base_score < 1.0;
        if !trees_valid || !base_valid {
            return Err(Error::Serialization(format!(
                "tree classifier in {} is malformed",
                path.display()
            )));
        }
        Ok(model)
    }
}

/// Bernoulli row sample; all rows when `ratio >= 1` or nothing was drawn
fn sample_rows(n_rows: usize, ratio: f32, rng: &mut StdRng) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n_rows).collect();
    }
    let rows: Vec<usize> = (0..n_rows).filter(|_| rng.random::<f32>() < ratio).collect();
    if rows.is_empty() {
        (0..n_rows).collect()
    } else {
        rows
    }
}
