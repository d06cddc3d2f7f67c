//! Regression trees over binned features
//!
//! Nodes are stored as parallel arrays. Node 0 is the root; a node whose
//! `feature` is [`LEAF`] holds its output in `value`, otherwise rows with
//! `x[feature] < threshold` go to `left` and the rest to `right`.

use super::binning::FeatureBins;
use super::params::GbdtParams;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Feature marker for leaf nodes
pub const LEAF: i32 = -2;
/// Child marker for leaf nodes
pub const NO_CHILD: i32 = -1;

/// A single fitted tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub feature: Vec<i32>,
    pub threshold: Vec<f32>,
    pub left: Vec<i32>,
    pub right: Vec<i32>,
    pub value: Vec<f32>,
}

/// Gradient statistics over a set of rows
#[derive(Debug, Clone, Copy, Default)]
struct GradStats {
    g: f64,
    h: f64,
    count: usize,
}

impl GradStats {
    fn add(&mut self, g: f64, h: f64) {
        self.g += g;
        self.h += h;
        self.count += 1;
    }

    fn minus(self, other: GradStats) -> GradStats {
        GradStats { g: self.g - other.g, h: self.h - other.h, count: self.count - other.count }
    }

    fn score(self, lambda: f64) -> f64 {
        self.g * self.g / (self.h + lambda)
    }
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    bin: usize,
    gain: f64,
}

struct PendingNode {
    index: usize,
    rows: Vec<usize>,
    depth: usize,
}

impl Tree {
    fn empty() -> Self {
        Self { feature: Vec::new(), threshold: Vec::new(), left: Vec::new(), right: Vec::new(), value: Vec::new() }
    }

    fn push_leaf(&mut self, value: f32) -> usize {
        self.feature.push(LEAF);
        self.threshold.push(0.0);
        self.left.push(NO_CHILD);
        self.right.push(NO_CHILD);
        self.value.push(value);
        self.feature.len() - 1
    }

    pub fn n_nodes(&self) -> usize {
        self.feature.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.feature.iter().filter(|&&f| f == LEAF).count()
    }

    /// Largest feature index used by a split, if any
    pub(crate) fn max_feature(&self) -> Option<usize> {
        self.feature.iter().filter(|&&f| f >= 0).map(|&f| f as usize).max()
    }

    /// Whether every child index points inside the node arrays
    pub fn is_well_formed(&self) -> bool {
        let n = self.feature.len();
        let same_len = [self.threshold.len(), self.left.len(), self.right.len(), self.value.len()]
            .iter()
            .all(|&len| len == n);
        same_len
            && n > 0
            && (0..n).all(|i| {
                self.feature[i] == LEAF
                    || (self.feature[i] >= 0
                        && (0..n as i32).contains(&self.left[i])
                        && (0..n as i32).contains(&self.right[i])
                        && self.left[i] as usize > i
                        && self.right[i] as usize > i)
            })
    }

    /// Output value for one feature row
    pub fn predict(&self, x: ArrayView1<'_, f32>) -> f32 {
        let mut node = 0usize;
        while self.feature[node] != LEAF {
            let f = self.feature[node] as usize;
            node = if x[f] < self.threshold[node] {
                self.left[node] as usize
            } else {
                self.right[node] as usize
            };
        }
        self.value[node]
    }

    /// Grow one tree depth-wise on the given rows and features
    ///
    /// `binned` is column-major; `grad`/`hess` are indexed by row.
    pub(crate) fn grow(
        bins: &FeatureBins,
        binned: &[Vec<u16>],
        grad: &[f64],
        hess: &[f64],
        rows: Vec<usize>,
        features: &[usize],
        params: &GbdtParams,
    ) -> Self {
        let lambda = f64::from(params.reg_lambda);
        let eta = f64::from(params.learning_rate);

        let mut tree = Tree::empty();
        let root = tree.push_leaf(0.0);
        let mut queue = VecDeque::from([PendingNode { index: root, rows, depth: 0 }]);

        while let Some(node) = queue.pop_front() {
            let mut total = GradStats::default();
            for &r in &node.rows {
                total.add(grad[r], hess[r]);
            }

            let split = if node.depth < params.max_depth {
                best_split(bins, binned, grad, hess, &node.rows, features, total, params)
            } else {
                None
            };

            match split {
                Some(split) => {
                    let column = &binned[split.feature];
                    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
                        node.rows.iter().partition(|&&r| usize::from(column[r]) <= split.bin);

                    let left = tree.push_leaf(0.0);
                    let right = tree.push_leaf(0.0);
                    tree.feature[node.index] = split.feature as i32;
                    tree.threshold[node.index] = bins.cuts(split.feature)[split.bin];
                    tree.left[node.index] = left as i32;
                    tree.right[node.index] = right as i32;

                    queue.push_back(PendingNode { index: left, rows: left_rows, depth: node.depth + 1 });
                    queue.push_back(PendingNode { index: right, rows: right_rows, depth: node.depth + 1 });
                }
                None => {
                    tree.value[node.index] = (-total.g / (total.h + lambda) * eta) as f32;
                }
            }
        }

        tree
    }
}

/// Highest-gain split, first feature then first bin on ties
#[allow(clippy::too_many_arguments)]
fn best_split(
    bins: &FeatureBins,
    binned: &[Vec<u16>],
    grad: &[f64],
    hess: &[f64],
    rows: &[usize],
    features: &[usize],
    total: GradStats,
    params: &GbdtParams,
) -> Option<Split> {
    if rows.len() < 2 {
        return None;
    }
    let lambda = f64::from(params.reg_lambda);
    let gamma = f64::from(params.gamma);
    let min_child_weight = f64::from(params.min_child_weight);
    let parent_score = total.score(lambda);

    let mut best: Option<Split> = None;
    for &feature in features {
        let n_bins = bins.n_bins(feature);
        if n_bins < 2 {
            continue;
        }

        let mut histogram = vec![GradStats::default(); n_bins];
        let column = &binned[feature];
        for &r in rows {
            histogram[usize::from(column[r])].add(grad[r], hess[r]);
        }

        let mut left = GradStats::default();
        for (bin, stats) in histogram.iter().enumerate().take(n_bins - 1) {
            left.g += stats.g;
            left.h += stats.h;
            left.count += stats.count;
            let right = total.minus(left);

            if left.count == 0 || right.count == 0 {
                continue;
            }
            if left.h < min_child_weight || right.h < min_child_weight {
                continue;
            }

            let gain = 0.5 * (left.score(lambda) + right.score(lambda) - parent_score) - gamma;
            if gain > 0.0 && best.map_or(true, |b| gain > b.gain) {
                best = Some(Split { feature, bin, gain });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn params() -> GbdtParams {
        GbdtParams { learning_rate: 1.0, reg_lambda: 0.0, min_child_weight: 0.0, ..GbdtParams::default() }
    }

    #[test]
    fn test_single_split_separates_gradients() {
        let x = arr2(&[[0.0, 5.0], [1.0, 5.0], [2.0, 5.0], [3.0, 5.0]]);
        let bins = FeatureBins::fit(x.view(), 256);
        let binned = bins.transform(x.view());
        let grad = [1.0, 1.0, -1.0, -1.0];
        let hess = [1.0; 4];

        let tree = Tree::grow(&bins, &binned, &grad, &hess, (0..4).collect(), &[0, 1], &params());

        assert_eq!(tree.feature[0], 0);
        assert_eq!(tree.threshold[0], 1.5);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.predict(x.row(0)), -1.0);
        assert_eq!(tree.predict(x.row(3)), 1.0);
        assert!(tree.is_well_formed());
    }

    #[test]
    fn test_depth_zero_is_single_leaf() {
        let x = arr2(&[[0.0], [1.0]]);
        let bins = FeatureBins::fit(x.view(), 256);
        let binned = bins.transform(x.view());
        let p = GbdtParams { max_depth: 0, reg_lambda: 1.0, ..params() };

        let tree = Tree::grow(&bins, &binned, &[1.0, 1.0], &[0.5, 0.5], vec![0, 1], &[0], &p);

        assert_eq!(tree.n_nodes(), 1);
        // -G/(H+λ) = -2/2
        assert_eq!(tree.value[0], -1.0);
    }

    #[test]
    fn test_ties_prefer_lowest_feature() {
        // Both features split the rows identically
        let x = arr2(&[[0.0, 0.0], [1.0, 1.0]]);
        let bins = FeatureBins::fit(x.view(), 256);
        let binned = bins.transform(x.view());

        let tree = Tree::grow(&bins, &binned, &[1.0, -1.0], &[1.0, 1.0], vec![0, 1], &[0, 1], &params());
        assert_eq!(tree.feature[0], 0);
    }

    #[test]
    fn test_min_child_weight_blocks_split() {
        let x = arr2(&[[0.0], [1.0]]);
        let bins = FeatureBins::fit(x.view(), 256);
        let binned = bins.transform(x.view());
        let p = GbdtParams { min_child_weight: 2.0, ..params() };

        let tree = Tree::grow(&bins, &binned, &[1.0, -1.0], &[1.0, 1.0], vec![0, 1], &[0], &p);
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn test_gamma_blocks_small_gain() {
        let x = arr2(&[[0.0], [1.0]]);
        let bins = FeatureBins::fit(x.view(), 256);
        let binned = bins.transform(x.view());
        // Gain = 0.5 * (1 + 1 - 0) = 1
        let p = GbdtParams { gamma: 1.5, ..params() };

        let tree = Tree::grow(&bins, &binned, &[1.0, -1.0], &[1.0, 1.0], vec![0, 1], &[0], &p);
        assert_eq!(tree.n_nodes(), 1);
    }
}
