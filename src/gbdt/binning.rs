//! Quantile binning of feature columns
//!
//! Each feature gets a strictly increasing list of cut points. A value's bin
//! is the number of cuts `<=` it, so splitting after bin `b` sends exactly the
//! values `< cuts[b]` to the left child. NaN fails every `<` test and so lands
//! in the last bin, on the right of every split.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Per-feature cut points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureBins {
    cuts: Vec<Vec<f32>>,
}

impl FeatureBins {
    /// Compute cut points for every column of `x`, at most `max_bin` bins each
    ///
    /// Columns with no more than `max_bin` distinct values cut at midpoints
    /// between neighbours; wider columns cut at evenly spaced order statistics.
    pub fn fit(x: ArrayView2<'_, f32>, max_bin: usize) -> Self {
        let max_bin = max_bin.max(2);
        let cuts = x
            .columns()
            .into_iter()
            .map(|column| {
                let mut sorted: Vec<f32> = column.iter().copied().filter(|v| !v.is_nan()).collect();
                sorted.sort_by(f32::total_cmp);
                column_cuts(&sorted, max_bin)
            })
            .collect();
        Self { cuts }
    }

    pub fn n_features(&self) -> usize {
        self.cuts.len()
    }

    /// Cut points of one feature
    pub fn cuts(&self, feature: usize) -> &[f32] {
        &self.cuts[feature]
    }

    /// Number of bins for one feature
    pub fn n_bins(&self, feature: usize) -> usize {
        self.cuts[feature].len() + 1
    }

    /// Bin index of `value` in `feature`
    pub fn bin(&self, feature: usize, value: f32) -> u16 {
        let cuts = &self.cuts[feature];
        if value.is_nan() {
            return cuts.len() as u16;
        }
        cuts.partition_point(|&c| c <= value) as u16
    }

    /// Column-major bin indices of `x`
    pub fn transform(&self, x: ArrayView2<'_, f32>) -> Vec<Vec<u16>> {
        (0..self.n_features())
            .map(|f| x.column(f).iter().map(|&v| self.bin(f, v)).collect())
            .collect()
    }
}

fn column_cuts(sorted: &[f32], max_bin: usize) -> Vec<f32> {
    let mut distinct = sorted.to_vec();
    distinct.dedup();

    if distinct.len() <= max_bin {
        return distinct.windows(2).map(|w| w[0] + (w[1] - w[0]) / 2.0).collect();
    }

    let n = sorted.len();
    let min = sorted[0];
    let mut cuts: Vec<f32> = (1..max_bin).map(|q| sorted[q * n / max_bin]).filter(|&c| c > min).collect();
    cuts.dedup();
    cuts
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    #[test]
    fn test_few_distinct_values_cut_at_midpoints() {
        let x = arr2(&[[1.0], [3.0], [3.0], [5.0]]);
        let bins = FeatureBins::fit(x.view(), 256);
        assert_eq!(bins.cuts(0), &[2.0, 4.0]);
        assert_eq!(bins.n_bins(0), 3);
        assert_eq!(bins.bin(0, 1.0), 0);
        assert_eq!(bins.bin(0, 2.0), 1);
        assert_eq!(bins.bin(0, 5.0), 2);
    }

    #[test]
    fn test_constant_column_has_one_bin() {
        let x = arr2(&[[7.0], [7.0], [7.0]]);
        let bins = FeatureBins::fit(x.view(), 256);
        assert!(bins.cuts(0).is_empty());
        assert_eq!(bins.transform(x.view()), vec![vec![0, 0, 0]]);
    }

    #[test]
    fn test_quantile_cuts_respect_max_bin() {
        let x = Array2::from_shape_fn((1000, 1), |(i, _)| i as f32);
        let bins = FeatureBins::fit(x.view(), 16);
        assert!(bins.n_bins(0) <= 16);
        assert!(bins.cuts(0).windows(2).all(|w| w[0] < w[1]));

        let binned = bins.transform(x.view());
        assert_eq!(binned[0][0], 0);
        assert_eq!(binned[0][999] as usize, bins.n_bins(0) - 1);
    }

    #[test]
    fn test_bin_matches_threshold_rule() {
        let x = Array2::from_shape_fn((50, 1), |(i, _)| ((i * 37) % 50) as f32 * 0.5);
        let bins = FeatureBins::fit(x.view(), 8);
        for b in 0..bins.cuts(0).len() {
            let cut = bins.cuts(0)[b];
            for &v in x.column(0) {
                assert_eq!(bins.bin(0, v) as usize <= b, v < cut);
            }
        }
    }

    #[test]
    fn test_nan_binned_right_of_every_cut() {
        let x = arr2(&[[1.0], [f32::NAN], [3.0], [5.0]]);
        let bins = FeatureBins::fit(x.view(), 256);
        assert_eq!(bins.cuts(0), &[2.0, 4.0]);
        assert_eq!(bins.bin(0, f32::NAN) as usize, bins.n_bins(0) - 1);
        assert_eq!(bins.transform(x.view()), vec![vec![0, 2, 1, 2]]);
    }

    #[test]
    fn test_all_nan_column_has_one_bin() {
        let x = arr2(&[[f32::NAN], [f32::NAN]]);
        let bins = FeatureBins::fit(x.view(), 256);
        assert!(bins.cuts(0).is_empty());
        assert_eq!(bins.bin(0, f32::NAN), 0);
    }
}
