//! Kernel SHAP over binary feature coalitions
//!
//! A coalition is a keep/drop mask over M features. The model is evaluated
//! on coalitions weighted by the Shapley kernel
//! `(M - 1) / (C(M, s) · s · (M - s))` and the attributions are the
//! weighted least-squares fit of those evaluations, constrained so that
//! they sum to `f(all kept) - f(none kept)`.

use super::linalg::weighted_least_squares;
use crate::error::{Error, Result};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Attributions for one input
#[derive(Debug, Clone, PartialEq)]
pub struct ShapValues {
    /// Model output with every feature dropped
    pub base_value: f64,
    /// Model output with every feature kept
    pub full_value: f64,
    /// One attribution per feature; they sum to `full_value - base_value`
    pub values: Vec<f64>,
    /// Whether every coalition was enumerated
    pub exact: bool,
    /// Model evaluations used, including both end points
    pub n_evals: usize,
}

/// Kernel SHAP estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelShap {
    /// Coalitions evaluated besides the two end points
    pub max_evals: usize,
    pub seed: u64,
}

impl KernelShap {
    pub fn new(max_evals: usize, seed: u64) -> Self {
        Self { max_evals, seed }
    }

    /// Coalitions and their regression weights for `m` features
    ///
    /// All `2^m - 2` proper coalitions when they fit the budget, otherwise
    /// complement pairs whose sizes follow the kernel distribution.
    pub fn coalitions(&self, m: usize) -> (Vec<Vec<bool>>, Vec<f64>, bool) {
        if m < 2 {
            return (Vec::new(), Vec::new(), true);
        }

        let all = 1usize.checked_shl(m as u32).filter(|_| m < usize::BITS as usize - 1);
        if let Some(total) = all.filter(|&t| t - 2 <= self.max_evals) {
            let mut coalitions = Vec::with_capacity(total - 2);
            let mut weights = Vec::with_capacity(total - 2);
            for bits in 1..total - 1 {
                let z: Vec<bool> = (0..m).map(|j| bits & (1 << j) != 0).collect();
                let s = z.iter().filter(|&&keep| keep).count();
                weights.push(shapley_kernel(m, s));
                coalitions.push(z);
            }
            return (coalitions, weights, true);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let size_weights: Vec<f64> = (1..m).map(|s| (m - 1) as f64 / (s * (m - s)) as f64).collect();
        let size_total: f64 = size_weights.iter().sum();

        let pairs = (self.max_evals / 2).max(1);
        let mut coalitions = Vec::with_capacity(pairs * 2);
        for _ in 0..pairs {
            let mut draw = rng.random::<f64>() * size_total;
            let mut size = m - 1;
            for (k, &w) in size_weights.iter().enumerate() {
                if draw < w {
                    size = k + 1;
                    break;
                }
                draw -= w;
            }

            let mut z = vec![false; m];
            for j in rand::seq::index::sample(&mut rng, m, size) {
                z[j] = true;
            }
            let complement: Vec<bool> = z.iter().map(|&keep| !keep).collect();
            coalitions.push(z);
            coalitions.push(complement);
        }
        let weights = vec![1.0; coalitions.len()];
        (coalitions, weights, false)
    }

    /// Attribute `f` over `m` features
    ///
    /// `f` maps a batch of coalitions (`true` = feature kept) to one output
    /// each, in order. The first two coalitions passed are "none kept" and
    /// "all kept".
    pub fn explain<F>(&self, m: usize, mut f: F) -> Result<ShapValues>
    where
        F: FnMut(&[Vec<bool>]) -> Result<Vec<f64>>,
    {
        let (coalitions, weights, exact) = self.coalitions(m);

        let mut batch = Vec::with_capacity(coalitions.len() + 2);
        batch.push(vec![false; m]);
        batch.push(vec![true; m]);
        batch.extend(coalitions.iter().cloned());

        let outputs = f(&batch)?;
        if outputs.len() != batch.len() {
            return Err(Error::shape("coalition outputs", vec![batch.len()], vec![outputs.len()]));
        }
        let (base_value, full_value) = (outputs[0], outputs[1]);
        let total = full_value - base_value;

        let values = match m {
            0 => Vec::new(),
            1 => vec![total],
            _ => {
                // Eliminate the last feature through the efficiency constraint
                let last = m - 1;
                let n = coalitions.len();
                let x = Array2::from_shape_fn((n, last), |(i, j)| {
                    f64::from(u8::from(coalitions[i][j])) - f64::from(u8::from(coalitions[i][last]))
                });
                let y = Array1::from_shape_fn(n, |i| {
                    outputs[i + 2] - base_value - f64::from(u8::from(coalitions[i][last])) * total
                });
                let phi = weighted_least_squares(&x, &y, &Array1::from(weights));

                let mut values = phi.to_vec();
                values.push(total - phi.sum());
                values
            }
        };

        Ok(ShapValues { base_value, full_value, values, exact, n_evals: batch.len() })
    }
}

/// Shapley kernel weight of a coalition of size `s` out of `m`
fn shapley_kernel(m: usize, s: usize) -> f64 {
    let binomial = (1..=s).fold(1.0f64, |acc, k| acc * (m - s + k) as f64 / k as f64);
    (m - 1) as f64 / (binomial * s as f64 * (m - s) as f64)
}
