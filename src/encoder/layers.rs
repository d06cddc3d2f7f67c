//! Dense, normalization and activation layers with explicit backward passes
//!
//! Every layer keeps its parameters in [`Tensor`]s and exposes
//! `forward` (returning whatever the backward pass needs) and `backward`
//! (accumulating parameter gradients and returning the input gradient).

use crate::error::{Error, Result};
use crate::Tensor;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::PI;

/// Sample a tensor from N(0, std²) with the Box-Muller transform
pub(crate) fn normal_tensor(shape: Vec<usize>, std: f32, rng: &mut StdRng) -> Tensor {
    let len: usize = shape.iter().product();
    let data: Vec<f32> = (0..len)
        .map(|_| {
            let u1: f64 = rng.random::<f64>().max(1e-10);
            let u2: f64 = rng.random::<f64>();
            ((-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()) as f32 * std
        })
        .collect();
    Tensor::from_shape_vec(shape, data, true)
}

/// Parameter reference tagged with its checkpoint name
pub type NamedParam<'a> = (String, &'a Tensor);
pub type NamedParamMut<'a> = (String, &'a mut Tensor);

/// Fully connected layer `y = x Wᵀ + b` with `W: [out, in]`
#[derive(Debug, Clone)]
pub struct Linear {
    pub weight: Tensor,
    pub bias: Tensor,
}

impl Linear {
    /// Weights from N(0, std²), zero bias
    pub fn new_random(in_features: usize, out_features: usize, std: f32, rng: &mut StdRng) -> Self {
        Self {
            weight: normal_tensor(vec![out_features, in_features], std, rng),
            bias: Tensor::zeros(vec![out_features], true),
        }
    }

    pub fn in_features(&self) -> usize {
        self.weight.shape()[1]
    }

    pub fn out_features(&self) -> usize {
        self.weight.shape()[0]
    }

    /// `x: [T, in]` -> `[T, out]`
    pub fn forward(&self, x: &Array2<f32>) -> Array2<f32> {
        x.dot(&self.weight.matrix().t()) + &self.bias.vector()
    }

    /// Accumulate dW = dyᵀx, db = Σ dy and return dx = dy W
    pub fn backward(&self, x: &Array2<f32>, dy: &Array2<f32>) -> Array2<f32> {
        self.weight.accumulate_matrix_grad(dy.t().dot(x).view());
        self.bias.accumulate_grad(dy.sum_axis(Axis(0)));
        dy.dot(&self.weight.matrix())
    }

    pub fn named_params(&self, prefix: &str) -> Vec<NamedParam<'_>> {
        vec![(format!("{prefix}.weight"), &self.weight), (format!("{prefix}.bias"), &self.bias)]
    }

    pub fn named_params_mut(&mut self, prefix: &str) -> Vec<NamedParamMut<'_>> {
        vec![
            (format!("{prefix}.weight"), &mut self.weight),
            (format!("{prefix}.bias"), &mut self.bias),
        ]
    }
}

/// Layer normalization over the hidden dimension
#[derive(Debug, Clone)]
pub struct LayerNorm {
    pub weight: Tensor,
    pub bias: Tensor,
    pub eps: f32,
}

/// Normalized input and per-row inverse standard deviation
#[derive(Debug, Clone)]
pub struct LayerNormCache {
    xhat: Array2<f32>,
    inv_std: Array1<f32>,
}

impl LayerNorm {
    /// γ = 1, β = 0
    pub fn new(dim: usize, eps: f32) -> Self {
        Self { weight: Tensor::full(vec![dim], 1.0, true), bias: Tensor::zeros(vec![dim], true), eps }
    }

    pub fn forward(&self, x: &Array2<f32>) -> (Array2<f32>, LayerNormCache) {
        let n = x.ncols() as f32;
        let mut xhat = x.clone();
        let mut inv_std = Array1::zeros(x.nrows());
        for (mut row, inv) in xhat.rows_mut().into_iter().zip(inv_std.iter_mut()) {
            let mean = row.sum() / n;
            row.mapv_inplace(|v| v - mean);
            let var = row.iter().map(|v| v * v).sum::<f32>() / n;
            *inv = 1.0 / (var + self.eps).sqrt();
            let scale = *inv;
            row.mapv_inplace(|v| v * scale);
        }
        let y = &xhat * &self.weight.vector() + &self.bias.vector();
        (y, LayerNormCache { xhat, inv_std })
    }

    pub fn backward(&self, cache: &LayerNormCache, dy: &Array2<f32>) -> Array2<f32> {
        self.weight.accumulate_grad((dy * &cache.xhat).sum_axis(Axis(0)));
        self.bias.accumulate_grad(dy.sum_axis(Axis(0)));

        let n = dy.ncols() as f32;
        let mut dx = dy * &self.weight.vector();
        for ((mut dx_row, xhat_row), &inv) in
            dx.rows_mut().into_iter().zip(cache.xhat.rows()).zip(cache.inv_std.iter())
        {
            let sum_dxhat = dx_row.sum();
            let sum_dxhat_xhat = dx_row.iter().zip(xhat_row.iter()).map(|(a, b)| a * b).sum::<f32>();
            dx_row.zip_mut_with(&xhat_row, |d, &xh| {
                *d = inv / n * (n * *d - sum_dxhat - xh * sum_dxhat_xhat);
            });
        }
        dx
    }

    pub fn named_params(&self, prefix: &str) -> Vec<NamedParam<'_>> {
        vec![(format!("{prefix}.weight"), &self.weight), (format!("{prefix}.bias"), &self.bias)]
    }

    pub fn named_params_mut(&mut self, prefix: &str) -> Vec<NamedParamMut<'_>> {
        vec![
            (format!("{prefix}.weight"), &mut self.weight),
            (format!("{prefix}.bias"), &mut self.bias),
        ]
    }
}

/// Feed-forward activation selected by `hidden_act`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Exact GELU, x·Φ(x)
    Gelu,
    /// Tanh approximation of GELU
    GeluTanh,
    Relu,
}

impl Activation {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "gelu" => Ok(Self::Gelu),
            "gelu_new" | "gelu_pytorch_tanh" | "gelu_fast" => Ok(Self::GeluTanh),
            "relu" => Ok(Self::Relu),
            other => Err(Error::ConfigError(format!("unsupported hidden_act '{other}'"))),
        }
    }

    pub fn forward(self, x: &Array2<f32>) -> Array2<f32> {
        x.mapv(|v| self.apply(v))
    }

    /// dy ⊙ f'(x)
    pub fn backward(self, x: &Array2<f32>, dy: &Array2<f32>) -> Array2<f32> {
        let mut dx = dy.clone();
        dx.zip_mut_with(x, |d, &v| *d *= self.derivative(v));
        dx
    }

    fn apply(self, x: f32) -> f32 {
        let x = x as f64;
        let y = match self {
            Self::Gelu => 0.5 * x * (1.0 + erf(x / std::f64::consts::SQRT_2)),
            Self::GeluTanh => 0.5 * x * (1.0 + gelu_tanh_inner(x).tanh()),
            Self::Relu => x.max(0.0),
        };
        y as f32
    }

    fn derivative(self, x: f32) -> f32 {
        let x = x as f64;
        let d = match self {
            Self::Gelu => {
                let cdf = 0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2));
                let pdf = (-0.5 * x * x).exp() / (2.0 * PI).sqrt();
                cdf + x * pdf
            }
            Self::GeluTanh => {
                let t = gelu_tanh_inner(x).tanh();
                let inner_grad = (2.0 / PI).sqrt() * (1.0 + 3.0 * 0.044715 * x * x);
                0.5 * (1.0 + t) + 0.5 * x * (1.0 - t * t) * inner_grad
            }
            Self::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        };
        d as f32
    }
}

fn gelu_tanh_inner(x: f64) -> f64 {
    (2.0 / PI).sqrt() * (x + 0.044715 * x * x * x)
}

/// Error function (Abramowitz & Stegun 7.1.26, |ε| < 1.5e-7)
fn erf(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A: [f64; 5] = [0.254_829_592, -0.284_496_736, 1.421_413_741, -1.453_152_027, 1.061_405_429];

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = t * (A[0] + t * (A[1] + t * (A[2] + t * (A[3] + t * A[4]))));
    sign * (1.0 - poly * (-x * x).exp())
}
