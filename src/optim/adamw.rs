//! AdamW optimizer (Adam with decoupled Weight decay)

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// AdamW optimizer
///
/// Bias-corrected Adam with weight decay applied directly to the parameters:
///
/// θ_t = (1 - lr * λ) * θ_{t-1} - lr_t * m_t / (√v_t + ε)
///
/// where lr_t = lr * √(1 - β2^t) / (1 - β1^t).
pub struct AdamW {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>, // First moment
    v: Vec<Option<Array1<f32>>>, // Second moment
}

impl AdamW {
    /// Create a new AdamW optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32, weight_decay: f32) -> Self {
        Self { lr, beta1, beta2, epsilon, weight_decay, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Create AdamW with default parameters (weight_decay = 0.01)
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8, 0.01)
    }

    /// Get optimizer step counter.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.t
    }

    /// Get weight decay hyperparameter.
    #[must_use]
    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }

    /// Get epsilon hyperparameter.
    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }
}

impl Optimizer for AdamW {
    fn step(&mut self, params: &mut [&mut Tensor]) {
        if self.m.len() < params.len() {
            self.m.resize(params.len(), None);
            self.v.resize(params.len(), None);
        }
        self.t += 1;

        let lr_t = self.lr
            * ((1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)));
        let weight_decay_factor = 1.0 - self.lr * self.weight_decay;
        let (beta1, beta2, eps) = (self.beta1, self.beta2, self.epsilon);

        for (i, param) in params.iter_mut().enumerate() {
            let (data, Some(grad)) = param.data_and_grad_mut() else {
                continue;
            };

            let m = self.m[i].get_or_insert_with(|| Array1::zeros(grad.len()));
            let v = self.v[i].get_or_insert_with(|| Array1::zeros(grad.len()));

            // m_t = β1 * m_{t-1} + (1 - β1) * g
            m.zip_mut_with(grad, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
            // v_t = β2 * v_{t-1} + (1 - β2) * g²
            v.zip_mut_with(grad, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

            ndarray::Zip::from(data).and(&*m).and(&*v).for_each(|p, &m, &v| {
                *p = *p * weight_decay_factor - lr_t * m / (v.sqrt() + eps);
            });
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_adamw_quadratic_convergence() {
        // f(x) = x², ∇ = 2x
        let mut param = Tensor::from_vec(vec![5.0, -3.0, 2.0], true);
        let mut optimizer = AdamW::default_params(0.1);

        for _ in 0..100 {
            let grad = param.data().mapv(|x| 2.0 * x);
            param.set_grad(grad);
            optimizer.step(&mut [&mut param]);
        }

        for &val in param.data() {
            assert!(val.abs() < 0.5, "Value {val} did not converge");
        }
    }

    #[test]
    fn test_adamw_weight_decay() {
        let mut param = Tensor::from_vec(vec![1.0], true);
        let mut optimizer = AdamW::new(0.1, 0.9, 0.999, 1e-8, 0.1);

        // Zero gradient: only decay applies, (1 - 0.1 * 0.1) * 1.0
        param.set_grad(ndarray::arr1(&[0.0]));
        optimizer.step(&mut [&mut param]);

        assert_abs_diff_eq!(param.data()[0], 0.99, epsilon = 1e-6);
    }

    #[test]
    fn test_adamw_first_step_magnitude() {
        // With bias correction the first step moves each weight by ~lr
        let mut param = Tensor::from_vec(vec![0.0, 0.0], true);
        let mut optimizer = AdamW::new(0.01, 0.9, 0.999, 1e-8, 0.0);

        param.set_grad(ndarray::arr1(&[3.0, -0.2]));
        optimizer.step(&mut [&mut param]);

        assert_abs_diff_eq!(param.data()[0], -0.01, epsilon = 1e-5);
        assert_abs_diff_eq!(param.data()[1], 0.01, epsilon = 1e-5);
        assert_eq!(optimizer.step_count(), 1);
    }

    #[test]
    fn test_adamw_no_grad_untouched() {
        let mut with_grad = Tensor::from_vec(vec![1.0], true);
        let mut without_grad = Tensor::from_vec(vec![1.0], true);
        let mut optimizer = AdamW::new(0.1, 0.9, 0.999, 1e-8, 0.0);

        with_grad.set_grad(ndarray::arr1(&[1.0]));
        optimizer.step(&mut [&mut with_grad, &mut without_grad]);

        assert!(with_grad.data()[0] < 1.0);
        assert_eq!(without_grad.data()[0], 1.0);
    }

    #[test]
    fn test_adamw_lr_getter_setter() {
        let mut optimizer = AdamW::default_params(2e-5);
        assert_abs_diff_eq!(optimizer.lr(), 2e-5);
        optimizer.set_lr(1e-5);
        assert_abs_diff_eq!(optimizer.lr(), 1e-5);
        assert_abs_diff_eq!(optimizer.weight_decay(), 0.01);
        assert_abs_diff_eq!(optimizer.epsilon(), 1e-8);
    }
}
