//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// Parameters are borrowed from the model for the duration of one step, so
/// the optimizer keeps per-parameter state by position in the slice.
pub trait Optimizer {
    /// Perform a single optimization step
    fn step(&mut self, params: &mut [&mut Tensor]);

    /// Zero gradients on referenced parameters
    fn zero_grad(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    /// Plain gradient descent for exercising the default methods
    struct TestOptimizer {
        learning_rate: f32,
    }

    impl Optimizer for TestOptimizer {
        fn step(&mut self, params: &mut [&mut Tensor]) {
            for param in params.iter_mut() {
                let lr = self.learning_rate;
                if let (data, Some(grad)) = param.data_and_grad_mut() {
                    data.zip_mut_with(grad, |d, g| *d -= lr * g);
                }
            }
        }

        fn lr(&self) -> f32 {
            self.learning_rate
        }

        fn set_lr(&mut self, lr: f32) {
            self.learning_rate = lr;
        }
    }

    #[test]
    fn test_optimizer_step_refs_multiple_params() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        let mut param1 = Tensor::from_vec(vec![1.0, 2.0], true);
        let mut param2 = Tensor::from_vec(vec![3.0, 4.0], true);
        param1.set_grad(arr1(&[0.5, 1.0]));
        param2.set_grad(arr1(&[1.5, 2.0]));

        opt.step(&mut [&mut param1, &mut param2]);

        let data1 = param1.data().to_vec();
        let data2 = param2.data().to_vec();
        assert!((data1[0] - 0.95).abs() < 1e-6);
        assert!((data1[1] - 1.9).abs() < 1e-6);
        assert!((data2[0] - 2.85).abs() < 1e-6);
        assert!((data2[1] - 3.8).abs() < 1e-6);
    }

    #[test]
    fn test_optimizer_zero_grad() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        let mut param = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        param.set_grad(arr1(&[0.5, 1.0, 1.5]));

        opt.zero_grad(&mut [&mut param]);
        assert!(param.grad().is_none());
    }

    #[test]
    fn test_optimizer_set_lr() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        opt.set_lr(0.01);
        assert_eq!(opt.lr(), 0.01);
    }
}
