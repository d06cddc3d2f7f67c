//! Gradient clipping utilities

use crate::Tensor;

/// Global L2 norm over all parameter gradients
pub fn global_grad_norm(params: &[&mut Tensor]) -> f32 {
    let total_norm_sq: f32 = params
        .iter()
        .filter_map(|param| param.grad_slice())
        .map(|grad| grad.iter().map(|&g| g * g).sum::<f32>())
        .sum();
    total_norm_sq.sqrt()
}

/// Clip gradients by global norm
///
/// Computes the global norm of all gradients and scales them down if the norm
/// exceeds max_norm, preserving the relative magnitudes across parameters.
///
/// Algorithm:
/// 1. global_norm = sqrt(sum of all gradient squared norms)
/// 2. If global_norm > max_norm: every gradient *= max_norm / global_norm
///
/// # Returns
/// The global norm before clipping
pub fn clip_grad_norm(params: &mut [&mut Tensor], max_norm: f32) -> f32 {
    let global_norm = global_grad_norm(params);

    if global_norm > max_norm {
        let clip_coef = max_norm / global_norm;
        for param in params.iter_mut() {
            if let Some(grad) = param.grad_mut() {
                *grad *= clip_coef;
            }
        }
    }

    global_norm
}
