//! Linear warmup + linear decay learning rate scheduler

use super::LRScheduler;
use crate::optim::Optimizer;

/// Linear Warmup / Linear Decay Learning Rate Scheduler
///
/// Increases the learning rate from 0 to target over `warmup_steps`, then
/// decreases it linearly to exactly 0 at `total_steps`.
///
/// Formula:
/// - t < warmup: lr_t = lr_target * t / warmup_steps
/// - otherwise:  lr_t = lr_target * max(0, (total - t) / (total - warmup))
pub struct LinearWarmupDecayLR {
    lr_target: f32,
    warmup_steps: usize,
    total_steps: usize,
    current_step: usize,
}

impl LinearWarmupDecayLR {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `lr_target` - Peak learning rate reached after warmup
    /// * `warmup_steps` - Number of steps for warmup
    /// * `total_steps` - Step at which the learning rate reaches 0
    pub fn new(lr_target: f32, warmup_steps: usize, total_steps: usize) -> Self {
        Self { lr_target, warmup_steps, total_steps, current_step: 0 }
    }

    /// Apply the current learning rate to an optimizer
    pub fn apply<O: Optimizer>(&self, optimizer: &mut O) {
        optimizer.set_lr(self.get_lr());
    }

    /// Number of steps taken so far
    pub fn current_step(&self) -> usize {
        self.current_step
    }
}

impl LRScheduler for LinearWarmupDecayLR {
    fn get_lr(&self) -> f32 {
        let t = self.current_step;
        if t < self.warmup_steps {
            return self.lr_target * t as f32 / self.warmup_steps as f32;
        }
        if self.total_steps <= self.warmup_steps {
            return 0.0;
        }
        let remaining = self.total_steps.saturating_sub(t) as f32;
        let span = (self.total_steps - self.warmup_steps) as f32;
        self.lr_target * (remaining / span).max(0.0)
    }

    fn step(&mut self) {
        self.current_step += 1;
    }
}
