//! Learning rate schedulers
//!
//! - `LinearWarmupDecayLR` - Linear warmup from 0 to target, then linear decay to 0

mod linear_decay;

#[cfg(test)]
mod tests;

pub use linear_decay::LinearWarmupDecayLR;

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Step the scheduler (typically called after each batch)
    fn step(&mut self);
}
