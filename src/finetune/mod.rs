//! Fine-tuning the encoder and classification head
//!
//! - Mean cross-entropy over shuffled mini-batches
//! - AdamW with linear warmup and linear decay to zero
//! - Global gradient-norm clipping before every step
//! - Validation loss and accuracy after every epoch

mod trainer;

pub use trainer::{EpochMetrics, FineTuneConfig, FineTuneResult, FineTuner, TrainingExample};
