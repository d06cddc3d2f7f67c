//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid sequence length: {0} (must be >= 3 to hold [CLS], a token and [SEP])")]
    InvalidSeqLen(usize),

    #[error("Invalid batch size for {stage}: {size} (must be > 0)")]
    InvalidBatchSize { stage: &'static str, size: usize },

    #[error("Invalid sample size for {stage}: {size} (must be > 0)")]
    InvalidSampleSize { stage: &'static str, size: usize },

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid beta {name}: {value} (must be in [0.0, 1.0))")]
    InvalidBeta { name: &'static str, value: f32 },

    #[error("Invalid weight decay: {0} (must be >= 0.0)")]
    InvalidWeightDecay(f32),

    #[error("Invalid gradient clip value: {0} (must be > 0.0)")]
    InvalidGradClip(f32),

    #[error("Invalid {name}: {value} (must be in (0.0, 1.0))")]
    InvalidFraction { name: &'static str, value: f64 },

    #[error("Invalid estimator count: {0} (must be > 0)")]
    InvalidEstimators(usize),

    #[error("Invalid tree depth: {0} (must be in 1..=16)")]
    InvalidMaxDepth(usize),

    #[error("Invalid boosting learning rate: {0} (must be > 0.0)")]
    InvalidBoostingRate(f32),

    #[error("Invalid {name}: {value} (must be in (0.0, 1.0])")]
    InvalidSampleRatio { name: &'static str, value: f32 },

    #[error("Invalid {name}: {value} (must be >= 0.0)")]
    NegativeRegularization { name: &'static str, value: f32 },

    #[error("Invalid max_bin: {0} (must be in 2..=65536)")]
    InvalidMaxBin(usize),

    #[error("Invalid attribution budget: {0} (must be >= 2)")]
    InvalidMaxEvals(usize),

    #[error("Invalid top_k: {0} (must be > 0)")]
    InvalidTopK(usize),
}
