//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::PipelineConfig;

/// Validate a pipeline configuration
///
/// Checks numeric ranges only; file existence is checked by each stage so
/// the error can name the command that produces the missing file.
pub fn validate_config(config: &PipelineConfig) -> Result<(), ValidationError> {
    if config.tokenizer.max_len < 3 {
        return Err(ValidationError::InvalidSeqLen(config.tokenizer.max_len));
    }

    // Sample and batch sizes
    let sizes = [
        ("train", config.train.num_samples, config.train.batch_size),
        ("evaluate", config.evaluate.num_samples, config.evaluate.batch_size),
    ];
    for (stage, samples, batch) in sizes {
        if samples == 0 {
            return Err(ValidationError::InvalidSampleSize { stage, size: samples });
        }
        if batch == 0 {
            return Err(ValidationError::InvalidBatchSize { stage, size: batch });
        }
    }
    if config.explain.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize { stage: "explain", size: 0 });
    }

    if config.train.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(config.train.epochs));
    }
    if config.train.max_grad_norm <= 0.0 {
        return Err(ValidationError::InvalidGradClip(config.train.max_grad_norm));
    }
    validate_fraction("val_fraction", config.train.val_fraction)?;
    validate_fraction("test_size", config.gbdt.test_size)?;

    // Optimizer
    let opt = &config.optimizer;
    if opt.lr <= 0.0 || opt.lr > 1.0 {
        return Err(ValidationError::InvalidLearningRate(opt.lr));
    }
    for (name, value) in [("beta1", opt.beta1), ("beta2", opt.beta2)] {
        if !(0.0..1.0).contains(&value) {
            return Err(ValidationError::InvalidBeta { name, value });
        }
    }
    if opt.weight_decay < 0.0 {
        return Err(ValidationError::InvalidWeightDecay(opt.weight_decay));
    }

    // Tree ensemble
    let gbdt = &config.gbdt;
    if gbdt.n_estimators == 0 {
        return Err(ValidationError::InvalidEstimators(gbdt.n_estimators));
    }
    if gbdt.max_depth == 0 || gbdt.max_depth > 16 {
        return Err(ValidationError::InvalidMaxDepth(gbdt.max_depth));
    }
    if gbdt.learning_rate <= 0.0 {
        return Err(ValidationError::InvalidBoostingRate(gbdt.learning_rate));
    }
    for (name, value) in [("subsample", gbdt.subsample), ("colsample_bytree", gbdt.colsample_bytree)]
    {
        if value <= 0.0 || value > 1.0 {
            return Err(ValidationError::InvalidSampleRatio { name, value });
        }
    }
    for (name, value) in [
        ("min_child_weight", gbdt.min_child_weight),
        ("reg_lambda", gbdt.reg_lambda),
        ("gamma", gbdt.gamma),
    ] {
        if value < 0.0 {
            return Err(ValidationError::NegativeRegularization { name, value });
        }
    }
    if !(2..=65_536).contains(&gbdt.max_bin) {
        return Err(ValidationError::InvalidMaxBin(gbdt.max_bin));
    }

    if config.explain.max_evals < 2 {
        return Err(ValidationError::InvalidMaxEvals(config.explain.max_evals));
    }
    if config.explain.top_k == 0 {
        return Err(ValidationError::InvalidTopK(config.explain.top_k));
    }

    Ok(())
}

fn validate_fraction(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if value <= 0.0 || value >= 1.0 {
        return Err(ValidationError::InvalidFraction { name, value });
    }
    Ok(())
}
