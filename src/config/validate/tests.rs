//! Unit tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;

#[test]
fn test_valid_config() {
    assert!(validate_config(&PipelineConfig::default()).is_ok());
}

#[test]
fn test_invalid_seq_len() {
    let mut config = PipelineConfig::default();
    config.tokenizer.max_len = 2;
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidSeqLen(2)));
}

#[test]
fn test_invalid_batch_size() {
    let mut config = PipelineConfig::default();
    config.evaluate.batch_size = 0;
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidBatchSize { stage: "evaluate", size: 0 }));
}

#[test]
fn test_invalid_sample_size() {
    let mut config = PipelineConfig::default();
    config.train.num_samples = 0;
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidSampleSize { stage: "train", .. }));
}

#[test]
fn test_invalid_learning_rate() {
    let mut config = PipelineConfig::default();
    config.optimizer.lr = 0.0;
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidLearningRate(_)));

    config.optimizer.lr = 1.5;
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_invalid_fraction() {
    let mut config = PipelineConfig::default();
    config.gbdt.test_size = 1.0;
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidFraction { name: "test_size", .. }));
}

#[test]
fn test_invalid_subsample() {
    let mut config = PipelineConfig::default();
    config.gbdt.subsample = 0.0;
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidSampleRatio { name: "subsample", .. }));
}

#[test]
fn test_zero_min_child_weight_allowed() {
    let mut config = PipelineConfig::default();
    config.gbdt.min_child_weight = 0.0;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_invalid_depth() {
    let mut config = PipelineConfig::default();
    config.gbdt.max_depth = 0;
    assert!(matches!(validate_config(&config), Err(ValidationError::InvalidMaxDepth(0))));
}

#[test]
fn test_error_message_names_bounds() {
    let err = ValidationError::InvalidEpochs(0);
    assert_eq!(err.to_string(), "Invalid epochs: 0 (must be > 0)");
}
