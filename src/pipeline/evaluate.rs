//! Score the persisted artifacts on a test sample

use super::{Artifacts, DEVICE};
use crate::cli::{log, LogLevel};
use crate::config::PipelineConfig;
use crate::data::load_reviews;
use crate::error::Result;
use crate::eval::{save_confusion_matrix, EvaluationReport, Evaluator};
use crate::tokenizer::Tokenizer;

/// Evaluate on `evaluate.num_samples` test rows and write the confusion-matrix image
pub fn evaluate(config: &PipelineConfig, level: LogLevel) -> Result<EvaluationReport> {
    log(level, LogLevel::Normal, "--- Starting Model Evaluation ---");
    let artifacts = Artifacts::load(config, level)?;

    log(level, LogLevel::Normal, "Loading test data...");
    let records = load_reviews(&config.test_csv(), config.evaluate.num_samples, config.evaluate.seed)?;
    log(level, LogLevel::Normal, &format!("Using device: {DEVICE}"));

    let texts: Vec<String> = records.iter().map(|r| r.text()).collect();
    let labels: Vec<_> = records.iter().map(|r| r.label).collect();
    let encodings = artifacts.tokenizer.encode_batch(&texts, config.tokenizer.max_len)?;

    log(level, LogLevel::Normal, "Making predictions with XGBoost classifier...");
    let report = Evaluator::new(&artifacts.encoder, &artifacts.classifier, config.evaluate.batch_size)
        .with_log_level(level)
        .evaluate(&encodings, &labels)?;

    log(level, LogLevel::Normal, "\n--- Performance Metrics ---");
    log(level, LogLevel::Normal, report.to_string().trim_end());

    let path = config.confusion_matrix_path();
    save_confusion_matrix(&report.confusion, &path)?;
    log(level, LogLevel::Normal, &format!("Confusion matrix saved to {}", path.display()));
    log(level, LogLevel::Normal, "\n--- Evaluation Finished ---");

    Ok(report)
}
