//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::PipelineConfig;
use crate::pipeline;

pub fn run_train(config: &PipelineConfig, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Root: {}\n  Epochs: {}\n  Batch size: {}\n  Learning rate: {}\n  Trees: {} (depth {})",
            config.root.display(),
            config.train.epochs,
            config.train.batch_size,
            config.optimizer.lr,
            config.gbdt.n_estimators,
            config.gbdt.max_depth
        ),
    );

    let summary = pipeline::train(config, level).map_err(|e| format!("Training error: {e}"))?;

    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  {} optimizer steps in {} ms, {} hold-out rows",
            summary.fine_tune.steps, summary.fine_tune.total_time_ms, summary.holdout_size
        ),
    );
    Ok(())
}
