//! Evaluate command implementation

use crate::cli::LogLevel;
use crate::config::PipelineConfig;
use crate::pipeline;

pub fn run_evaluate(config: &PipelineConfig, level: LogLevel) -> Result<(), String> {
    pipeline::evaluate(config, level).map_err(|e| format!("Evaluation error: {e}"))?;
    Ok(())
}
