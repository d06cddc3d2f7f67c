//! Explain command implementation

use crate::cli::LogLevel;
use crate::config::{ExplainArgs, PipelineConfig};
use crate::pipeline;

pub fn run_explain(config: &PipelineConfig, args: &ExplainArgs, level: LogLevel) -> Result<(), String> {
    pipeline::explain(config, &args.texts, level).map_err(|e| format!("Explain error: {e}"))?;
    Ok(())
}
