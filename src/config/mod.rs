//! Declarative pipeline configuration
//!
//! Every field defaults to the constants the pipeline was tuned with, so an
//! empty YAML file (or no file at all) reproduces the reference run.

mod cli;
mod load;
mod schema;
mod validate;

pub use cli::{parse_args, Cli, Command, ExplainArgs};
pub use load::{load_config, load_config_file};
pub use schema::{
    EvaluateConfig, ExplainConfig, GbdtConfig, OptimizerConfig, PathsConfig, PipelineConfig,
    TokenizerConfig, TrainConfig,
};
pub use validate::{validate_config, ValidationError};
