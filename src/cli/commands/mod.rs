//! CLI command implementations

mod evaluate;
mod explain;
mod train;


use crate::cli::LogLevel;
use crate::config::{load_config, Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    // Configure output based on verbose/quiet flags
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    let config = load_config(&cli).map_err(|e| format!("Config error: {e}"))?;

    match cli.command {
        Command::Train => train::run_train(&config, log_level),
        Command::Evaluate => evaluate::run_evaluate(&config, log_level),
        Command::Explain(args) => explain::run_explain(&config, &args, log_level),
    }
}
