//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Veraz: fake-review detection pipeline
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "veraz")]
#[command(version)]
#[command(
    about = "Fake-review detector: BERT fine-tuning, CLS embeddings, boosted trees and token attributions"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to YAML pipeline configuration
    #[arg(short, long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the directory data/ and bin/ are resolved against
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fine-tune the encoder, extract embeddings and fit the tree classifier
    Train,

    /// Score the saved pipeline on a sample of the test set
    Evaluate,

    /// Attribute a prediction to individual tokens
    Explain(ExplainArgs),
}

/// Arguments for the explain command
#[derive(Parser, Debug, Clone, PartialEq, Default)]
pub struct ExplainArgs {
    /// Review texts to explain (defaults to two built-in demo reviews)
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,
}

/// Parse CLI arguments (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_command() {
        let cli = parse_args(["veraz", "train"]).unwrap();
        assert_eq!(cli.command, Command::Train);
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            parse_args(["veraz", "evaluate", "--config", "p.yaml", "--root", "/tmp/x", "-q"])
                .unwrap();
        assert_eq!(cli.command, Command::Evaluate);
        assert_eq!(cli.config, Some(PathBuf::from("p.yaml")));
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
        assert!(cli.quiet);
    }

    #[test]
    fn test_parse_explain_texts() {
        let cli = parse_args(["veraz", "explain", "great product", "total scam"]).unwrap();
        match cli.command {
            Command::Explain(args) => {
                assert_eq!(args.texts, vec!["great product", "total scam"]);
            }
            other => panic!("Expected Explain command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_explain_defaults_empty() {
        let cli = parse_args(["veraz", "-v", "explain"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.command, Command::Explain(ExplainArgs::default()));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(parse_args(["veraz", "serve"]).is_err());
    }
}
