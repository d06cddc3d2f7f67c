//! Veraz CLI
//!
//! Fake-review detection: fine-tune, evaluate and explain.
//!
//! # Usage
//!
//! ```bash
//! # Fine-tune BERT, extract embeddings, fit the tree classifier
//! veraz train
//!
//! # Score the saved pipeline on the test set
//! veraz evaluate --config pipeline.yaml
//!
//! # Explain the built-in demo reviews, or your own
//! veraz explain "Total garbage, a scam."
//! ```

use clap::Parser;
use std::process::ExitCode;
use veraz::cli::{run_command, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
