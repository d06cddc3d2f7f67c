//! Error types with actionable diagnostics (Andon principle).
//!
//! Every failure in the pipeline is fatal for the run. Variants carry enough
//! context for the user to fix the problem without reading the source: the
//! second line of each message (`→ ...`) is the remediation hint.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for veraz operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Review dataset CSV not found.
    #[error("Dataset not found at {}\n  → Download the Amazon Polarity dataset and place '{file}' in the '{dir}' directory", .path.display())]
    DatasetNotFound { path: PathBuf, file: String, dir: String },

    /// A model artifact (encoder directory, classifier file, vocabulary) is missing.
    #[error("Model artifact not found: {}\n  → {hint}", .path.display())]
    ArtifactNotFound { path: PathBuf, hint: String },

    /// Requested sample exceeds the dataset size.
    #[error("Cannot sample {requested} rows from a dataset of {available} rows\n  → Lower num_samples in the configuration or provide a larger dataset")]
    SampleSize { requested: usize, available: usize },

    /// A raw label outside {1, 2}.
    #[error("Invalid label '{value}' at row {row}\n  → Labels must be 1 (fake) or 2 (genuine)")]
    InvalidLabel { row: usize, value: String },

    /// Tensor or batch shapes disagree with what the model expects.
    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}\n  → Check that the artifacts and the configuration describe the same model")]
    ShapeMismatch { context: String, expected: Vec<usize>, actual: Vec<usize> },

    /// Weight tensor absent from a checkpoint.
    #[error("Missing weight '{name}' in {}\n  → The checkpoint is not a BERT encoder or is truncated", .path.display())]
    MissingWeight { name: String, path: PathBuf },

    /// Tokenizer failure (vocabulary, special tokens).
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON / YAML / SafeTensors encoding error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Image rendering or encoding error.
    #[error("Render error: {0}")]
    Render(String),
}

impl Error {
    /// Create a shape mismatch error.
    pub fn shape(context: impl Into<String>, expected: Vec<usize>, actual: Vec<usize>) -> Self {
        Self::ShapeMismatch { context: context.into(), expected, actual }
    }

    /// Check if this error is caused by missing inputs the user can provide.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::DatasetNotFound { .. } | Self::ArtifactNotFound { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
