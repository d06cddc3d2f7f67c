//! End-to-end workflows behind the `train`, `evaluate` and `explain` commands
//!
//! The three workflows communicate only through the persisted artifacts:
//! the fine-tuned encoder directory and the tree-classifier file.

mod evaluate;
mod explain;
mod train;

pub use evaluate::evaluate;
pub use explain::explain;
pub use train::{train, TrainSummary};

use crate::cli::{log, LogLevel};
use crate::config::PipelineConfig;
use crate::encoder::BertModel;
use crate::error::{Error, Result};
use crate::gbdt::GradientBoostedTrees;
use crate::tokenizer::WordPieceTokenizer;
use std::path::Path;

/// Execution target of every kernel
pub const DEVICE: &str = "cpu";

/// Accuracy the hold-out set should reach
pub const ACCURACY_TARGET: f64 = 0.85;

/// Artifacts written by `train` and read by `evaluate` and `explain`
pub struct Artifacts {
    pub tokenizer: WordPieceTokenizer,
    pub encoder: BertModel,
    pub classifier: GradientBoostedTrees,
}

impl Artifacts {
    /// Load the fine-tuned encoder, its tokenizer and the tree classifier
    pub fn load(config: &PipelineConfig, level: LogLevel) -> Result<Self> {
        let encoder_dir = config.finetuned_dir();
        require_trained(&encoder_dir)?;
        let classifier_path = config.classifier_path();
        require_trained(&classifier_path)?;

        log(level, LogLevel::Normal, "Loading models and tokenizer...");
        let tokenizer = WordPieceTokenizer::from_dir(&encoder_dir)?;
        let (model, _) = crate::encoder::BertForSequenceClassification::from_pretrained(
            &encoder_dir,
            config.train.seed,
        )?;
        let classifier = GradientBoostedTrees::load(&classifier_path)?;

        if classifier.n_features != model.bert.hidden_size() {
            return Err(Error::shape(
                "tree classifier features",
                vec![model.bert.hidden_size()],
                vec![classifier.n_features],
            ));
        }

        Ok(Self { tokenizer, encoder: model.bert, classifier })
    }
}

fn require_trained(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::ArtifactNotFound {
            path: path.to_path_buf(),
            hint: "Run `veraz train` first to produce the fine-tuned encoder and tree classifier".into(),
        })
    }
}

/// `[step/total] message` stage banner
pub(crate) fn stage(level: LogLevel, step: usize, total: usize, message: &str) {
    log(level, LogLevel::Normal, &format!("\n[{step}/{total}] {message}"));
}
