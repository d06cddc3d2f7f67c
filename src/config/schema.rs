//! YAML schema for the pipeline configuration

use crate::gbdt::GbdtParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory every relative path below is resolved against
    pub root: PathBuf,

    /// Dataset and artifact locations
    pub paths: PathsConfig,

    /// Tokenization settings
    pub tokenizer: TokenizerConfig,

    /// Fine-tuning settings
    pub train: TrainConfig,

    /// AdamW hyperparameters
    pub optimizer: OptimizerConfig,

    /// Tree ensemble hyperparameters
    pub gbdt: GbdtConfig,

    /// Evaluation settings
    pub evaluate: EvaluateConfig,

    /// Attribution settings
    pub explain: ExplainConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            paths: PathsConfig::default(),
            tokenizer: TokenizerConfig::default(),
            train: TrainConfig::default(),
            optimizer: OptimizerConfig::default(),
            gbdt: GbdtConfig::default(),
            evaluate: EvaluateConfig::default(),
            explain: ExplainConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Resolve a configured path against `root` (absolute paths pass through)
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn train_csv(&self) -> PathBuf {
        self.resolve(&self.paths.train_csv)
    }

    pub fn test_csv(&self) -> PathBuf {
        self.resolve(&self.paths.test_csv)
    }

    pub fn pretrained_dir(&self) -> PathBuf {
        self.resolve(&self.paths.pretrained_dir)
    }

    pub fn finetuned_dir(&self) -> PathBuf {
        self.resolve(&self.paths.finetuned_dir)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.resolve(&self.paths.classifier)
    }

    pub fn confusion_matrix_path(&self) -> PathBuf {
        self.resolve(&self.paths.confusion_matrix)
    }
}

/// Dataset and artifact locations, relative to `root`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub train_csv: PathBuf,
    pub test_csv: PathBuf,
    /// Pretrained encoder the fine-tuning starts from
    pub pretrained_dir: PathBuf,
    pub finetuned_dir: PathBuf,
    pub classifier: PathBuf,
    pub confusion_matrix: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            train_csv: PathBuf::from("data/train.csv"),
            test_csv: PathBuf::from("data/test.csv"),
            pretrained_dir: PathBuf::from("bin/bert-base-uncased"),
            finetuned_dir: PathBuf::from("bin/bert_finetuned"),
            classifier: PathBuf::from("bin/xgb_classifier.json"),
            confusion_matrix: PathBuf::from("bin/confusion_matrix.png"),
        }
    }
}

/// Tokenization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Fixed sequence length L (including `[CLS]` and `[SEP]`)
    pub max_len: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { max_len: 128 }
    }
}

/// Fine-tuning settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Rows sampled from the training CSV
    pub num_samples: usize,
    /// Seed for sampling, splitting, shuffling and head initialization
    pub seed: u64,
    pub batch_size: usize,
    pub epochs: usize,
    /// Share of the tokenized sample held out for per-epoch validation
    pub val_fraction: f64,
    pub warmup_steps: usize,
    pub max_grad_norm: f32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            num_samples: 20_000,
            seed: 42,
            batch_size: 16,
            epochs: 1,
            val_fraction: 0.1,
            warmup_steps: 0,
            max_grad_norm: 1.0,
        }
    }
}

/// AdamW hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub lr: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
    pub weight_decay: f32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self { lr: 2e-5, beta1: 0.9, beta2: 0.999, eps: 1e-8, weight_decay: 0.0 }
    }
}

/// Tree ensemble hyperparameters plus the embedding hold-out split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GbdtConfig {
    pub n_estimators: usize,
    pub learning_rate: f32,
    pub max_depth: usize,
    pub min_child_weight: f32,
    pub reg_lambda: f32,
    pub gamma: f32,
    pub subsample: f32,
    pub colsample_bytree: f32,
    pub max_bin: usize,
    pub seed: u64,
    /// Share of embeddings held out to score the fitted ensemble
    pub test_size: f64,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        let params = GbdtParams::default();
        Self {
            n_estimators: params.n_estimators,
            learning_rate: params.learning_rate,
            max_depth: params.max_depth,
            min_child_weight: params.min_child_weight,
            reg_lambda: params.reg_lambda,
            gamma: params.gamma,
            subsample: params.subsample,
            colsample_bytree: params.colsample_bytree,
            max_bin: params.max_bin,
            seed: params.seed,
            test_size: 0.2,
        }
    }
}

impl GbdtConfig {
    /// Booster hyperparameters
    pub fn params(&self) -> GbdtParams {
        GbdtParams {
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            min_child_weight: self.min_child_weight,
            reg_lambda: self.reg_lambda,
            gamma: self.gamma,
            subsample: self.subsample,
            colsample_bytree: self.colsample_bytree,
            max_bin: self.max_bin,
            seed: self.seed,
        }
    }
}

/// Evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateConfig {
    pub num_samples: usize,
    pub seed: u64,
    pub batch_size: usize,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self { num_samples: 5_000, seed: 1, batch_size: 32 }
    }
}

/// Attribution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    /// Model evaluations available to the attribution estimator
    pub max_evals: usize,
    pub seed: u64,
    /// Tokens reported on each side of the ranking
    pub top_k: usize,
    /// Coalitions embedded per encoder batch
    pub batch_size: usize,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self { max_evals: 500, seed: 0, top_k: 5, batch_size: 32 }
    }
}
