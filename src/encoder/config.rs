//! BERT configuration (`config.json`)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HuggingFace `BertConfig` fields the encoder uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BertConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    #[serde(default = "default_hidden_act")]
    pub hidden_act: String,
    pub max_position_embeddings: usize,
    #[serde(default = "default_type_vocab_size")]
    pub type_vocab_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f32,
    #[serde(default = "default_initializer_range")]
    pub initializer_range: f32,
    #[serde(default = "default_num_labels")]
    pub num_labels: usize,
    #[serde(default = "default_architectures")]
    pub architectures: Vec<String>,
    #[serde(default = "default_model_type")]
    pub model_type: String,
}

fn default_hidden_act() -> String {
    "gelu".to_string()
}
fn default_type_vocab_size() -> usize {
    2
}
fn default_layer_norm_eps() -> f32 {
    1e-12
}
fn default_initializer_range() -> f32 {
    0.02
}
fn default_num_labels() -> usize {
    2
}
fn default_architectures() -> Vec<String> {
    vec!["BertForSequenceClassification".to_string()]
}
fn default_model_type() -> String {
    "bert".to_string()
}

impl BertConfig {
    /// bert-base-uncased
    pub fn bert_base_uncased() -> Self {
        Self {
            vocab_size: 30522,
            hidden_size: 768,
            num_hidden_layers: 12,
            num_attention_heads: 12,
            intermediate_size: 3072,
            hidden_act: default_hidden_act(),
            max_position_embeddings: 512,
            type_vocab_size: 2,
            layer_norm_eps: 1e-12,
            initializer_range: 0.02,
            num_labels: 2,
            architectures: default_architectures(),
            model_type: default_model_type(),
        }
    }

    /// Per-head dimension
    pub fn head_dim(&self) -> usize {
        self.hidden_size / self.num_attention_heads
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.num_attention_heads == 0 || self.hidden_size % self.num_attention_heads != 0 {
            return Err(Error::ConfigError(format!(
                "hidden_size {} is not divisible by num_attention_heads {}",
                self.hidden_size, self.num_attention_heads
            )));
        }
        if self.num_labels != 2 {
            return Err(Error::ConfigError(format!(
                "binary review classification needs num_labels = 2, got {}",
                self.num_labels
            )));
        }
        if self.type_vocab_size == 0 || self.max_position_embeddings == 0 {
            return Err(Error::ConfigError(
                "type_vocab_size and max_position_embeddings must be > 0".to_string(),
            ));
        }
        super::layers::Activation::from_name(&self.hidden_act)?;
        Ok(())
    }

    /// Read and validate `config.json`
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ArtifactNotFound {
                path: path.to_path_buf(),
                hint: "The model directory must contain the config.json of a BERT checkpoint"
                    .to_string(),
            });
        }
        let config: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Write `config.json`
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
