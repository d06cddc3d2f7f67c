//! Encoder directories: `config.json` + `model.safetensors`

use super::config::BertConfig;
use super::head::{BertForSequenceClassification, CLASSIFIER_PREFIX};
use super::weights::{find_safetensors_files, read_checkpoint, write_checkpoint};
use crate::error::{Error, Result};
use ndarray::Array1;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// How the classification head was obtained when loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadSource {
    /// Read from the checkpoint
    Checkpoint,
    /// Checkpoint had no classifier tensors; freshly initialized
    Initialized,
}

impl BertForSequenceClassification {
    /// Load a model directory
    ///
    /// A plain pretrained encoder (no `classifier.*` tensors) gets a head
    /// drawn from N(0, initializer_range²) with `seed`. Any other missing or
    /// mis-shaped tensor is an error.
    pub fn from_pretrained(dir: &Path, seed: u64) -> Result<(Self, HeadSource)> {
        let config = BertConfig::from_file(&dir.join("config.json"))?;
        let files = find_safetensors_files(dir);
        if files.is_empty() {
            return Err(Error::ArtifactNotFound {
                path: dir.join("model.safetensors"),
                hint: "The model directory must contain the SafeTensors weights of the encoder"
                    .to_string(),
            });
        }

        // Random init supplies the head when the checkpoint has none
        let mut model = Self::new_random(&config, seed)?;
        let wanted: HashSet<String> = model.named_params().into_iter().map(|(n, _)| n).collect();
        let mut tensors = read_checkpoint(&files, |name| wanted.contains(name))?;

        let head_present = tensors.keys().any(|name| name.starts_with(CLASSIFIER_PREFIX));
        let weights_path = files[0].clone();

        for (name, param) in model.named_params_mut() {
            let Some(loaded) = tensors.remove(&name) else {
                if name.starts_with(CLASSIFIER_PREFIX) && !head_present {
                    continue;
                }
                return Err(Error::MissingWeight { name, path: weights_path });
            };
            if loaded.shape != param.shape() {
                return Err(Error::shape(name, param.shape().to_vec(), loaded.shape));
            }
            *param.data_mut() = Array1::from(loaded.values);
        }

        let source = if head_present { HeadSource::Checkpoint } else { HeadSource::Initialized };
        Ok((model, source))
    }

    /// Write `config.json` and `model.safetensors` into `dir`
    pub fn save_pretrained(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let mut config = self.config().clone();
        config.architectures = vec!["BertForSequenceClassification".to_string()];
        config.save(&dir.join("config.json"))?;

        let metadata = HashMap::from([("format".to_string(), "pt".to_string())]);
        write_checkpoint(&dir.join("model.safetensors"), &self.named_params(), metadata)
    }
}
