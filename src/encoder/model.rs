//! BERT encoder stack

use super::block::{EncoderLayer, EncoderLayerCache};
use super::config::BertConfig;
use super::embedding::{EmbeddingCache, Embeddings};
use super::layers::{normal_tensor, Activation, LayerNorm, Linear, NamedParam, NamedParamMut};
use super::attention::SelfAttention;
use crate::error::{Error, Result};
use crate::tokenizer::{Encoding, TokenId};
use crate::Tensor;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;

/// Additive attention bias for padded keys
const MASKED_KEY_BIAS: f32 = -10_000.0;

/// Post-LayerNorm BERT encoder with pooler
#[derive(Debug, Clone)]
pub struct BertModel {
    config: BertConfig,
    pub embeddings: Embeddings,
    pub layers: Vec<EncoderLayer>,
    /// `tanh(W h[0] + b)`, consumed by the classification head
    pub pooler: Linear,
}

/// Activations of one forward pass
#[derive(Debug, Clone)]
pub struct BertCache {
    embeddings: EmbeddingCache,
    layers: Vec<EncoderLayerCache>,
}

impl BertModel {
    /// Randomly initialized encoder (N(0, initializer_range²) weights)
    pub fn new_random(config: &BertConfig, rng: &mut StdRng) -> Result<Self> {
        config.validate()?;
        let h = config.hidden_size;
        let std = config.initializer_range;
        let eps = config.layer_norm_eps;
        let activation = Activation::from_name(&config.hidden_act)?;

        let embeddings = Embeddings {
            word: normal_tensor(vec![config.vocab_size, h], std, rng),
            position: normal_tensor(vec![config.max_position_embeddings, h], std, rng),
            token_type: normal_tensor(vec![config.type_vocab_size, h], std, rng),
            norm: LayerNorm::new(h, eps),
        };

        let layers = (0..config.num_hidden_layers)
            .map(|_| EncoderLayer {
                attention: SelfAttention::new(
                    Linear::new_random(h, h, std, rng),
                    Linear::new_random(h, h, std, rng),
                    Linear::new_random(h, h, std, rng),
                    Linear::new_random(h, h, std, rng),
                    LayerNorm::new(h, eps),
                    config.num_attention_heads,
                ),
                intermediate: Linear::new_random(h, config.intermediate_size, std, rng),
                output: Linear::new_random(config.intermediate_size, h, std, rng),
                output_norm: LayerNorm::new(h, eps),
                activation,
            })
            .collect();

        Ok(Self {
            config: config.clone(),
            embeddings,
            layers,
            pooler: Linear::new_random(h, h, std, rng),
        })
    }

    pub fn config(&self) -> &BertConfig {
        &self.config
    }

    pub fn hidden_size(&self) -> usize {
        self.config.hidden_size
    }

    /// Forward `ids` at positions `0..T`, optionally biasing attention keys
    pub fn forward(
        &self,
        ids: &[TokenId],
        key_bias: Option<&Array1<f32>>,
    ) -> Result<(Array2<f32>, BertCache)> {
        if ids.is_empty() {
            return Err(Error::shape("encoder input", vec![1], vec![0]));
        }
        let (mut hidden, embeddings) = self.embeddings.forward(ids)?;
        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let (next, cache) = layer.forward(&hidden, key_bias);
            hidden = next;
            layers.push(cache);
        }
        Ok((hidden, BertCache { embeddings, layers }))
    }

    /// Propagate `d_hidden` (gradient of the final hidden states) to every parameter
    pub fn backward(&self, cache: &BertCache, d_hidden: &Array2<f32>) {
        let mut grad = d_hidden.clone();
        for (layer, layer_cache) in self.layers.iter().zip(&cache.layers).rev() {
            grad = layer.backward(layer_cache, &grad);
        }
        self.embeddings.backward(&cache.embeddings, &grad);
    }

    /// Final hidden states `[L, H]` for a padded encoding, honouring its mask
    pub fn hidden_states(&self, encoding: &Encoding) -> Result<Array2<f32>> {
        let bias: Array1<f32> = encoding
            .mask
            .iter()
            .map(|&m| if m == 1 { 0.0 } else { MASKED_KEY_BIAS })
            .collect();
        Ok(self.forward(&encoding.ids, Some(&bias))?.0)
    }

    /// Final hidden state at position 0 (`[CLS]`)
    ///
    /// Padding never influences unmasked positions, so only the unmasked
    /// prefix is run through the encoder.
    pub fn cls_embedding(&self, encoding: &Encoding) -> Result<Array1<f32>> {
        let (hidden, _) = self.forward(encoding.real_ids(), None)?;
        Ok(hidden.row(0).to_owned())
    }

    pub fn named_params(&self, prefix: &str) -> Vec<NamedParam<'_>> {
        let mut params = self.embeddings.named_params(&format!("{prefix}embeddings"));
        for (i, layer) in self.layers.iter().enumerate() {
            params.extend(layer.named_params(&format!("{prefix}encoder.layer.{i}")));
        }
        params.extend(self.pooler.named_params(&format!("{prefix}pooler.dense")));
        params
    }

    pub fn named_params_mut(&mut self, prefix: &str) -> Vec<NamedParamMut<'_>> {
        let mut params = self.embeddings.named_params_mut(&format!("{prefix}embeddings"));
        for (i, layer) in self.layers.iter_mut().enumerate() {
            params.extend(layer.named_params_mut(&format!("{prefix}encoder.layer.{i}")));
        }
        params.extend(self.pooler.named_params_mut(&format!("{prefix}pooler.dense")));
        params
    }

    /// Enable or disable gradient tracking on every encoder parameter
    pub fn set_requires_grad(&mut self, requires_grad: bool) {
        for (_, param) in self.named_params_mut("") {
            param.set_requires_grad(requires_grad);
        }
    }

    /// Clear all accumulated gradients
    pub fn zero_grad(&self) {
        for (_, param) in self.named_params("") {
            param.zero_grad();
        }
    }

    /// Total number of scalar parameters
    pub fn num_parameters(&self) -> usize {
        self.named_params("").iter().map(|(_, t)| Tensor::len(t)).sum()
    }
}
