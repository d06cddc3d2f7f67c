//! Word + position + token-type embeddings

use super::layers::{LayerNorm, LayerNormCache, NamedParam, NamedParamMut};
use crate::error::{Error, Result};
use crate::tokenizer::TokenId;
use crate::Tensor;
use ndarray::Array2;

#[derive(Debug, Clone)]
pub struct Embeddings {
    /// `[vocab_size, H]`
    pub word: Tensor,
    /// `[max_position_embeddings, H]`
    pub position: Tensor,
    /// `[type_vocab_size, H]`; every input is segment 0
    pub token_type: Tensor,
    pub norm: LayerNorm,
}

#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    ids: Vec<TokenId>,
    norm: LayerNormCache,
}

impl Embeddings {
    /// Embed ids at positions `0..ids.len()`
    pub fn forward(&self, ids: &[TokenId]) -> Result<(Array2<f32>, EmbeddingCache)> {
        let vocab_size = self.word.shape()[0];
        let max_positions = self.position.shape()[0];
        let hidden = self.word.shape()[1];
        if ids.len() > max_positions {
            return Err(Error::shape("position embeddings", vec![max_positions], vec![ids.len()]));
        }

        let segment = self.token_type.row(0);
        let mut x = Array2::zeros((ids.len(), hidden));
        for (t, (&id, mut row)) in ids.iter().zip(x.rows_mut()).enumerate() {
            if id as usize >= vocab_size {
                return Err(Error::shape("token id", vec![vocab_size], vec![id as usize]));
            }
            row.assign(&self.word.row(id as usize));
            row += &self.position.row(t);
            row += &segment;
        }

        let (y, norm) = self.norm.forward(&x);
        Ok((y, EmbeddingCache { ids: ids.to_vec(), norm }))
    }

    pub fn backward(&self, cache: &EmbeddingCache, dy: &Array2<f32>) {
        let dx = self.norm.backward(&cache.norm, dy);
        for (t, (&id, row)) in cache.ids.iter().zip(dx.rows()).enumerate() {
            self.word.accumulate_row_grad(id as usize, row);
            self.position.accumulate_row_grad(t, row);
            self.token_type.accumulate_row_grad(0, row);
        }
    }

    pub fn named_params(&self, prefix: &str) -> Vec<NamedParam<'_>> {
        let mut params = vec![
            (format!("{prefix}.word_embeddings.weight"), &self.word),
            (format!("{prefix}.position_embeddings.weight"), &self.position),
            (format!("{prefix}.token_type_embeddings.weight"), &self.token_type),
        ];
        params.extend(self.norm.named_params(&format!("{prefix}.LayerNorm")));
        params
    }

    pub fn named_params_mut(&mut self, prefix: &str) -> Vec<NamedParamMut<'_>> {
        let mut params = vec![
            (format!("{prefix}.word_embeddings.weight"), &mut self.word),
            (format!("{prefix}.position_embeddings.weight"), &mut self.position),
            (format!("{prefix}.token_type_embeddings.weight"), &mut self.token_type),
        ];
        params.extend(self.norm.named_params_mut(&format!("{prefix}.LayerNorm")));
        params
    }
}
