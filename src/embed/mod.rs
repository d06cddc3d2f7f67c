//! Sentence embeddings from the fine-tuned encoder
//!
//! An [`Embedder`] maps one encoded review to a fixed-width vector. The
//! encoder's final-layer CLS hidden state is the production embedder; tests
//! and the explainer can substitute cheaper ones.

use crate::cli::{log, LogLevel};
use crate::encoder::{BertForSequenceClassification, BertModel};
use crate::error::{Error, Result};
use crate::tokenizer::Encoding;
use ndarray::{Array1, Array2};

/// Maps encodings to fixed-width feature vectors
pub trait Embedder {
    /// Width of every embedding
    fn embedding_dim(&self) -> usize;

    /// Embed a single encoding
    fn embed(&self, encoding: &Encoding) -> Result<Array1<f32>>;

    /// Embed a batch into `[batch, dim]`, one row per encoding in order
    fn embed_batch(&self, encodings: &[Encoding]) -> Result<Array2<f32>> {
        let dim = self.embedding_dim();
        let mut out = Array2::zeros((encodings.len(), dim));
        for (i, encoding) in encodings.iter().enumerate() {
            let row = self.embed(encoding)?;
            if row.len() != dim {
                return Err(Error::shape("embedding", vec![dim], vec![row.len()]));
            }
            out.row_mut(i).assign(&row);
        }
        Ok(out)
    }
}

impl Embedder for BertModel {
    fn embedding_dim(&self) -> usize {
        self.hidden_size()
    }

    fn embed(&self, encoding: &Encoding) -> Result<Array1<f32>> {
        self.cls_embedding(encoding)
    }
}

impl Embedder for BertForSequenceClassification {
    fn embedding_dim(&self) -> usize {
        self.bert.embedding_dim()
    }

    fn embed(&self, encoding: &Encoding) -> Result<Array1<f32>> {
        self.bert.cls_embedding(encoding)
    }
}

/// Embed every encoding in batches of `batch_size`, preserving input order
///
/// Batch progress is logged at [`LogLevel::Verbose`].
pub fn extract_embeddings<E: Embedder + ?Sized>(
    embedder: &E,
    encodings: &[Encoding],
    batch_size: usize,
    level: LogLevel,
) -> Result<Array2<f32>> {
    let batch_size = batch_size.max(1);
    let batches = encodings.len().div_ceil(batch_size);
    let mut out = Array2::zeros((encodings.len(), embedder.embedding_dim()));

    for (b, chunk) in encodings.chunks(batch_size).enumerate() {
        let rows = embedder.embed_batch(chunk)?;
        let start = b * batch_size;
        out.slice_mut(ndarray::s![start..start + chunk.len(), ..]).assign(&rows);
        log(level, LogLevel::Verbose, &format!("  embedded batch {}/{batches}", b + 1));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::BertConfig;
    use crate::tokenizer::SpecialIds;

    const SPECIAL: SpecialIds = SpecialIds { cls: 2, sep: 3, pad: 0, unk: 1, mask: 4 };

    /// Counts of token ids 5 and 6
    struct CountEmbedder;

    impl Embedder for CountEmbedder {
        fn embedding_dim(&self) -> usize {
            2
        }

        fn embed(&self, encoding: &Encoding) -> Result<Array1<f32>> {
            let count = |id| encoding.real_ids().iter().filter(|&&t| t == id).count() as f32;
            Ok(Array1::from(vec![count(5), count(6)]))
        }
    }

    fn encodings() -> Vec<Encoding> {
        [vec![5], vec![5, 5], vec![6], vec![5, 6, 6], vec![7]]
            .iter()
            .map(|p| Encoding::from_pieces(p, 8, SPECIAL))
            .collect()
    }

    #[test]
    fn test_extract_preserves_order_across_batches() {
        let out = extract_embeddings(&CountEmbedder, &encodings(), 2, LogLevel::Quiet).unwrap();
        assert_eq!(out.shape(), &[5, 2]);
        assert_eq!(out.row(1).to_vec(), vec![2.0, 0.0]);
        assert_eq!(out.row(3).to_vec(), vec![1.0, 2.0]);
        assert_eq!(out.row(4).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_batch_size_does_not_change_result() {
        let config = BertConfig {
            vocab_size: 12,
            hidden_size: 8,
            num_hidden_layers: 1,
            num_attention_heads: 2,
            intermediate_size: 16,
            max_position_embeddings: 8,
            ..BertConfig::bert_base_uncased()
        };
        let model = BertForSequenceClassification::new_random(&config, 5).unwrap();
        let encs = encodings();

        let one = extract_embeddings(&model, &encs, 1, LogLevel::Quiet).unwrap();
        let three = extract_embeddings(&model, &encs, 3, LogLevel::Quiet).unwrap();
        assert_eq!(one.shape(), &[5, 8]);
        for (a, b) in one.iter().zip(three.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
        assert_eq!(one.row(2).to_vec(), model.bert.cls_embedding(&encs[2]).unwrap().to_vec());
    }

    #[test]
    fn test_empty_input() {
        let out = extract_embeddings(&CountEmbedder, &[], 4, LogLevel::Quiet).unwrap();
        assert_eq!(out.shape(), &[0, 2]);
    }
}
