//! Tokenizer trait definition.

use super::encoding::Encoding;
use crate::error::Result;

/// Token ID type
pub type TokenId = u32;

/// Ids of the special tokens an encoder input needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialIds {
    pub cls: TokenId,
    pub sep: TokenId,
    pub pad: TokenId,
    pub unk: TokenId,
    pub mask: TokenId,
}

/// Tokenizer trait
pub trait Tokenizer {
    /// Split text into vocabulary pieces (no special tokens)
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;

    /// Encode to exactly `max_len` ids: `[CLS]` + pieces + `[SEP]` + `[PAD]`...
    ///
    /// Pieces beyond `max_len - 2` are truncated; `[SEP]` is always kept.
    fn encode(&self, text: &str, max_len: usize) -> Result<Encoding>;

    /// Get ID for token
    fn token_to_id(&self, token: &str) -> Option<TokenId>;

    /// Get token for ID
    fn id_to_token(&self, id: TokenId) -> Option<String>;

    /// Get vocabulary size
    fn vocab_size(&self) -> usize;

    /// Special token ids
    fn special_ids(&self) -> SpecialIds;

    /// Encode a batch, one [`Encoding`] per text in input order
    fn encode_batch(&self, texts: &[String], max_len: usize) -> Result<Vec<Encoding>> {
        texts.iter().map(|text| self.encode(text, max_len)).collect()
    }

    /// Map ids back to token strings (`[UNK]` for unknown ids)
    fn convert_ids_to_tokens(&self, ids: &[TokenId]) -> Vec<String> {
        ids.iter()
            .map(|&id| self.id_to_token(id).unwrap_or_else(|| super::UNK_TOKEN.to_string()))
            .collect()
    }
}
