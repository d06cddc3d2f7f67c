//! Fixed-length encoder inputs

use super::traits::{SpecialIds, TokenId};

/// Token ids and attention mask, both exactly `max_len` long
///
/// Mask is 1 on real tokens (including `[CLS]` and `[SEP]`) and 0 on padding;
/// real tokens always form a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub ids: Vec<TokenId>,
    pub mask: Vec<u8>,
}

impl Encoding {
    /// Wrap WordPiece ids with `[CLS]`/`[SEP]`, truncate and right-pad
    ///
    /// # Panics
    /// Panics if `max_len < 2`.
    pub fn from_pieces(pieces: &[TokenId], max_len: usize, special: SpecialIds) -> Self {
        assert!(max_len >= 2, "max_len must leave room for [CLS] and [SEP]");
        let kept = pieces.len().min(max_len - 2);

        let mut ids = Vec::with_capacity(max_len);
        ids.push(special.cls);
        ids.extend_from_slice(&pieces[..kept]);
        ids.push(special.sep);
        Self::padded(ids, max_len, special.pad)
    }

    /// Right-pad an already wrapped sequence to `max_len`
    ///
    /// Ids past `max_len` are dropped; callers truncate before wrapping so
    /// `[SEP]` survives.
    pub fn padded(mut ids: Vec<TokenId>, max_len: usize, pad: TokenId) -> Self {
        ids.truncate(max_len);
        let real = ids.len();
        ids.resize(max_len, pad);

        let mut mask = vec![1u8; real];
        mask.resize(max_len, 0);

        Self { ids, mask }
    }

    /// Sequence length L
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of unmasked positions
    pub fn real_len(&self) -> usize {
        self.mask.iter().filter(|&&m| m == 1).count()
    }

    /// Ids of the unmasked prefix
    pub fn real_ids(&self) -> &[TokenId] {
        &self.ids[..self.real_len()]
    }
}
