//! WordPiece tokenization for BERT-style encoders
//!
//! [`WordPieceTokenizer`] runs the `tokenizers` BERT pipeline: text cleanup,
//! whitespace and punctuation splitting, greedy longest-match-first WordPiece
//! and `[CLS]`/`[SEP]` wrapping. [`Tokenizer::encode`] produces fixed-length
//! id/mask pairs.

mod encoding;
mod traits;
mod wordpiece;

pub use encoding::Encoding;
pub use traits::{SpecialIds, TokenId, Tokenizer};
pub use wordpiece::{WordPieceConfig, WordPieceTokenizer};

/// Special token strings
pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";
pub const MASK_TOKEN: &str = "[MASK]";

/// Tokens that carry structure rather than review content
pub fn is_structural(token: &str) -> bool {
    matches!(token, CLS_TOKEN | SEP_TOKEN | PAD_TOKEN)
}

/// Strip the WordPiece continuation prefix for display
pub fn display_token(token: &str) -> &str {
    token.strip_prefix("##").unwrap_or(token)
}
