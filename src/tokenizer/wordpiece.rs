//! BERT WordPiece tokenizer on top of the `tokenizers` pipeline

use super::encoding::Encoding;
use super::traits::{SpecialIds, TokenId, Tokenizer};
use super::{CLS_TOKEN, MASK_TOKEN, PAD_TOKEN, SEP_TOKEN, UNK_TOKEN};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{AddedToken, TruncationDirection};

/// Words longer than this become a single `[UNK]`
const MAX_INPUT_CHARS_PER_WORD: usize = 100;

/// Continuation prefix for non-initial pieces
const CONTINUATION: &str = "##";

/// `tokenizer_config.json` contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPieceConfig {
    #[serde(default = "default_true")]
    pub do_lower_case: bool,
    /// `None` follows `do_lower_case`
    #[serde(default)]
    pub strip_accents: Option<bool>,
    #[serde(default = "default_true")]
    pub tokenize_chinese_chars: bool,
    #[serde(default = "default_model_max_length")]
    pub model_max_length: usize,
    #[serde(default = "default_tokenizer_class")]
    pub tokenizer_class: String,
    #[serde(default = "default_cls")]
    pub cls_token: String,
    #[serde(default = "default_sep")]
    pub sep_token: String,
    #[serde(default = "default_pad")]
    pub pad_token: String,
    #[serde(default = "default_unk")]
    pub unk_token: String,
    #[serde(default = "default_mask")]
    pub mask_token: String,
}

fn default_true() -> bool {
    true
}
fn default_model_max_length() -> usize {
    512
}
fn default_tokenizer_class() -> String {
    "BertTokenizer".to_string()
}
fn default_cls() -> String {
    CLS_TOKEN.to_string()
}
fn default_sep() -> String {
    SEP_TOKEN.to_string()
}
fn default_pad() -> String {
    PAD_TOKEN.to_string()
}
fn default_unk() -> String {
    UNK_TOKEN.to_string()
}
fn default_mask() -> String {
    MASK_TOKEN.to_string()
}

impl Default for WordPieceConfig {
    fn default() -> Self {
        Self {
            do_lower_case: true,
            strip_accents: None,
            tokenize_chinese_chars: true,
            model_max_length: default_model_max_length(),
            tokenizer_class: default_tokenizer_class(),
            cls_token: default_cls(),
            sep_token: default_sep(),
            pad_token: default_pad(),
            unk_token: default_unk(),
            mask_token: default_mask(),
        }
    }
}

fn tokenizer_error(e: tokenizers::Error) -> Error {
    Error::Tokenizer(e.to_string())
}

/// BERT tokenizer: normalizer, pre-tokenizer, WordPiece model and
/// `[CLS]`/`[SEP]` post-processor
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    config: WordPieceConfig,
    inner: tokenizers::Tokenizer,
    /// Vocabulary lines in id order, written back as `vocab.txt`
    tokens: Vec<String>,
    special: SpecialIds,
}

impl WordPieceTokenizer {
    /// Build from vocabulary tokens in id order
    pub fn new(tokens: Vec<String>, config: WordPieceConfig) -> Result<Self> {
        let mut vocab: HashMap<String, TokenId> = HashMap::with_capacity(tokens.len());
        for (id, token) in tokens.iter().enumerate() {
            // First occurrence wins, matching line-order id assignment
            vocab.entry(token.clone()).or_insert(id as TokenId);
        }

        let lookup = |token: &str| {
            vocab.get(token).copied().ok_or_else(|| {
                Error::Tokenizer(format!("vocabulary is missing special token {token}"))
            })
        };
        let special = SpecialIds {
            cls: lookup(&config.cls_token)?,
            sep: lookup(&config.sep_token)?,
            pad: lookup(&config.pad_token)?,
            unk: lookup(&config.unk_token)?,
            mask: lookup(&config.mask_token)?,
        };

        let wordpiece = WordPiece::builder()
            .vocab(vocab.into_iter().collect::<HashMap<String, TokenId, _>>())
            .unk_token(config.unk_token.clone())
            .continuing_subword_prefix(CONTINUATION.to_string())
            .max_input_chars_per_word(MAX_INPUT_CHARS_PER_WORD)
            .build()
            .map_err(tokenizer_error)?;

        let mut inner = tokenizers::Tokenizer::new(wordpiece);
        inner.with_normalizer(Some(BertNormalizer::new(
            true,
            config.tokenize_chinese_chars,
            config.strip_accents,
            config.do_lower_case,
        )));
        inner.with_pre_tokenizer(Some(BertPreTokenizer));
        inner.with_post_processor(Some(BertProcessing::new(
            (config.sep_token.clone(), special.sep),
            (config.cls_token.clone(), special.cls),
        )));
        let specials: Vec<AddedToken> = [
            &config.pad_token,
            &config.unk_token,
            &config.cls_token,
            &config.sep_token,
            &config.mask_token,
        ]
        .into_iter()
        .map(|token| AddedToken::from(token.clone(), true))
        .collect();
        inner.add_special_tokens(&specials);

        Ok(Self { config, inner, tokens, special })
    }

    /// Load `vocab.txt` (and `tokenizer_config.json` if present) from a model directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let vocab_path = dir.join("vocab.txt");
        if !vocab_path.is_file() {
            return Err(Error::ArtifactNotFound {
                path: vocab_path,
                hint: "The model directory must contain the WordPiece vocab.txt of its tokenizer"
                    .to_string(),
            });
        }

        let config_path = dir.join("tokenizer_config.json");
        let config = if config_path.is_file() {
            serde_json::from_str(&fs::read_to_string(&config_path)?)?
        } else {
            WordPieceConfig::default()
        };

        let tokens = fs::read_to_string(&vocab_path)?
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        Self::new(tokens, config)
    }

    /// Write `vocab.txt` and `tokenizer_config.json` into `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let mut vocab = self.tokens.join("\n");
        vocab.push('\n');
        fs::write(dir.join("vocab.txt"), vocab)?;
        fs::write(dir.join("tokenizer_config.json"), serde_json::to_string_pretty(&self.config)?)?;
        Ok(())
    }

    pub fn config(&self) -> &WordPieceConfig {
        &self.config
    }
}

impl Tokenizer for WordPieceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let encoding = self.inner.encode(text, false).map_err(tokenizer_error)?;
        Ok(encoding.get_tokens().to_vec())
    }

    fn encode(&self, text: &str, max_len: usize) -> Result<Encoding> {
        if max_len < 2 {
            return Err(Error::Tokenizer(format!(
                "max_len {max_len} leaves no room for {} and {}",
                self.config.cls_token, self.config.sep_token
            )));
        }
        let mut pieces = self.inner.encode(text, false).map_err(tokenizer_error)?;
        pieces.truncate(max_len - 2, 0, TruncationDirection::Right);
        let wrapped = self.inner.post_process(pieces, None, true).map_err(tokenizer_error)?;
        Ok(Encoding::padded(wrapped.get_ids().to_vec(), max_len, self.special.pad))
    }

    fn token_to_id(&self, token: &str) -> Option<TokenId> {
        self.inner.token_to_id(token)
    }

    fn id_to_token(&self, id: TokenId) -> Option<String> {
        self.inner.id_to_token(id)
    }

    fn vocab_size(&self) -> usize {
        self.tokens.len()
    }

    fn special_ids(&self) -> SpecialIds {
        self.special
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<String> {
        [
            "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "un", "##aff", "##able", "the", "quick",
            "brown", "fox", ",", "!", "great", "##est", "scam", "hello", "world", "i", "'", "ve",
            "cafe", "naive", "a", "b", "c", "d", "cd", "ab", "中", "文", "1⁄2", "1", "⁄", "2", "՜",
            "﹐",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn tokenizer() -> WordPieceTokenizer {
        WordPieceTokenizer::new(vocab(), WordPieceConfig::default()).unwrap()
    }

    fn tok(text: &str) -> Vec<String> {
        tokenizer().tokenize(text).unwrap()
    }

    #[test]
    fn test_lowercase_and_punctuation() {
        assert_eq!(tok("Hello, World!"), vec!["hello", ",", "world", "!"]);
        assert_eq!(tok("I've"), vec!["i", "'", "ve"]);
    }

    #[test]
    fn test_strip_accents() {
        assert_eq!(tok("Café NAÏVE"), vec!["cafe", "naive"]);
    }

    #[test]
    fn test_whitespace_and_control_cleanup() {
        assert_eq!(tok("  a\tb\n\nc\u{200B}d\u{0007} "), vec!["a", "b", "cd"]);
    }

    #[test]
    fn test_cjk_isolated() {
        assert_eq!(tok("ab中文"), vec!["ab", "中", "文"]);
    }

    #[test]
    fn test_private_use_characters_dropped() {
        assert_eq!(tok("a\u{E000}b"), vec!["ab"]);
    }

    #[test]
    fn test_math_symbol_is_not_punctuation() {
        assert_eq!(tok("1\u{2044}2"), vec!["1⁄2"]);
    }

    #[test]
    fn test_non_ascii_punctuation_splits() {
        assert_eq!(tok("a\u{055C}b"), vec!["a", "\u{055C}", "b"]);
        assert_eq!(tok("a\u{FE50}b"), vec!["a", "\u{FE50}", "b"]);
    }

    #[test]
    fn test_cased_keeps_accents() {
        let config = WordPieceConfig { do_lower_case: false, ..WordPieceConfig::default() };
        let mut tokens = vocab();
        tokens.push("Café".to_string());
        let cased = WordPieceTokenizer::new(tokens, config).unwrap();
        assert_eq!(cased.tokenize("Café").unwrap(), vec!["Café"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(tok("").is_empty());
        assert!(tok(" \n ").is_empty());
    }

    #[test]
    fn test_wordpiece_greedy_longest_match() {
        assert_eq!(tok("unaffable"), vec!["un", "##aff", "##able"]);
        assert_eq!(tok("Greatest!"), vec!["great", "##est", "!"]);
    }

    #[test]
    fn test_unknown_word_is_single_unk() {
        assert_eq!(tok("the unaffxyz fox"), vec!["the", "[UNK]", "fox"]);
    }

    #[test]
    fn test_overlong_word_is_unk() {
        let word = "un".repeat(60);
        assert_eq!(tok(&word), vec!["[UNK]"]);
    }

    #[test]
    fn test_special_tokens_in_text_kept_whole() {
        assert_eq!(tok("the [MASK] fox"), vec!["the", "[MASK]", "fox"]);
    }

    #[test]
    fn test_encode_fixed_length() {
        let tok = tokenizer();
        let enc = tok.encode("The quick brown fox", 8).unwrap();
        assert_eq!(enc.ids, vec![2, 8, 9, 10, 11, 3, 0, 0]);
        assert_eq!(enc.mask, vec![1, 1, 1, 1, 1, 1, 0, 0]);

        let truncated = tok.encode("The quick brown fox", 4).unwrap();
        assert_eq!(truncated.ids, vec![2, 8, 9, 3]);
        assert_eq!(truncated.mask, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_encode_empty_text_is_cls_sep() {
        let enc = tokenizer().encode("", 4).unwrap();
        assert_eq!(enc.ids, vec![2, 3, 0, 0]);
        assert_eq!(enc.real_len(), 2);
    }

    #[test]
    fn test_encode_rejects_tiny_max_len() {
        assert!(tokenizer().encode("fox", 1).is_err());
    }

    #[test]
    fn test_encode_deterministic() {
        let tok = tokenizer();
        assert_eq!(tok.encode("great scam, the fox!", 16).unwrap(), tok.encode("great scam, the fox!", 16).unwrap());
    }

    #[test]
    fn test_encode_batch_preserves_order() {
        let tok = tokenizer();
        let texts = vec!["scam".to_string(), "the fox".to_string()];
        let batch = tok.encode_batch(&texts, 6).unwrap();
        assert_eq!(batch[0], tok.encode("scam", 6).unwrap());
        assert_eq!(batch[1], tok.encode("the fox", 6).unwrap());
    }

    #[test]
    fn test_convert_ids_to_tokens() {
        let tok = tokenizer();
        assert_eq!(tok.convert_ids_to_tokens(&[2, 14, 15, 3, 999]), vec![
            "[CLS]", "great", "##est", "[SEP]", "[UNK]"
        ]);
    }

    #[test]
    fn test_missing_special_token() {
        let tokens = vec!["[PAD]".to_string(), "[UNK]".to_string()];
        let err = WordPieceTokenizer::new(tokens, WordPieceConfig::default()).unwrap_err();
        assert!(err.to_string().contains("[CLS]"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let tok = tokenizer();
        tok.save(dir.path()).unwrap();

        let loaded = WordPieceTokenizer::from_dir(dir.path()).unwrap();
        assert_eq!(loaded.vocab_size(), tok.vocab_size());
        assert_eq!(loaded.special_ids(), tok.special_ids());
        assert_eq!(loaded.encode("unaffable fox", 8).unwrap(), tok.encode("unaffable fox", 8).unwrap());
    }

    #[test]
    fn test_missing_vocab_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = WordPieceTokenizer::from_dir(dir.path()).unwrap_err();
        assert!(err.is_missing_input());
    }
}
