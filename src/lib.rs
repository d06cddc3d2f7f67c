//! Veraz: fake-review detection
//!
//! A BERT encoder is fine-tuned on labeled product reviews, its `[CLS]`
//! vectors become features for a gradient-boosted tree ensemble, and Kernel
//! SHAP attributes individual predictions to review tokens.
//!
//! # Architecture
//!
//! - [`data`]: headerless review CSVs, seeded sampling and splits
//! - [`tokenizer`]: BERT WordPiece tokenization
//! - [`encoder`]: BERT encoder with a classification head (forward and backward)
//! - [`finetune`]: AdamW fine-tuning with linear warmup/decay
//! - [`embed`]: batched `[CLS]` embedding extraction
//! - [`gbdt`]: histogram gradient-boosted trees for binary classification
//! - [`eval`]: metrics, classification report and confusion-matrix image
//! - [`explain`]: Kernel SHAP token attributions
//! - [`pipeline`]: the train / evaluate / explain workflows
//!
//! The workflows share no runtime state; `train` persists the fine-tuned
//! encoder directory and the tree classifier, the other two load them.

pub mod cli;
pub mod config;
pub mod data;
pub mod embed;
pub mod encoder;
pub mod error;
pub mod eval;
pub mod explain;
pub mod finetune;
pub mod gbdt;
pub mod optim;
pub mod pipeline;
pub mod tensor;
pub mod tokenizer;

pub use error::{Error, Result};
pub use tensor::Tensor;
