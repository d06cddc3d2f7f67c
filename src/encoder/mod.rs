//! BERT encoder with a sequence classification head
//!
//! Forward and backward passes are written per layer over cached
//! activations; there is no tape. Dropout is not applied, so training and
//! inference are deterministic for fixed weights.

mod artifact;
mod attention;
mod block;
mod config;
mod embedding;
mod head;
mod layers;
mod model;
mod weights;

#[cfg(test)]
mod tests;

pub use artifact::HeadSource;
pub use config::BertConfig;
pub use head::{cross_entropy, softmax, BertForSequenceClassification, ExampleOutput};
pub use layers::Activation;
pub use model::BertModel;
pub use weights::{canonical_name, read_checkpoint, write_checkpoint, LoadedTensor};
