//! Token attributions for single reviews
//!
//! [`KernelShap`] estimates how much each WordPiece token moves the
//! genuine-class probability; [`Explainer`] wires it to a tokenizer, an
//! embedder and the tree classifier.

mod explainer;
mod kernel_shap;
mod linalg;

pub use explainer::{
    ExplainSettings, Explainer, Explanation, TokenAttribution, DEMO_FAKE_REVIEW, DEMO_GENUINE_REVIEW,
};
pub use kernel_shap::{KernelShap, ShapValues};
