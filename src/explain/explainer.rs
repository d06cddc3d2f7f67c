//! Review-level predictions with per-token attributions

use super::kernel_shap::KernelShap;
use crate::config::PipelineConfig;
use crate::data::Label;
use crate::embed::Embedder;
use crate::error::Result;
use crate::gbdt::GradientBoostedTrees;
use crate::tokenizer::{display_token, is_structural, Encoding, Tokenizer, UNK_TOKEN};
use std::fmt;

/// Built-in review that reads as fake
pub const DEMO_FAKE_REVIEW: &str = "This product is an absolute scam, never buy from this company. The worst experience of my life and I want a refund now! Total garbage.";

/// Built-in review that reads as genuine
pub const DEMO_GENUINE_REVIEW: &str = "I've been using this laptop for about a month for my software development work. The keyboard is comfortable for long coding sessions and the screen resolution is crisp. Battery life is decent, lasts a full workday.";

/// Attribution and tokenization settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplainSettings {
    pub max_len: usize,
    pub max_evals: usize,
    pub seed: u64,
    /// Tokens listed on each side of the ranking
    pub top_k: usize,
    /// Coalitions embedded per call to the embedder
    pub batch_size: usize,
}

impl ExplainSettings {
    pub fn from_pipeline(config: &PipelineConfig) -> Self {
        Self {
            max_len: config.tokenizer.max_len,
            max_evals: config.explain.max_evals,
            seed: config.explain.seed,
            top_k: config.explain.top_k,
            batch_size: config.explain.batch_size,
        }
    }
}

impl Default for ExplainSettings {
    fn default() -> Self {
        Self::from_pipeline(&PipelineConfig::default())
    }
}

/// Contribution of one review token to the genuine-class probability
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAttribution {
    /// Position in the encoded sequence
    pub position: usize,
    /// Display form, `##` stripped
    pub token: String,
    pub value: f64,
}

/// Prediction and attributions for one review
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub text: String,
    pub label: Label,
    /// `[fake, genuine]`
    pub probabilities: [f32; 2],
    /// Genuine-class probability with every review token masked
    pub base_value: f64,
    /// Review tokens in sequence order, structural tokens excluded
    pub attributions: Vec<TokenAttribution>,
    /// Whether every coalition was evaluated
    pub exact: bool,
    pub top_k: usize,
}

impl Explanation {
    /// Strongest positive contributors, largest first
    pub fn top_increasing(&self) -> Vec<&TokenAttribution> {
        let mut ranked: Vec<&TokenAttribution> = self.attributions.iter().filter(|a| a.value > 0.0).collect();
        ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
        ranked.truncate(self.top_k);
        ranked
    }

    /// Strongest negative contributors, most negative first
    pub fn top_decreasing(&self) -> Vec<&TokenAttribution> {
        let mut ranked: Vec<&TokenAttribution> = self.attributions.iter().filter(|a| a.value < 0.0).collect();
        ranked.sort_by(|a, b| a.value.total_cmp(&b.value));
        ranked.truncate(self.top_k);
        ranked
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Review Text: '{}'", self.text)?;
        writeln!(f, "Predicted Class: {}", self.label)?;
        writeln!(
            f,
            "Prediction Probabilities: [Fake: {:.4}, Genuine: {:.4}]",
            self.probabilities[0], self.probabilities[1]
        )?;
        writeln!(f)?;
        writeln!(f, "SHAP Values (contribution of each token to the 'Genuine' prediction):")?;

        writeln!(f)?;
        writeln!(f, "Top {} tokens increasing 'Genuine' score:", self.top_k)?;
        write_ranked(f, &self.top_increasing())?;

        writeln!(f)?;
        writeln!(f, "Top {} tokens decreasing 'Genuine' score (increasing 'Fake' score):", self.top_k)?;
        write_ranked(f, &self.top_decreasing())
    }
}

fn write_ranked(f: &mut fmt::Formatter<'_>, ranked: &[&TokenAttribution]) -> fmt::Result {
    if ranked.is_empty() {
        return writeln!(f, "  (none)");
    }
    for attribution in ranked {
        writeln!(f, "  - '{}': {:.4}", attribution.token, attribution.value)?;
    }
    Ok(())
}

/// Explains tree-classifier predictions in terms of review tokens
///
/// Dropped tokens are replaced by the tokenizer's mask token; `[CLS]` and
/// `[SEP]` are always kept.
pub struct Explainer<'a, E: Embedder + ?Sized, T: Tokenizer + ?Sized> {
    embedder: &'a E,
    tokenizer: &'a T,
    classifier: &'a GradientBoostedTrees,
    settings: ExplainSettings,
}

impl<'a, E: Embedder + ?Sized, T: Tokenizer + ?Sized> Explainer<'a, E, T> {
    pub fn new(
        embedder: &'a E,
        tokenizer: &'a T,
        classifier: &'a GradientBoostedTrees,
        settings: ExplainSettings,
    ) -> Self {
        Self { embedder, tokenizer, classifier, settings }
    }

    /// Genuine-class probability for each encoding
    fn genuine_probabilities(&self, encodings: &[Encoding]) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(encodings.len());
        for chunk in encodings.chunks(self.settings.batch_size.max(1)) {
            let features = self.embedder.embed_batch(chunk)?;
            out.extend(self.classifier.predict_proba(features.view())?.into_iter().map(f64::from));
        }
        Ok(out)
    }

    pub fn explain(&self, text: &str) -> Result<Explanation> {
        let encoding = self.tokenizer.encode(text, self.settings.max_len)?;
        let mask_id = self.tokenizer.special_ids().mask;

        let tokens = self.tokenizer.convert_ids_to_tokens(encoding.real_ids());
        let positions: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !is_structural(token))
            .map(|(i, _)| i)
            .collect();

        let genuine = self.genuine_probabilities(std::slice::from_ref(&encoding))?[0] as f32;
        let label = Label::from_index(GradientBoostedTrees::class_of(genuine));

        let shap = KernelShap::new(self.settings.max_evals, self.settings.seed).explain(
            positions.len(),
            |coalitions| {
                let masked: Vec<Encoding> = coalitions
                    .iter()
                    .map(|keep| {
                        let mut masked = encoding.clone();
                        for (&position, &kept) in positions.iter().zip(keep) {
                            if !kept {
                                masked.ids[position] = mask_id;
                            }
                        }
                        masked
                    })
                    .collect();
                self.genuine_probabilities(&masked)
            },
        )?;

        let attributions = positions
            .iter()
            .zip(&shap.values)
            .map(|(&position, &value)| TokenAttribution {
                position,
                token: display_token(tokens.get(position).map_or(UNK_TOKEN, String::as_str)).to_string(),
                value,
            })
            .collect();

        Ok(Explanation {
            text: text.to_string(),
            label,
            probabilities: [1.0 - genuine, genuine],
            base_value: shap.base_value,
            attributions,
            exact: shap.exact,
            top_k: self.settings.top_k,
        })
    }
}
