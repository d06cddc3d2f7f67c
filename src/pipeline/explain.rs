//! Predict and attribute individual reviews

use super::Artifacts;
use crate::cli::{log, LogLevel};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::explain::{ExplainSettings, Explainer, Explanation, DEMO_FAKE_REVIEW, DEMO_GENUINE_REVIEW};

/// Explain `texts`, or the two built-in demo reviews when empty
pub fn explain(config: &PipelineConfig, texts: &[String], level: LogLevel) -> Result<Vec<Explanation>> {
    log(level, LogLevel::Normal, "--- Starting SHAP Explanation Demo ---");
    let artifacts = Artifacts::load(config, level)?;
    let explainer = Explainer::new(
        &artifacts.encoder,
        &artifacts.tokenizer,
        &artifacts.classifier,
        ExplainSettings::from_pipeline(config),
    );

    let inputs: Vec<(String, &str)> = if texts.is_empty() {
        vec![
            ("Explaining a likely FAKE review".to_string(), DEMO_FAKE_REVIEW),
            ("Explaining a likely GENUINE review".to_string(), DEMO_GENUINE_REVIEW),
        ]
    } else {
        texts.iter().enumerate().map(|(i, t)| (format!("Explaining review {}", i + 1), t.as_str())).collect()
    };

    let mut explanations = Vec::with_capacity(inputs.len());
    for (heading, text) in inputs {
        log(level, LogLevel::Normal, &format!("\n--- {heading} ---"));
        log(level, LogLevel::Normal, "Generating SHAP explanation...");
        let explanation = explainer.explain(text)?;
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  {} tokens, {} attribution, base value {:.4}",
                explanation.attributions.len(),
                if explanation.exact { "exact" } else { "sampled" },
                explanation.base_value
            ),
        );
        log(level, LogLevel::Normal, explanation.to_string().trim_end());
        explanations.push(explanation);
    }
    log(level, LogLevel::Normal, "\n--- Explanation Finished ---");

    Ok(explanations)
}
