//! Held-out evaluation: embed, classify, score

use super::classification::{classification_report, roc_auc_score, ConfusionMatrix, MultiClassMetrics};
use crate::cli::LogLevel;
use crate::data::Label;
use crate::embed::{extract_embeddings, Embedder};
use crate::error::{Error, Result};
use crate::gbdt::GradientBoostedTrees;
use crate::tokenizer::Encoding;
use std::fmt;

/// Class names in label order
pub const TARGET_NAMES: [&str; 2] = [Label::Fake.name(), Label::Genuine.name()];

/// Metrics over one evaluation sample
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub accuracy: f64,
    /// F1 of the genuine class
    pub f1: f64,
    /// `None` when the sample holds a single class
    pub roc_auc: Option<f64>,
    pub confusion: ConfusionMatrix,
    /// sklearn-style per-class report
    pub report: String,
}

impl EvaluationReport {
    /// Score hard predictions and genuine-class probabilities
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize], probabilities: &[f32]) -> Result<Self> {
        if probabilities.len() != y_true.len() {
            return Err(Error::shape("evaluation probabilities", vec![y_true.len()], vec![probabilities.len()]));
        }
        let confusion = ConfusionMatrix::from_predictions(y_pred, y_true, Label::ALL.len())?;
        let metrics = MultiClassMetrics::from_confusion_matrix(&confusion);

        Ok(Self {
            accuracy: confusion.accuracy(),
            f1: metrics.f1[Label::Genuine.index()],
            roc_auc: roc_auc_score(y_true, probabilities),
            report: classification_report(&confusion, &TARGET_NAMES),
            confusion,
        })
    }

    /// ROC-AUC at 4 decimals, or `n/a`
    pub fn roc_auc_display(&self) -> String {
        self.roc_auc.map_or_else(|| "n/a".to_string(), |auc| format!("{auc:.4}"))
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f, "F1-Score: {:.4}", self.f1)?;
        writeln!(f, "ROC AUC Score: {}", self.roc_auc_display())?;
        writeln!(f)?;
        writeln!(f, "Classification Report:")?;
        write!(f, "{}", self.report)
    }
}

/// Runs an embedder and a fitted classifier over labeled encodings
pub struct Evaluator<'a, E: Embedder + ?Sized> {
    embedder: &'a E,
    classifier: &'a GradientBoostedTrees,
    batch_size: usize,
    log_level: LogLevel,
}

impl<'a, E: Embedder + ?Sized> Evaluator<'a, E> {
    pub fn new(embedder: &'a E, classifier: &'a GradientBoostedTrees, batch_size: usize) -> Self {
        Self { embedder, classifier, batch_size, log_level: LogLevel::Quiet }
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Embed, predict and score
    pub fn evaluate(&self, encodings: &[Encoding], labels: &[Label]) -> Result<EvaluationReport> {
        if encodings.len() != labels.len() {
            return Err(Error::shape("evaluation labels", vec![encodings.len()], vec![labels.len()]));
        }
        let features = extract_embeddings(self.embedder, encodings, self.batch_size, self.log_level)?;
        let probabilities = self.classifier.predict_proba(features.view())?;
        let y_pred: Vec<usize> = probabilities.iter().map(|&p| GradientBoostedTrees::class_of(p)).collect();
        let y_true: Vec<usize> = labels.iter().map(|l| l.index()).collect();

        EvaluationReport::from_predictions(&y_true, &y_pred, &probabilities)
    }
}
