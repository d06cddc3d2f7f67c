//! Held-out evaluation of the fitted pipeline
//!
//! Provides:
//! - Binary confusion matrix, precision/recall/F1 and sklearn-style reports
//! - ROC-AUC from positive-class probabilities
//! - A rendered confusion-matrix image
//! - [`Evaluator`] tying embedder, classifier and metrics together

mod classification;
mod evaluator;
mod plot;

pub use classification::{
    classification_report, roc_auc_score, Average, ConfusionMatrix, MultiClassMetrics,
};
pub use evaluator::{EvaluationReport, Evaluator, TARGET_NAMES};
pub use plot::{render_confusion_matrix, save_confusion_matrix};
