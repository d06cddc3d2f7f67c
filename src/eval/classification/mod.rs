//! Classification metrics
//!
//! - Confusion matrix over a fixed class count
//! - Per-class precision, recall, F1 with macro and weighted averaging
//! - sklearn-style classification reports
//! - ROC-AUC with average ranks for tied scores

mod confusion;
mod metrics;
mod report;
mod roc;


pub use confusion::ConfusionMatrix;
pub use metrics::{Average, MultiClassMetrics};
pub use report::classification_report;
pub use roc::roc_auc_score;
