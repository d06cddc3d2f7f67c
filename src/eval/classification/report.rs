//! sklearn-style classification report

use super::confusion::ConfusionMatrix;
use super::metrics::{Average, MultiClassMetrics};

/// Format per-class and averaged metrics the way scikit-learn's
/// `classification_report` does with `digits=2`
///
/// `target_names[i]` labels class `i`.
pub fn classification_report(cm: &ConfusionMatrix, target_names: &[&str]) -> String {
    let metrics = MultiClassMetrics::from_confusion_matrix(cm);
    let width = target_names.iter().map(|n| n.len()).chain(["weighted avg".len()]).max().unwrap_or(12);

    let mut report = format!(
        "{:>width$}  {:>9} {:>9} {:>9} {:>9}\n\n",
        "", "precision", "recall", "f1-score", "support"
    );

    for class in 0..metrics.n_classes {
        let name = target_names.get(class).map_or_else(|| class.to_string(), |n| (*n).to_string());
        report.push_str(&row(&name, metrics.precision[class], metrics.recall[class], metrics.f1[class], metrics.support[class], width));
    }
    report.push('\n');

    let total = metrics.total_support();
    report.push_str(&format!(
        "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy",
        "",
        "",
        cm.accuracy(),
        total
    ));
    report.push_str(&row(
        "macro avg",
        metrics.precision_avg(Average::Macro),
        metrics.recall_avg(Average::Macro),
        metrics.f1_avg(Average::Macro),
        total,
        width,
    ));
    report.push_str(&row(
        "weighted avg",
        metrics.precision_avg(Average::Weighted),
        metrics.recall_avg(Average::Weighted),
        metrics.f1_avg(Average::Weighted),
        total,
        width,
    ));

    report
}

fn row(name: &str, precision: f64, recall: f64, f1: f64, support: usize, width: usize) -> String {
    format!("{name:>width$}  {precision:>9.2} {recall:>9.2} {f1:>9.2} {support:>9}\n")
}
