//! Area under the ROC curve

/// ROC-AUC of positive-class `scores` against binary labels
///
/// Computed as the Mann-Whitney statistic with average ranks for tied
/// scores, which equals the trapezoidal area under the ROC curve. Returns
/// `None` when only one class is present.
pub fn roc_auc_score(y_true: &[usize], scores: &[f32]) -> Option<f64> {
    if y_true.len() != scores.len() {
        return None;
    }
    let n_pos = y_true.iter().filter(|&&y| y == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // 1-based ranks, ties share the mean of their positions
    let mut ranks = vec![0.0f64; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        let mean_rank = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = mean_rank;
        }
        start = end;
    }

    let pos_rank_sum: f64 = y_true.iter().zip(&ranks).filter(|(&y, _)| y == 1).map(|(_, &r)| r).sum();
    let n_pos = n_pos as f64;
    let u = pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0;
    Some(u / (n_pos * n_neg as f64))
}
