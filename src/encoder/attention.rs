//! Multi-head self-attention with residual connection and LayerNorm

use super::layers::{LayerNorm, LayerNormCache, Linear, NamedParam, NamedParamMut};
use ndarray::{s, Array1, Array2, Axis};

/// BERT attention block: `LayerNorm(x + Wo · MHA(x))`
#[derive(Debug, Clone)]
pub struct SelfAttention {
    pub query: Linear,
    pub key: Linear,
    pub value: Linear,
    pub output: Linear,
    pub output_norm: LayerNorm,
    num_heads: usize,
}

/// Forward activations needed by [`SelfAttention::backward`]
#[derive(Debug, Clone)]
pub struct AttentionCache {
    input: Array2<f32>,
    q: Array2<f32>,
    k: Array2<f32>,
    v: Array2<f32>,
    /// Softmax probabilities per head, `[T, T]`
    probs: Vec<Array2<f32>>,
    context: Array2<f32>,
    norm: LayerNormCache,
}

impl SelfAttention {
    pub fn new(
        query: Linear,
        key: Linear,
        value: Linear,
        output: Linear,
        output_norm: LayerNorm,
        num_heads: usize,
    ) -> Self {
        Self { query, key, value, output, output_norm, num_heads }
    }

    fn head_dim(&self) -> usize {
        self.query.out_features() / self.num_heads
    }

    /// `x: [T, H]`; `key_bias` is added to every row of the attention scores
    /// (0 for visible keys, a large negative value for padding)
    pub fn forward(&self, x: &Array2<f32>, key_bias: Option<&Array1<f32>>) -> (Array2<f32>, AttentionCache) {
        let q = self.query.forward(x);
        let k = self.key.forward(x);
        let v = self.value.forward(x);

        let d = self.head_dim();
        let scale = 1.0 / (d as f32).sqrt();
        let mut context = Array2::zeros(q.raw_dim());
        let mut probs = Vec::with_capacity(self.num_heads);

        for h in 0..self.num_heads {
            let cols = h * d..(h + 1) * d;
            let k_h = k.slice(s![.., cols.clone()]);
            let mut scores = q.slice(s![.., cols.clone()]).dot(&k_h.t()) * scale;
            if let Some(bias) = key_bias {
                scores += bias;
            }
            softmax_rows(&mut scores);
            context.slice_mut(s![.., cols.clone()]).assign(&scores.dot(&v.slice(s![.., cols])));
            probs.push(scores);
        }

        let attn_out = self.output.forward(&context);
        let (y, norm) = self.output_norm.forward(&(attn_out + x));
        (y, AttentionCache { input: x.clone(), q, k, v, probs, context, norm })
    }

    pub fn backward(&self, cache: &AttentionCache, dy: &Array2<f32>) -> Array2<f32> {
        // Residual branch and output projection
        let d_sum = self.output_norm.backward(&cache.norm, dy);
        let d_context = self.output.backward(&cache.context, &d_sum);

        let d = self.head_dim();
        let scale = 1.0 / (d as f32).sqrt();
        let mut dq = Array2::zeros(cache.q.raw_dim());
        let mut dk = Array2::zeros(cache.k.raw_dim());
        let mut dv = Array2::zeros(cache.v.raw_dim());

        for (h, p) in cache.probs.iter().enumerate() {
            let cols = h * d..(h + 1) * d;
            let d_ctx = d_context.slice(s![.., cols.clone()]);

            let d_probs = d_ctx.dot(&cache.v.slice(s![.., cols.clone()]).t());
            dv.slice_mut(s![.., cols.clone()]).assign(&p.t().dot(&d_ctx));

            // Softmax backward: dS = P ⊙ (dP - rowsum(dP ⊙ P))
            let row_dot = (&d_probs * p).sum_axis(Axis(1)).insert_axis(Axis(1));
            let d_scores = (&d_probs - &row_dot) * p * scale;

            let k_h = cache.k.slice(s![.., cols.clone()]);
            let q_h = cache.q.slice(s![.., cols.clone()]);
            dq.slice_mut(s![.., cols.clone()]).assign(&d_scores.dot(&k_h));
            dk.slice_mut(s![.., cols]).assign(&d_scores.t().dot(&q_h));
        }

        let mut dx = d_sum;
        dx += &self.query.backward(&cache.input, &dq);
        dx += &self.key.backward(&cache.input, &dk);
        dx += &self.value.backward(&cache.input, &dv);
        dx
    }

    pub fn named_params(&self, prefix: &str) -> Vec<NamedParam<'_>> {
        let mut params = self.query.named_params(&format!("{prefix}.self.query"));
        params.extend(self.key.named_params(&format!("{prefix}.self.key")));
        params.extend(self.value.named_params(&format!("{prefix}.self.value")));
        params.extend(self.output.named_params(&format!("{prefix}.output.dense")));
        params.extend(self.output_norm.named_params(&format!("{prefix}.output.LayerNorm")));
        params
    }

    pub fn named_params_mut(&mut self, prefix: &str) -> Vec<NamedParamMut<'_>> {
        let mut params = self.query.named_params_mut(&format!("{prefix}.self.query"));
        params.extend(self.key.named_params_mut(&format!("{prefix}.self.key")));
        params.extend(self.value.named_params_mut(&format!("{prefix}.self.value")));
        params.extend(self.output.named_params_mut(&format!("{prefix}.output.dense")));
        params.extend(self.output_norm.named_params_mut(&format!("{prefix}.output.LayerNorm")));
        params
    }
}

/// Numerically stable in-place softmax over each row
fn softmax_rows(scores: &mut Array2<f32>) {
    for mut row in scores.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let mut scores = arr2(&[[1.0, 2.0, 3.0], [1000.0, 1000.0, -1e4]]);
        softmax_rows(&mut scores);
        for row in scores.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(scores[[1, 0]], 0.5, epsilon = 1e-6);
        assert_eq!(scores[[1, 2]], 0.0);
    }
}
