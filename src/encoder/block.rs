//! Transformer encoder layer (attention + feed-forward, post-LayerNorm)

use super::attention::{AttentionCache, SelfAttention};
use super::layers::{Activation, LayerNorm, LayerNormCache, Linear, NamedParam, NamedParamMut};
use ndarray::{Array1, Array2};

#[derive(Debug, Clone)]
pub struct EncoderLayer {
    pub attention: SelfAttention,
    pub intermediate: Linear,
    pub output: Linear,
    pub output_norm: LayerNorm,
    pub activation: Activation,
}

#[derive(Debug, Clone)]
pub struct EncoderLayerCache {
    attention: AttentionCache,
    attn_out: Array2<f32>,
    pre_activation: Array2<f32>,
    activated: Array2<f32>,
    norm: LayerNormCache,
}

impl EncoderLayer {
    pub fn forward(&self, x: &Array2<f32>, key_bias: Option<&Array1<f32>>) -> (Array2<f32>, EncoderLayerCache) {
        let (attn_out, attention) = self.attention.forward(x, key_bias);
        let pre_activation = self.intermediate.forward(&attn_out);
        let activated = self.activation.forward(&pre_activation);
        let ffn_out = self.output.forward(&activated);
        let (y, norm) = self.output_norm.forward(&(ffn_out + &attn_out));
        (y, EncoderLayerCache { attention, attn_out, pre_activation, activated, norm })
    }

    pub fn backward(&self, cache: &EncoderLayerCache, dy: &Array2<f32>) -> Array2<f32> {
        let d_sum = self.output_norm.backward(&cache.norm, dy);
        let d_activated = self.output.backward(&cache.activated, &d_sum);
        let d_pre = self.activation.backward(&cache.pre_activation, &d_activated);
        let mut d_attn_out = self.intermediate.backward(&cache.attn_out, &d_pre);
        d_attn_out += &d_sum;
        self.attention.backward(&cache.attention, &d_attn_out)
    }

    pub fn named_params(&self, prefix: &str) -> Vec<NamedParam<'_>> {
        let mut params = self.attention.named_params(&format!("{prefix}.attention"));
        params.extend(self.intermediate.named_params(&format!("{prefix}.intermediate.dense")));
        params.extend(self.output.named_params(&format!("{prefix}.output.dense")));
        params.extend(self.output_norm.named_params(&format!("{prefix}.output.LayerNorm")));
        params
    }

    pub fn named_params_mut(&mut self, prefix: &str) -> Vec<NamedParamMut<'_>> {
        let mut params = self.attention.named_params_mut(&format!("{prefix}.attention"));
        params.extend(self.intermediate.named_params_mut(&format!("{prefix}.intermediate.dense")));
        params.extend(self.output.named_params_mut(&format!("{prefix}.output.dense")));
        params.extend(self.output_norm.named_params_mut(&format!("{prefix}.output.LayerNorm")));
        params
    }
}
