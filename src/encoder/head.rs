//! Sequence classification head: pooler + linear classifier over `[CLS]`

use super::config::BertConfig;
use super::layers::{Linear, NamedParam, NamedParamMut};
use super::model::{BertCache, BertModel};
use crate::error::{Error, Result};
use crate::tokenizer::Encoding;
use crate::Tensor;
use ndarray::{s, Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Checkpoint prefix of the encoder tensors
pub const ENCODER_PREFIX: &str = "bert.";
/// Checkpoint prefix of the classifier tensors
pub const CLASSIFIER_PREFIX: &str = "classifier";

/// BERT encoder with a two-way classification head
#[derive(Debug, Clone)]
pub struct BertForSequenceClassification {
    pub bert: BertModel,
    pub classifier: Linear,
}

/// Loss and logits for one example
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleOutput {
    pub loss: f32,
    pub logits: Array1<f32>,
}

impl ExampleOutput {
    /// Index of the larger logit
    pub fn predicted(&self) -> usize {
        usize::from(self.logits[1] > self.logits[0])
    }
}

struct HeadCache {
    encoder: BertCache,
    seq_len: usize,
    cls: Array2<f32>,
    pooled: Array2<f32>,
}

impl BertForSequenceClassification {
    /// Randomly initialized model; all draws come from `seed`
    pub fn new_random(config: &BertConfig, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let bert = BertModel::new_random(config, &mut rng)?;
        let classifier = Self::fresh_classifier(config, &mut rng);
        Ok(Self { bert, classifier })
    }

    pub(crate) fn fresh_classifier(config: &BertConfig, rng: &mut StdRng) -> Linear {
        Linear::new_random(config.hidden_size, config.num_labels, config.initializer_range, rng)
    }

    pub fn config(&self) -> &BertConfig {
        self.bert.config()
    }

    fn forward_cached(&self, encoding: &Encoding) -> Result<(Array2<f32>, HeadCache)> {
        let (hidden, encoder) = self.bert.forward(encoding.real_ids(), None)?;
        let cls = hidden.slice(s![0..1, ..]).to_owned();
        let pooled = self.bert.pooler.forward(&cls).mapv(f32::tanh);
        let logits = self.classifier.forward(&pooled);
        Ok((logits, HeadCache { encoder, seq_len: hidden.nrows(), cls, pooled }))
    }

    /// Class logits `[2]`
    pub fn logits(&self, encoding: &Encoding) -> Result<Array1<f32>> {
        Ok(self.forward_cached(encoding)?.0.row(0).to_owned())
    }

    /// Cross-entropy loss without touching gradients
    pub fn evaluate_example(&self, encoding: &Encoding, label: usize) -> Result<ExampleOutput> {
        let logits = self.logits(encoding)?;
        let (loss, _) = cross_entropy(&logits, label)?;
        Ok(ExampleOutput { loss, logits })
    }

    /// Forward + backward for one example, accumulating `scale · ∂loss/∂θ`
    ///
    /// With `scale = 1 / batch_size` the accumulated gradients over a batch
    /// are those of the mean batch loss.
    pub fn forward_backward(
        &self,
        encoding: &Encoding,
        label: usize,
        scale: f32,
    ) -> Result<ExampleOutput> {
        let (logits, cache) = self.forward_cached(encoding)?;
        let logits = logits.row(0).to_owned();
        let (loss, mut d_logits) = cross_entropy(&logits, label)?;
        d_logits *= scale;

        let d_logits = d_logits.insert_axis(ndarray::Axis(0));
        let d_pooled = self.classifier.backward(&cache.pooled, &d_logits);
        let d_pre_tanh = d_pooled * &cache.pooled.mapv(|p| 1.0 - p * p);
        let d_cls = self.bert.pooler.backward(&cache.cls, &d_pre_tanh);

        let mut d_hidden = Array2::zeros((cache.seq_len, self.bert.hidden_size()));
        d_hidden.row_mut(0).assign(&d_cls.row(0));
        self.bert.backward(&cache.encoder, &d_hidden);

        Ok(ExampleOutput { loss, logits })
    }

    /// Every parameter with its HuggingFace checkpoint name
    pub fn named_params(&self) -> Vec<NamedParam<'_>> {
        let mut params = self.bert.named_params(ENCODER_PREFIX);
        params.extend(self.classifier.named_params(CLASSIFIER_PREFIX));
        params
    }

    pub fn named_params_mut(&mut self) -> Vec<NamedParamMut<'_>> {
        let mut params = self.bert.named_params_mut(ENCODER_PREFIX);
        params.extend(self.classifier.named_params_mut(CLASSIFIER_PREFIX));
        params
    }

    /// Parameters in a fixed order, for the optimizer
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.named_params_mut().into_iter().map(|(_, t)| t).collect()
    }

    pub fn zero_grad(&self) {
        for (_, param) in self.named_params() {
            param.zero_grad();
        }
    }
}

/// Loss `-log softmax(logits)[label]` and its gradient `softmax - onehot`
pub fn cross_entropy(logits: &Array1<f32>, label: usize) -> Result<(f32, Array1<f32>)> {
    if label >= logits.len() {
        return Err(Error::shape("class label", vec![logits.len()], vec![label]));
    }
    let max = logits.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    let log_sum_exp = max + sum.ln();

    let loss = log_sum_exp - logits[label];
    let mut grad = exp / sum;
    grad[label] -= 1.0;
    Ok((loss, grad))
}

/// Softmax over a logit vector
pub fn softmax(logits: &Array1<f32>) -> Array1<f32> {
    let max = logits.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}
