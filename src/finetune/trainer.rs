//! Training loop for sequence-classification fine-tuning

use crate::cli::{log, LogLevel};
use crate::config::PipelineConfig;
use crate::data::Label;
use crate::encoder::BertForSequenceClassification;
use crate::error::Result;
use crate::optim::{clip_grad_norm, AdamW, LRScheduler, LinearWarmupDecayLR, Optimizer};
use crate::tokenizer::Encoding;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// One tokenized, labeled review
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub encoding: Encoding,
    pub label: Label,
}

/// Hyperparameters of the fine-tuning loop
#[derive(Debug, Clone, PartialEq)]
pub struct FineTuneConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub lr: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
    pub weight_decay: f32,
    pub warmup_steps: usize,
    pub max_grad_norm: f32,
    /// Epoch `e` shuffles with `seed + e`
    pub seed: u64,
}

impl FineTuneConfig {
    pub fn from_pipeline(config: &PipelineConfig) -> Self {
        Self {
            epochs: config.train.epochs,
            batch_size: config.train.batch_size,
            lr: config.optimizer.lr,
            beta1: config.optimizer.beta1,
            beta2: config.optimizer.beta2,
            eps: config.optimizer.eps,
            weight_decay: config.optimizer.weight_decay,
            warmup_steps: config.train.warmup_steps,
            max_grad_norm: config.train.max_grad_norm,
            seed: config.train.seed,
        }
    }
}

impl Default for FineTuneConfig {
    fn default() -> Self {
        Self::from_pipeline(&PipelineConfig::default())
    }
}

/// Metrics for a single training epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochMetrics {
    /// Epoch number (0-indexed)
    pub epoch: usize,
    /// Mean training loss over all examples
    pub train_loss: f32,
    pub train_accuracy: f32,
    /// `None` when there is no validation data
    pub val_loss: Option<f32>,
    pub val_accuracy: Option<f32>,
    /// Learning rate at the end of the epoch
    pub learning_rate: f32,
    pub epoch_time_ms: u64,
}

/// Result of the full training run.
#[derive(Debug, Clone, PartialEq)]
pub struct FineTuneResult {
    pub epoch_metrics: Vec<EpochMetrics>,
    /// Optimizer steps taken
    pub steps: usize,
    pub total_time_ms: u64,
}

struct BatchResult {
    loss_sum: f32,
    correct: usize,
    grad_norm: f32,
}

/// Mini-batch fine-tuning of a [`BertForSequenceClassification`]
pub struct FineTuner {
    model: BertForSequenceClassification,
    optimizer: AdamW,
    config: FineTuneConfig,
    log_level: LogLevel,
}

impl FineTuner {
    pub fn new(model: BertForSequenceClassification, config: FineTuneConfig) -> Self {
        let optimizer =
            AdamW::new(config.lr, config.beta1, config.beta2, config.eps, config.weight_decay);
        Self { model, optimizer, config, log_level: LogLevel::Quiet }
    }

    /// Per-batch progress is printed at [`LogLevel::Verbose`]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn model(&self) -> &BertForSequenceClassification {
        &self.model
    }

    pub fn into_model(self) -> BertForSequenceClassification {
        self.model
    }

    /// Train for `epochs` epochs over `train`, validating on `val` after each
    pub fn train(
        &mut self,
        train: &[TrainingExample],
        val: &[TrainingExample],
    ) -> Result<FineTuneResult> {
        let total_start = std::time::Instant::now();
        let batches_per_epoch = train.len().div_ceil(self.config.batch_size);
        let total_steps = self.config.epochs * batches_per_epoch;
        let mut scheduler =
            LinearWarmupDecayLR::new(self.config.lr, self.config.warmup_steps, total_steps);

        let mut epoch_metrics = Vec::with_capacity(self.config.epochs);
        for epoch in 0..self.config.epochs {
            let epoch_start = std::time::Instant::now();

            let (train_loss, train_accuracy) = self.train_epoch(train, &mut scheduler, epoch)?;
            let (val_loss, val_accuracy) = if val.is_empty() {
                (None, None)
            } else {
                let (loss, accuracy) = self.validate(val)?;
                (Some(loss), Some(accuracy))
            };

            log(self.log_level, LogLevel::Normal, &format!("  Epoch {}/{}", epoch + 1, self.config.epochs));
            log(self.log_level, LogLevel::Normal, &format!("  Average training loss: {train_loss:.2}"));
            if let (Some(loss), Some(accuracy)) = (val_loss, val_accuracy) {
                log(
                    self.log_level,
                    LogLevel::Normal,
                    &format!("  Validation loss: {loss:.2}, accuracy: {:.2}%", accuracy * 100.0),
                );
            }

            epoch_metrics.push(EpochMetrics {
                epoch,
                train_loss,
                train_accuracy,
                val_loss,
                val_accuracy,
                learning_rate: scheduler.get_lr(),
                epoch_time_ms: epoch_start.elapsed().as_millis() as u64,
            });
        }

        Ok(FineTuneResult {
            epoch_metrics,
            steps: scheduler.current_step(),
            total_time_ms: total_start.elapsed().as_millis() as u64,
        })
    }

    /// Returns `(mean loss, accuracy)` over the epoch
    fn train_epoch(
        &mut self,
        data: &[TrainingExample],
        scheduler: &mut LinearWarmupDecayLR,
        epoch: usize,
    ) -> Result<(f32, f32)> {
        let mut order: Vec<usize> = (0..data.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(self.config.seed.wrapping_add(epoch as u64)));

        let batches = order.len().div_ceil(self.config.batch_size);
        let mut total_loss = 0.0f32;
        let mut total_correct = 0usize;

        for (batch_idx, chunk) in order.chunks(self.config.batch_size).enumerate() {
            scheduler.apply(&mut self.optimizer);
            let batch: Vec<&TrainingExample> = chunk.iter().map(|&i| &data[i]).collect();
            let result = self.train_batch(&batch)?;
            total_loss += result.loss_sum;
            total_correct += result.correct;

            log(
                self.log_level,
                LogLevel::Verbose,
                &format!(
                    "  epoch {} batch {}/{}: loss={:.4} grad_norm={:.3} lr={:.3e}",
                    epoch + 1,
                    batch_idx + 1,
                    batches,
                    result.loss_sum / batch.len() as f32,
                    result.grad_norm,
                    self.optimizer.lr()
                ),
            );
            scheduler.step();
        }

        let n = data.len().max(1) as f32;
        Ok((total_loss / n, total_correct as f32 / n))
    }

    /// Zero grads, accumulate mean-loss gradients, clip, step
    fn train_batch(&mut self, batch: &[&TrainingExample]) -> Result<BatchResult> {
        self.model.zero_grad();
        let scale = 1.0 / batch.len() as f32;

        let mut loss_sum = 0.0f32;
        let mut correct = 0usize;
        for example in batch {
            let label = example.label.index();
            let output = self.model.forward_backward(&example.encoding, label, scale)?;
            loss_sum += output.loss;
            if output.predicted() == label {
                correct += 1;
            }
        }

        let mut params = self.model.parameters_mut();
        let grad_norm = clip_grad_norm(&mut params, self.config.max_grad_norm);
        self.optimizer.step(&mut params);

        Ok(BatchResult { loss_sum, correct, grad_norm })
    }

    /// Forward-only `(mean loss, accuracy)`
    pub fn validate(&self, data: &[TrainingExample]) -> Result<(f32, f32)> {
        let mut total_loss = 0.0f32;
        let mut correct = 0usize;
        for example in data {
            let output = self.model.evaluate_example(&example.encoding, example.label.index())?;
            total_loss += output.loss;
            if output.predicted() == example.label.index() {
                correct += 1;
            }
        }
        let n = data.len().max(1) as f32;
        Ok((total_loss / n, correct as f32 / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::BertConfig;
    use crate::tokenizer::SpecialIds;

    const SPECIAL: SpecialIds = SpecialIds { cls: 2, sep: 3, pad: 0, unk: 1, mask: 4 };

    fn tiny_model() -> BertForSequenceClassification {
        let config = BertConfig {
            vocab_size: 12,
            hidden_size: 8,
            num_hidden_layers: 1,
            num_attention_heads: 2,
            intermediate_size: 16,
            max_position_embeddings: 8,
            initializer_range: 0.2,
            ..BertConfig::bert_base_uncased()
        };
        BertForSequenceClassification::new_random(&config, 1).unwrap()
    }

    fn examples() -> Vec<TrainingExample> {
        let make = |pieces: &[u32], label| TrainingExample {
            encoding: Encoding::from_pieces(pieces, 6, SPECIAL),
            label,
        };
        vec![
            make(&[5, 5], Label::Fake),
            make(&[5, 6], Label::Fake),
            make(&[9, 10], Label::Genuine),
            make(&[10, 11], Label::Genuine),
        ]
    }

    fn config(epochs: usize) -> FineTuneConfig {
        FineTuneConfig { epochs, batch_size: 2, lr: 1e-2, ..FineTuneConfig::default() }
    }

    #[test]
    fn test_defaults() {
        let config = FineTuneConfig::default();
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.epochs, 1);
        assert_eq!(config.weight_decay, 0.0);
        assert_eq!(config.max_grad_norm, 1.0);
    }

    #[test]
    fn test_loss_decreases() {
        let data = examples();
        let mut tuner = FineTuner::new(tiny_model(), config(40));
        let (initial_loss, _) = tuner.validate(&data).unwrap();

        let result = tuner.train(&data, &data).unwrap();
        let first = &result.epoch_metrics[0];
        let last = result.epoch_metrics.last().unwrap();

        assert!(last.train_loss < first.train_loss);
        assert!(last.val_loss.unwrap() < initial_loss);
        assert_eq!(last.val_accuracy, Some(1.0));
    }

    #[test]
    fn test_step_count_and_final_lr() {
        let data = examples();
        let mut tuner = FineTuner::new(tiny_model(), config(3));
        let result = tuner.train(&data, &[]).unwrap();

        assert_eq!(result.steps, 6);
        assert_eq!(result.epoch_metrics.len(), 3);
        assert!(result.epoch_metrics[0].val_loss.is_none());
        assert_eq!(result.epoch_metrics[2].learning_rate, 0.0);
    }

    #[test]
    fn test_training_is_deterministic() {
        let data = examples();
        let mut a = FineTuner::new(tiny_model(), config(2));
        let mut b = FineTuner::new(tiny_model(), config(2));
        let ra = a.train(&data, &[]).unwrap();
        let rb = b.train(&data, &[]).unwrap();

        assert_eq!(ra.epoch_metrics[1].train_loss, rb.epoch_metrics[1].train_loss);
        let enc = &data[0].encoding;
        assert_eq!(a.model().logits(enc).unwrap(), b.model().logits(enc).unwrap());
    }

    #[test]
    fn test_validate_leaves_gradients_untouched() {
        let data = examples();
        let tuner = FineTuner::new(tiny_model(), config(1));
        tuner.validate(&data).unwrap();
        assert!(tuner.model().classifier.weight.grad().is_none());
    }
}
