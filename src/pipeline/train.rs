//! Fine-tune, embed, fit the tree classifier

use super::{stage, ACCURACY_TARGET, DEVICE};
use crate::cli::{log, LogLevel};
use crate::config::PipelineConfig;
use crate::data::{load_reviews, random_split, select, train_test_split};
use crate::embed::extract_embeddings;
use crate::encoder::{BertForSequenceClassification, HeadSource};
use crate::error::{Error, Result};
use crate::eval::{ConfusionMatrix, MultiClassMetrics};
use crate::finetune::{FineTuneConfig, FineTuneResult, FineTuner, TrainingExample};
use crate::gbdt::GradientBoostedTrees;
use crate::tokenizer::{Tokenizer, WordPieceTokenizer};
use ndarray::Axis;

/// Outcome of a full training run
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub fine_tune: FineTuneResult,
    /// Tree-classifier accuracy on the embedding hold-out split
    pub holdout_accuracy: f64,
    /// Genuine-class F1 on the same split
    pub holdout_f1: f64,
    pub holdout_size: usize,
}

impl TrainSummary {
    pub fn met_target(&self) -> bool {
        self.holdout_accuracy > ACCURACY_TARGET
    }
}

/// Run the training pipeline and persist both artifacts
pub fn train(config: &PipelineConfig, level: LogLevel) -> Result<TrainSummary> {
    log(level, LogLevel::Normal, "--- Starting Training Pipeline ---");

    stage(level, 1, 5, &format!("Loading data... (using {} samples)", config.train.num_samples));
    let records = load_reviews(&config.train_csv(), config.train.num_samples, config.train.seed)?;
    let labels: Vec<usize> = records.iter().map(|r| r.label.index()).collect();

    stage(level, 2, 5, "Tokenizing data for BERT...");
    let pretrained_dir = config.pretrained_dir();
    if !pretrained_dir.is_dir() {
        return Err(Error::ArtifactNotFound {
            path: pretrained_dir,
            hint: "Place the bert-base-uncased checkpoint (config.json, vocab.txt, model.safetensors) there".into(),
        });
    }
    let tokenizer = WordPieceTokenizer::from_dir(&pretrained_dir)?;
    let texts: Vec<String> = records.iter().map(|r| r.text()).collect();
    let encodings = tokenizer.encode_batch(&texts, config.tokenizer.max_len)?;

    stage(level, 3, 5, "Fine-tuning BERT model...");
    let examples: Vec<TrainingExample> = encodings
        .iter()
        .zip(&records)
        .map(|(encoding, record)| TrainingExample { encoding: encoding.clone(), label: record.label })
        .collect();
    let (fit_idx, val_idx) = random_split(examples.len(), 1.0 - config.train.val_fraction, config.train.seed);
    let fit_set = select(&examples, &fit_idx);
    let val_set = select(&examples, &val_idx);

    log(level, LogLevel::Normal, &format!("Using device: {DEVICE}"));
    let (model, head) = BertForSequenceClassification::from_pretrained(&pretrained_dir, config.train.seed)?;
    if head == HeadSource::Initialized {
        log(level, LogLevel::Verbose, "  Classification head not in checkpoint, initialized fresh");
    }
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  {} parameters, {} fine-tuning / {} validation examples",
            model.bert.num_parameters(),
            fit_set.len(),
            val_set.len()
        ),
    );

    let mut tuner = FineTuner::new(model, FineTuneConfig::from_pipeline(config)).with_log_level(level);
    let fine_tune = tuner.train(&fit_set, &val_set)?;
    log(level, LogLevel::Normal, "BERT fine-tuning complete.");

    let model = tuner.into_model();
    let finetuned_dir = config.finetuned_dir();
    model.save_pretrained(&finetuned_dir)?;
    tokenizer.save(&finetuned_dir)?;
    log(level, LogLevel::Normal, &format!("Fine-tuned BERT model saved to {}", finetuned_dir.display()));

    stage(level, 4, 5, "Extracting embeddings from BERT to train XGBoost...");
    let embeddings = extract_embeddings(&model.bert, &encodings, config.train.batch_size, level)?;
    let (train_idx, test_idx) = train_test_split(records.len(), config.gbdt.test_size, config.gbdt.seed)?;
    let x_train = embeddings.select(Axis(0), &train_idx);
    let x_test = embeddings.select(Axis(0), &test_idx);
    let y_train = select(&labels, &train_idx);
    let y_test = select(&labels, &test_idx);

    stage(level, 5, 5, "Training XGBoost classifier...");
    let classifier = GradientBoostedTrees::fit(x_train.view(), &y_train, &config.gbdt.params())?;
    log(level, LogLevel::Normal, "XGBoost training complete.");

    let y_pred = classifier.predict(x_test.view())?;
    let confusion = ConfusionMatrix::from_predictions(&y_pred, &y_test, 2)?;
    let summary = TrainSummary {
        fine_tune,
        holdout_accuracy: confusion.accuracy(),
        holdout_f1: MultiClassMetrics::from_confusion_matrix(&confusion).f1[1],
        holdout_size: y_test.len(),
    };

    log(level, LogLevel::Normal, "--- Evaluation ---");
    log(
        level,
        LogLevel::Normal,
        &format!("XGBoost Accuracy on hold-out set: {:.2}%", summary.holdout_accuracy * 100.0),
    );
    log(level, LogLevel::Normal, &format!("XGBoost F1-Score on hold-out set: {:.3}", summary.holdout_f1));
    if summary.met_target() {
        log(level, LogLevel::Normal, "Successfully achieved accuracy > 85%!");
    } else {
        log(
            level,
            LogLevel::Normal,
            "Did not meet accuracy target of 85%. Consider training on more data or for more epochs.",
        );
    }

    let classifier_path = config.classifier_path();
    classifier.save(&classifier_path)?;
    log(level, LogLevel::Normal, &format!("XGBoost model saved to {}", classifier_path.display()));
    log(level, LogLevel::Normal, "\n--- Training Pipeline Finished ---");

    Ok(summary)
}
