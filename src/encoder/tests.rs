//! Encoder gradient, masking and persistence tests

use super::*;
use crate::tokenizer::{Encoding, SpecialIds};
use approx::assert_abs_diff_eq;

const SPECIAL: SpecialIds = SpecialIds { cls: 2, sep: 3, pad: 0, unk: 1, mask: 4 };

fn tiny_config() -> BertConfig {
    BertConfig {
        vocab_size: 20,
        hidden_size: 8,
        num_hidden_layers: 2,
        num_attention_heads: 2,
        intermediate_size: 16,
        max_position_embeddings: 16,
        initializer_range: 0.5,
        layer_norm_eps: 1e-5,
        ..BertConfig::bert_base_uncased()
    }
}

fn encoding(pieces: &[u32], max_len: usize) -> Encoding {
    Encoding::from_pieces(pieces, max_len, SPECIAL)
}

#[test]
fn test_gradients_match_finite_differences() {
    let mut model = BertForSequenceClassification::new_random(&tiny_config(), 7).unwrap();
    let enc = encoding(&[5, 9, 11, 5], 10);
    let label = 1;

    model.zero_grad();
    model.forward_backward(&enc, label, 1.0).unwrap();
    let analytic: Vec<(String, Vec<f32>)> = model
        .named_params()
        .into_iter()
        .map(|(name, t)| {
            let grad = t.grad().map(|g| g.to_vec()).unwrap_or_else(|| vec![0.0; t.len()]);
            (name, grad)
        })
        .collect();

    let h = 1e-2f32;
    let mut checked = 0;
    for (p, (name, grad)) in analytic.iter().enumerate() {
        let len = grad.len();
        // First, middle and last entry, plus the embedding row of token 9
        let mut indices = vec![0, len / 2, len - 1];
        if name.ends_with("word_embeddings.weight") {
            indices.push(9 * 8 + 3);
        }
        for &i in &indices {
            let original = model.parameters_mut()[p].data()[i];

            model.parameters_mut()[p].data_mut()[i] = original + h;
            let plus = model.evaluate_example(&enc, label).unwrap().loss;
            model.parameters_mut()[p].data_mut()[i] = original - h;
            let minus = model.evaluate_example(&enc, label).unwrap().loss;
            model.parameters_mut()[p].data_mut()[i] = original;

            let numeric = (plus - minus) / (2.0 * h);
            let tolerance = 2e-3 + 0.05 * numeric.abs().max(grad[i].abs());
            assert!(
                (numeric - grad[i]).abs() <= tolerance,
                "{name}[{i}]: analytic {} vs numeric {numeric}",
                grad[i]
            );
            checked += 1;
        }
    }
    assert!(checked > 100);
}

#[test]
fn test_scale_multiplies_gradients() {
    let model = BertForSequenceClassification::new_random(&tiny_config(), 3).unwrap();
    let enc = encoding(&[6, 7], 6);

    model.forward_backward(&enc, 0, 1.0).unwrap();
    let full = model.classifier.weight.grad().unwrap();
    model.zero_grad();
    model.forward_backward(&enc, 0, 0.25).unwrap();
    model.forward_backward(&enc, 0, 0.25).unwrap();
    let half = model.classifier.weight.grad().unwrap();

    for (a, b) in full.iter().zip(half.iter()) {
        assert_abs_diff_eq!(*a * 0.5, *b, epsilon = 1e-6);
    }
}

#[test]
fn test_padding_does_not_change_unmasked_positions() {
    let model = BertForSequenceClassification::new_random(&tiny_config(), 11).unwrap();
    let enc = encoding(&[5, 6, 7], 12);

    let padded = model.bert.hidden_states(&enc).unwrap();
    let (compact, _) = model.bert.forward(enc.real_ids(), None).unwrap();

    assert_eq!(padded.nrows(), 12);
    assert_eq!(compact.nrows(), 5);
    for t in 0..5 {
        for j in 0..8 {
            assert_abs_diff_eq!(padded[[t, j]], compact[[t, j]], epsilon = 1e-4);
        }
    }

    let cls = model.bert.cls_embedding(&enc).unwrap();
    assert_eq!(cls.to_vec(), compact.row(0).to_vec());
}

#[test]
fn test_embedding_deterministic() {
    let model = BertForSequenceClassification::new_random(&tiny_config(), 5).unwrap();
    let enc = encoding(&[8, 9, 10], 8);
    let a = model.bert.cls_embedding(&enc).unwrap();
    let b = model.bert.cls_embedding(&enc).unwrap();
    assert_eq!(a, b);

    let same_seed = BertForSequenceClassification::new_random(&tiny_config(), 5).unwrap();
    assert_eq!(same_seed.bert.cls_embedding(&enc).unwrap(), a);
}

#[test]
fn test_out_of_range_inputs_rejected() {
    let model = BertForSequenceClassification::new_random(&tiny_config(), 5).unwrap();
    assert!(model.bert.cls_embedding(&encoding(&[25], 6)).is_err());
    // 16 positions available, 20 requested
    assert!(model.bert.hidden_states(&encoding(&[5; 30], 20)).is_err());
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let model = BertForSequenceClassification::new_random(&tiny_config(), 13).unwrap();
    model.save_pretrained(dir.path()).unwrap();

    let (loaded, source) = BertForSequenceClassification::from_pretrained(dir.path(), 0).unwrap();
    assert_eq!(source, HeadSource::Checkpoint);

    let enc = encoding(&[5, 12, 13], 8);
    assert_eq!(loaded.bert.cls_embedding(&enc).unwrap(), model.bert.cls_embedding(&enc).unwrap());
    assert_eq!(loaded.logits(&enc).unwrap(), model.logits(&enc).unwrap());
}

#[test]
fn test_pretrained_encoder_without_head_gets_fresh_head() {
    let dir = tempfile::tempdir().unwrap();
    let model = BertForSequenceClassification::new_random(&tiny_config(), 13).unwrap();
    model.bert.config().save(&dir.path().join("config.json")).unwrap();

    // Unprefixed names, TF-style LayerNorm names, no classifier
    let renamed: Vec<(String, &crate::Tensor)> = model
        .bert
        .named_params("")
        .into_iter()
        .map(|(name, t)| {
            let name = name
                .replace("LayerNorm.weight", "LayerNorm.gamma")
                .replace("LayerNorm.bias", "LayerNorm.beta");
            (name, t)
        })
        .collect();
    write_checkpoint(&dir.path().join("model.safetensors"), &renamed, Default::default()).unwrap();

    let (a, source) = BertForSequenceClassification::from_pretrained(dir.path(), 99).unwrap();
    let (b, _) = BertForSequenceClassification::from_pretrained(dir.path(), 99).unwrap();
    assert_eq!(source, HeadSource::Initialized);

    let enc = encoding(&[6], 4);
    assert_eq!(a.bert.cls_embedding(&enc).unwrap(), model.bert.cls_embedding(&enc).unwrap());
    // Seeded head init is reproducible
    assert_eq!(a.classifier.weight.data(), b.classifier.weight.data());
}

#[test]
fn test_missing_encoder_tensor_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let model = BertForSequenceClassification::new_random(&tiny_config(), 13).unwrap();
    model.bert.config().save(&dir.path().join("config.json")).unwrap();

    let partial: Vec<(String, &crate::Tensor)> = model
        .named_params()
        .into_iter()
        .filter(|(name, _)| !name.contains("pooler"))
        .collect();
    write_checkpoint(&dir.path().join("model.safetensors"), &partial, Default::default()).unwrap();

    let err = BertForSequenceClassification::from_pretrained(dir.path(), 0).unwrap_err();
    assert!(matches!(err, crate::Error::MissingWeight { .. }));
}

#[test]
fn test_shape_mismatch_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let model = BertForSequenceClassification::new_random(&tiny_config(), 13).unwrap();
    model.save_pretrained(dir.path()).unwrap();

    let wider = BertConfig { intermediate_size: 32, ..tiny_config() };
    wider.save(&dir.path().join("config.json")).unwrap();

    let err = BertForSequenceClassification::from_pretrained(dir.path(), 0).unwrap_err();
    assert!(matches!(err, crate::Error::ShapeMismatch { .. }));
}

#[test]
fn test_missing_directory_is_artifact_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BertForSequenceClassification::from_pretrained(&dir.path().join("nope"), 0)
        .unwrap_err();
    assert!(err.is_missing_input());
}
