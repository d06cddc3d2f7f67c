//! SafeTensors checkpoint reading and writing
//!
//! Tensor names follow the HuggingFace BERT convention. Reading accepts
//! names with or without the `bert.` prefix, legacy TensorFlow-style
//! `LayerNorm.gamma` / `LayerNorm.beta`, and f32 / f16 / bf16 data.

use super::head::ENCODER_PREFIX;
use crate::error::{Error, Result};
use crate::Tensor;
use safetensors::tensor::{Dtype, TensorView};
use safetensors::SafeTensors;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Tensor data read from a checkpoint, converted to f32
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTensor {
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
}

/// Map a checkpoint name to the canonical form used by the model
///
/// Encoder tensors get the `bert.` prefix, LayerNorm `gamma`/`beta` become
/// `weight`/`bias`.
pub fn canonical_name(name: &str) -> String {
    let name = if name.starts_with(ENCODER_PREFIX) || name.starts_with("classifier.") {
        name.to_string()
    } else if ["embeddings.", "encoder.", "pooler."].iter().any(|p| name.starts_with(p)) {
        format!("{ENCODER_PREFIX}{name}")
    } else {
        name.to_string()
    };

    if let Some(stem) = name.strip_suffix("LayerNorm.gamma") {
        format!("{stem}LayerNorm.weight")
    } else if let Some(stem) = name.strip_suffix("LayerNorm.beta") {
        format!("{stem}LayerNorm.bias")
    } else {
        name
    }
}

/// Find SafeTensors files: `model.safetensors`, else sorted shards
pub fn find_safetensors_files(dir: &Path) -> Vec<PathBuf> {
    let single = dir.join("model.safetensors");
    if single.is_file() {
        return vec![single];
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| p.extension().is_some_and(|e| e == "safetensors"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

/// Read every tensor whose canonical name satisfies `keep`
pub fn read_checkpoint(
    files: &[PathBuf],
    mut keep: impl FnMut(&str) -> bool,
) -> Result<HashMap<String, LoadedTensor>> {
    let mut tensors = HashMap::new();
    for path in files {
        let data = std::fs::read(path)?;
        let st = SafeTensors::deserialize(&data).map_err(|e| {
            Error::Serialization(format!("Failed to parse SafeTensors {}: {e}", path.display()))
        })?;

        for name in st.names() {
            let canonical = canonical_name(name);
            if !keep(&canonical) {
                continue;
            }
            let view = st.tensor(name).map_err(|e| {
                Error::Serialization(format!("Failed to read tensor {name}: {e}"))
            })?;
            let values = tensor_to_f32_vec(&view).ok_or_else(|| {
                Error::Serialization(format!(
                    "Unsupported dtype {:?} for tensor {name} in {}",
                    view.dtype(),
                    path.display()
                ))
            })?;
            tensors.insert(canonical, LoadedTensor { shape: view.shape().to_vec(), values });
        }
    }
    Ok(tensors)
}

/// Convert SafeTensors tensor view to f32 Vec
///
/// Handles bf16, fp16, and fp32 formats.
fn tensor_to_f32_vec(tensor: &TensorView<'_>) -> Option<Vec<f32>> {
    let data = tensor.data();
    match tensor.dtype() {
        Dtype::F32 => Some(
            data.chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        ),
        Dtype::F16 => Some(
            data.chunks_exact(2)
                .map(|chunk| half::f16::from_bits(u16::from_le_bytes([chunk[0], chunk[1]])).to_f32())
                .collect(),
        ),
        Dtype::BF16 => Some(
            data.chunks_exact(2)
                .map(|chunk| half::bf16::from_bits(u16::from_le_bytes([chunk[0], chunk[1]])).to_f32())
                .collect(),
        ),
        _ => None,
    }
}

/// Write f32 tensors to a SafeTensors file
pub fn write_checkpoint(
    path: &Path,
    params: &[(String, &Tensor)],
    metadata: HashMap<String, String>,
) -> Result<()> {
    let tensor_data: Vec<(&str, Vec<u8>, Vec<usize>)> = params
        .iter()
        .map(|(name, tensor)| {
            // SafeTensors stores little-endian regardless of host order
            let bytes: Vec<u8> = tensor.data().iter().flat_map(|v| v.to_le_bytes()).collect();
            (name.as_str(), bytes, tensor.shape().to_vec())
        })
        .collect();

    let views = tensor_data
        .iter()
        .map(|(name, bytes, shape)| {
            TensorView::new(Dtype::F32, shape.clone(), bytes)
                .map(|view| (*name, view))
                .map_err(|e| Error::Serialization(format!("Invalid tensor {name}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let bytes = safetensors::serialize(views, Some(metadata))
        .map_err(|e| Error::Serialization(format!("SafeTensors serialization failed: {e}")))?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_canonical_name() {
        assert_eq!(
            canonical_name("embeddings.word_embeddings.weight"),
            "bert.embeddings.word_embeddings.weight"
        );
        assert_eq!(
            canonical_name("bert.encoder.layer.3.output.LayerNorm.gamma"),
            "bert.encoder.layer.3.output.LayerNorm.weight"
        );
        assert_eq!(canonical_name("embeddings.LayerNorm.beta"), "bert.embeddings.LayerNorm.bias");
        assert_eq!(canonical_name("classifier.weight"), "classifier.weight");
        assert_eq!(canonical_name("cls.predictions.bias"), "cls.predictions.bias");
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.safetensors");
        let a = Tensor::from_shape_vec(vec![2, 2], vec![0.1, 0.2, 0.3, 0.4], false);
        let b = Tensor::from_vec(vec![-1.0], false);
        write_checkpoint(
            &path,
            &[("bert.pooler.dense.weight".to_string(), &a), ("classifier.bias".to_string(), &b)],
            HashMap::from([("format".to_string(), "pt".to_string())]),
        )
        .unwrap();

        let files = find_safetensors_files(dir.path());
        assert_eq!(files, vec![path]);

        let loaded = read_checkpoint(&files, |_| true).unwrap();
        assert_eq!(loaded["bert.pooler.dense.weight"].shape, vec![2, 2]);
        assert_eq!(loaded["bert.pooler.dense.weight"].values, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(loaded["classifier.bias"].values, vec![-1.0]);

        let filtered = read_checkpoint(&files, |name| name.starts_with("classifier")).unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_written_bytes_are_little_endian() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.safetensors");
        let t = Tensor::from_vec(vec![-1.0, 0.15625], false);
        write_checkpoint(&path, &[("classifier.bias".to_string(), &t)], HashMap::new()).unwrap();

        let buffer = std::fs::read(&path).unwrap();
        let file = SafeTensors::deserialize(&buffer).unwrap();
        let view = file.tensor("classifier.bias").unwrap();
        assert_eq!(view.dtype(), Dtype::F32);

        let expected: Vec<u8> = [-1.0f32, 0.15625].iter().flat_map(|v| v.to_le_bytes()).collect();
        assert_eq!(view.data(), expected.as_slice());
        assert_eq!(&view.data()[..4], &[0x00u8, 0x00, 0x80, 0xBF]);
    }

    #[test]
    fn test_read_f16_and_bf16() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.safetensors");

        let f16_bytes: Vec<u8> = [0.5f32, -2.0]
            .iter()
            .flat_map(|&v| half::f16::from_f32(v).to_le_bytes())
            .collect();
        let bf16_bytes: Vec<u8> = [1.5f32, 4.0]
            .iter()
            .flat_map(|&v| half::bf16::from_f32(v).to_le_bytes())
            .collect();
        let f16_view = TensorView::new(Dtype::F16, vec![2], &f16_bytes).unwrap();
        let bf16_view = TensorView::new(Dtype::BF16, vec![2], &bf16_bytes).unwrap();
        let data = vec![("pooler.dense.bias", &f16_view), ("classifier.bias", &bf16_view)];
        let serialized = safetensors::serialize(data, None::<HashMap<String, String>>).unwrap();
        std::fs::write(&path, serialized).unwrap();

        let loaded = read_checkpoint(&[path], |_| true).unwrap();
        assert_eq!(loaded["bert.pooler.dense.bias"].values, vec![0.5, -2.0]);
        assert_eq!(loaded["classifier.bias"].values, vec![1.5, 4.0]);
    }

    #[test]
    fn test_unsupported_dtype_is_error_only_when_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.safetensors");
        let ids: Vec<u8> = [0i64, 1, 2].iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = TensorView::new(Dtype::I64, vec![1, 3], &ids).unwrap();
        let serialized = safetensors::serialize(
            vec![("embeddings.position_ids", &view)],
            None::<HashMap<String, String>>,
        )
        .unwrap();
        std::fs::write(&path, serialized).unwrap();

        let files = vec![path];
        assert!(read_checkpoint(&files, |_| false).unwrap().is_empty());
        assert!(read_checkpoint(&files, |_| true).is_err());
    }

    #[test]
    fn test_find_safetensors_in_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(find_safetensors_files(dir.path()).is_empty());
        assert!(find_safetensors_files(&dir.path().join("missing")).is_empty());
    }
}
