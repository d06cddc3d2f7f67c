//! CSV review loader with seeded subsampling

use super::review::{Label, ReviewRecord};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Headerless row: raw label, title, body
#[derive(Debug, Deserialize)]
struct RawRow(String, Option<String>, Option<String>);

/// Load `num_samples` reviews from a headerless CSV, sampled without replacement
///
/// The selection is a deterministic function of the file contents,
/// `num_samples` and `seed`. Every row's label is validated, not only the
/// sampled ones.
pub fn load_reviews(path: &Path, num_samples: usize, seed: u64) -> Result<Vec<ReviewRecord>> {
    if !path.is_file() {
        return Err(Error::DatasetNotFound {
            path: path.to_path_buf(),
            file: path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default(),
            dir: path
                .parent()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| ".".to_string()),
        });
    }
    let file = std::fs::File::open(path)?;
    load_reviews_from_reader(file, num_samples, seed)
}

/// Load reviews from any CSV reader (see [`load_reviews`])
pub fn load_reviews_from_reader<R: Read>(
    reader: R,
    num_samples: usize,
    seed: u64,
) -> Result<Vec<ReviewRecord>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_reader(reader);

    // Reservoir sampling (Algorithm R): one pass, O(num_samples) memory
    let mut rng = StdRng::seed_from_u64(seed);
    let mut reservoir: Vec<ReviewRecord> = Vec::with_capacity(num_samples.min(1 << 16));
    let mut seen = 0usize;

    for (row, result) in rdr.deserialize::<RawRow>().enumerate() {
        let RawRow(raw_label, title, body) = result?;
        let record = ReviewRecord {
            row,
            label: Label::from_raw(&raw_label, row)?,
            title: title.unwrap_or_default(),
            body: body.unwrap_or_default(),
        };

        if seen < num_samples {
            reservoir.push(record);
        } else {
            let j = rng.random_range(0..=seen);
            if j < num_samples {
                reservoir[j] = record;
            }
        }
        seen += 1;
    }

    if seen < num_samples {
        return Err(Error::SampleSize { requested: num_samples, available: seen });
    }
    Ok(reservoir)
}
