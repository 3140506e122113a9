//! Checkpoint CSV loading
//!
//! Each `<time>.csv` holds one row per evaluated model. The row named
//! `models/<experiment>/<time>.pt` carries the score for that checkpoint.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::series::ScoreSeries;
use crate::{Error, Result};

/// Column holding the model key.
pub const NAME_COLUMN: &str = "name";

/// Model key for an experiment checkpoint, as written by the evaluator.
#[must_use]
pub fn model_key(experiment: &str, stem: &str) -> String {
    format!("models/{experiment}/{stem}.pt")
}

/// Load every checkpoint score under `dir`, sorted by time.
///
/// # Errors
///
/// Returns error if the directory cannot be listed, a file name is not an
/// integer time, two files share a time, or a checkpoint CSV lacks the
/// model row or a required column.
pub fn load_series(dir: &Path, experiment: &str, metric: &str) -> Result<ScoreSeries> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    files.sort();

    let mut scores = BTreeMap::new();
    for path in files {
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            debug!(path = %path.display(), "skipping non-checkpoint entry");
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidCheckpoint(path.clone()))?;
        let time: i64 = stem
            .parse()
            .map_err(|_| Error::InvalidCheckpoint(path.clone()))?;

        let model = model_key(experiment, stem);
        let score = read_checkpoint_score(&path, &model, metric)?;
        debug!(%model, time, score, "checkpoint score");

        match scores.entry(time) {
            Entry::Vacant(slot) => {
                slot.insert(score);
            }
            Entry::Occupied(_) => {
                return Err(Error::DuplicateCheckpoint {
                    time,
                    dir: dir.to_path_buf(),
                });
            }
        }
    }

    Ok(ScoreSeries::from_map(scores))
}

/// Read `metric` from the first row of `path` whose name is `model`.
///
/// # Errors
///
/// Returns error if the file is not valid CSV, lacks the `name` or metric
/// column, has no row for `model`, or the cell is not a number.
pub fn read_checkpoint_score(path: &Path, model: &str, metric: &str) -> Result<f64> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
                file: path.to_path_buf(),
            })
    };
    let name_idx = column(NAME_COLUMN)?;
    let metric_idx = column(metric)?;

    for record in reader.records() {
        let record = record?;
        if record.get(name_idx) != Some(model) {
            continue;
        }
        let raw = record.get(metric_idx).unwrap_or_default().trim();
        return raw.parse().map_err(|_| Error::InvalidScore {
            value: raw.to_string(),
            model: model.to_string(),
            file: path.to_path_buf(),
        });
    }

    Err(Error::MissingModelRow {
        model: model.to_string(),
        file: path.to_path_buf(),
    })
}
