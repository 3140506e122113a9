//! Per-experiment scores
//!
//! A [`Score`] is one experiment's metric curve, tagged with the group it
//! is averaged into.
//!
//! ## Directory Layout
//!
//! ```text
//! <experiments_path>/<directory>/<runs>/<experiment>/
//!     0.csv      name,trueskill,...
//!     500.csv    models/<experiment>/500.pt,24.1,...
//!     1000.csv
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use run_scorer::score::{Score, ScoreSource};
//!
//! let source = ScoreSource::new().experiments_path("../experiments");
//! let score = Score::load("ppo-seed-1", "ppo", &source)?;
//! println!("{} checkpoints", score.series().len());
//! # Ok::<(), run_scorer::Error>(())
//! ```

mod loader;
mod source;

pub use loader::{load_series, model_key, read_checkpoint_score, NAME_COLUMN};
pub use source::{ScoreSource, DEFAULT_METRIC};

use tracing::{info, warn};

use crate::series::ScoreSeries;
use crate::Result;

/// One experiment's score series for a single metric.
///
/// Built once from disk (or from an existing series) and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    experiment: String,
    group: String,
    metric: String,
    series: ScoreSeries,
}

impl Score {
    /// Load an experiment's checkpoint scores from `source`.
    ///
    /// # Errors
    ///
    /// Returns error if the experiment directory or any checkpoint CSV
    /// cannot be read; see [`load_series`].
    pub fn load(
        experiment: impl Into<String>,
        group: impl Into<String>,
        source: &ScoreSource,
    ) -> Result<Self> {
        let experiment = experiment.into();
        let dir = source.experiment_dir(&experiment);
        let series = load_series(&dir, &experiment, source.metric_name())?;

        if series.is_empty() {
            warn!(%experiment, dir = %dir.display(), "no checkpoint files found");
        }
        info!(%experiment, points = series.len(), metric = source.metric_name(), "loaded score");

        Ok(Self {
            experiment,
            group: group.into(),
            metric: source.metric_name().to_string(),
            series,
        })
    }

    /// Wrap an already computed series.
    #[must_use]
    pub fn from_series(
        experiment: impl Into<String>,
        group: impl Into<String>,
        metric: impl Into<String>,
        series: ScoreSeries,
    ) -> Self {
        Self {
            experiment: experiment.into(),
            group: group.into(),
            metric: metric.into(),
            series,
        }
    }

    /// Get the experiment name.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Get the group this score is averaged into.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Get the metric name.
    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Get the score series, ascending by time.
    #[must_use]
    pub const fn series(&self) -> &ScoreSeries {
        &self.series
    }
}
