//! Score Source - where an experiment's checkpoint CSVs live

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default metric column.
pub const DEFAULT_METRIC: &str = "trueskill";

/// Location and metric of an experiment's score files.
///
/// The experiment directory is
/// `<experiments_path>/<directory>/<runs>/<experiment>`.
///
/// ## Example
///
/// ```rust
/// use run_scorer::score::ScoreSource;
///
/// let source = ScoreSource::new()
///     .experiments_path("results")
///     .directory("ablation")
///     .metric("elo");
///
/// assert_eq!(
///     source.experiment_dir("seed-1"),
///     std::path::Path::new("results/ablation/runs/seed-1")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreSource {
    experiments_path: PathBuf,
    directory: String,
    runs: String,
    metric: String,
}

impl Default for ScoreSource {
    fn default() -> Self {
        Self {
            experiments_path: Path::new(".").join("..").join("experiments"),
            directory: "base".to_string(),
            runs: "runs".to_string(),
            metric: DEFAULT_METRIC.to_string(),
        }
    }
}

impl ScoreSource {
    /// Create a source with the default layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default layout rooted at `../final_results`, where whole directories
    /// of finished runs are collected.
    #[must_use]
    pub fn final_results() -> Self {
        Self::default().experiments_path(Path::new(".").join("..").join("final_results"))
    }

    /// Set the root holding experiment directories.
    #[must_use]
    pub fn experiments_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.experiments_path = path.into();
        self
    }

    /// Set the directory under the root.
    #[must_use]
    pub fn directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Set the runs subdirectory name.
    #[must_use]
    pub fn runs(mut self, runs: impl Into<String>) -> Self {
        self.runs = runs.into();
        self
    }

    /// Set the metric column to extract.
    #[must_use]
    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = metric.into();
        self
    }

    /// Get the metric column name.
    #[must_use]
    pub fn metric_name(&self) -> &str {
        &self.metric
    }

    /// Get the experiments root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.experiments_path
    }

    /// Directory listing one subdirectory per experiment.
    #[must_use]
    pub fn runs_dir(&self) -> PathBuf {
        self.experiments_path.join(&self.directory).join(&self.runs)
    }

    /// Directory holding one experiment's `<time>.csv` files.
    #[must_use]
    pub fn experiment_dir(&self, experiment: &str) -> PathBuf {
        self.runs_dir().join(experiment)
    }
}
