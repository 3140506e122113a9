//! Report manifest
//!
//! A JSON file describing one comparison chart: which experiments form
//! which group, how they are averaged and how the chart is drawn.
//!
//! ```json
//! {
//!   "metric": "trueskill",
//!   "groups": [
//!     {
//!       "group": "baseline",
//!       "experiments": ["seed-1", "seed-2"],
//!       "source": { "experiments_path": "results", "directory": "base" }
//!     },
//!     { "group": "curriculum", "all_in_directory": "curriculum" }
//!   ],
//!   "flat_score": { "score": 25.0, "name": "scripted bot" },
//!   "plot": { "title": "TrueSkill", "step_limit": 100000, "file": "trueskill" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::render::{PlotOptions, RenderedChart};
use crate::score::{ScoreSource, DEFAULT_METRIC};
use crate::scorer::{Averaging, FlatScore, Scorer};
use crate::{Error, Result};

fn default_metric() -> String {
    DEFAULT_METRIC.to_string()
}

/// Where one group's experiments live. Unset fields keep the
/// [`ScoreSource`] defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Root holding experiment directories
    pub experiments_path: Option<PathBuf>,
    /// Directory under the root (ignored with `all_in_directory`)
    pub directory: Option<String>,
    /// Runs subdirectory name
    pub runs: Option<String>,
    /// Metric override; must still match the report metric
    pub metric: Option<String>,
}

/// One group of experiments in a report.
///
/// Exactly one of `experiments` and `all_in_directory` must be set. The
/// optional `source` object locates the runs, rooted at `../final_results`
/// for whole directories and `../experiments` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    /// Group label
    pub group: String,
    /// Explicit experiment names
    #[serde(default)]
    pub experiments: Option<Vec<String>>,
    /// Add every experiment found in this directory
    #[serde(default)]
    pub all_in_directory: Option<String>,
    /// Location overrides
    #[serde(default)]
    pub source: SourceConfig,
}

impl GroupConfig {
    /// Resolve the score source for this group.
    #[must_use]
    pub fn source(&self, report_metric: &str) -> ScoreSource {
        let mut source = if self.all_in_directory.is_some() {
            ScoreSource::final_results()
        } else {
            ScoreSource::new()
        };
        let overrides = &self.source;
        if let Some(path) = &overrides.experiments_path {
            source = source.experiments_path(path);
        }
        if let Some(directory) = &overrides.directory {
            source = source.directory(directory);
        }
        if let Some(runs) = &overrides.runs {
            source = source.runs(runs);
        }
        source.metric(overrides.metric.as_deref().unwrap_or(report_metric))
    }

    fn validate(&self) -> Result<()> {
        match (&self.experiments, &self.all_in_directory) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (Some(_), Some(_)) => Err(Error::Config(format!(
                "group '{}' sets both 'experiments' and 'all_in_directory'",
                self.group
            ))),
            (None, None) => Err(Error::Config(format!(
                "group '{}' needs 'experiments' or 'all_in_directory'",
                self.group
            ))),
        }
    }
}

/// Whole-report manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Metric column shared by every group
    #[serde(default = "default_metric")]
    pub metric: String,
    /// Averaging strategy
    #[serde(default)]
    pub averaging: Averaging,
    /// Groups in legend order
    pub groups: Vec<GroupConfig>,
    /// Constant reference score
    #[serde(default)]
    pub flat_score: Option<FlatScore>,
    /// Chart options
    #[serde(default)]
    pub plot: PlotOptions,
    /// Also write the merged table as CSV
    #[serde(default)]
    pub export_csv: Option<PathBuf>,
}

/// Result of running a report.
#[derive(Debug)]
pub struct Report {
    /// Scorer with averages computed
    pub scorer: Scorer,
    /// Rendered chart
    pub chart: RenderedChart,
    /// CSV export, if written
    pub csv_path: Option<PathBuf>,
}

impl ReportConfig {
    /// Parse and validate a manifest.
    ///
    /// # Errors
    ///
    /// Returns error on malformed JSON or an inconsistent group.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a manifest file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Check group definitions.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if there are no groups or a group is
    /// ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(Error::Config("report has no groups".to_string()));
        }
        self.groups.iter().try_for_each(GroupConfig::validate)
    }

    /// Load every group's scores.
    ///
    /// # Errors
    ///
    /// Returns error if any experiment fails to load or uses another metric.
    pub fn build_scorer(&self) -> Result<Scorer> {
        let mut scorer = Scorer::new(&self.metric);
        for group in &self.groups {
            let source = group.source(&self.metric);
            if let Some(experiments) = &group.experiments {
                scorer.add_many_scores(experiments, &group.group, &source)?;
            } else if let Some(directory) = &group.all_in_directory {
                scorer.add_all_scores_dir(directory, &group.group, &source)?;
            }
        }
        if let Some(flat) = &self.flat_score {
            scorer.add_flat_score(flat.score, flat.name.clone());
        }
        Ok(scorer)
    }

    /// Load, average, draw and export.
    ///
    /// # Errors
    ///
    /// Returns the first loading, averaging, drawing or export failure.
    pub fn run(&self) -> Result<Report> {
        let mut scorer = self.build_scorer()?;
        let chart = scorer.draw_with(self.averaging, &self.plot)?;

        let csv_path = match &self.export_csv {
            Some(path) => {
                scorer.table(self.plot.step_limit)?.write_csv(path)?;
                info!(path = %path.display(), "exported score table");
                Some(path.clone())
            }
            None => None,
        };

        Ok(Report {
            scorer,
            chart,
            csv_path,
        })
    }
}
