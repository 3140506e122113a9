//! Scorer - grouped, time-aligned averages of experiment scores
//!
//! The scorer collects [`Score`]s tagged by group, averages each group into
//! one curve and draws all groups on a single chart.
//!
//! ## Averaging
//!
//! - [`Averaging::Interpolated`]: every run is reindexed onto the union of
//!   all checkpoint times (across all groups) with linear interpolation,
//!   then averaged per time. All groups share one x axis.
//! - [`Averaging::Simple`]: raw points averaged per observed time.
//!
//! ## Usage
//!
//! ```rust
//! use run_scorer::{Score, Scorer};
//! use run_scorer::series::ScoreSeries;
//!
//! let a: ScoreSeries = [(0_i64, 1.0), (10, 2.0)].into_iter().collect();
//! let b: ScoreSeries = [(0_i64, 3.0), (10, 4.0)].into_iter().collect();
//!
//! let mut scorer = Scorer::new("trueskill");
//! scorer
//!     .push_score(Score::from_series("a", "ppo", "trueskill", a))?
//!     .push_score(Score::from_series("b", "ppo", "trueskill", b))?
//!     .average_scores()?;
//!
//! let avg = scorer.average("ppo").unwrap();
//! assert_eq!(avg.value_at(10), Some(3.0));
//! # Ok::<(), run_scorer::Error>(())
//! ```

use std::fs;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::render::{render_chart, PlotOptions, RenderedChart};
use crate::score::{Score, ScoreSource, DEFAULT_METRIC};
use crate::series::{interpolated_mean, mean_by_time, time_axis, ScoreSeries};
use crate::table::ScoreTable;
use crate::{Error, Result};

/// How runs in a group are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Averaging {
    /// Average raw points per observed time
    Simple,
    /// Reindex onto the global time axis with linear interpolation first
    #[default]
    Interpolated,
}

/// Constant reference score drawn as a horizontal line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatScore {
    /// Reference value
    pub score: f64,
    /// Legend label
    pub name: String,
}

/// Collection of experiment scores grouped for comparison.
#[derive(Debug)]
pub struct Scorer {
    metric: String,
    scores: Vec<Score>,
    averages: Vec<(String, ScoreSeries)>,
    flat_score: Option<FlatScore>,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(DEFAULT_METRIC)
    }
}

impl Scorer {
    /// Create an empty scorer for `metric`.
    #[must_use]
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            scores: Vec::new(),
            averages: Vec::new(),
            flat_score: None,
        }
    }

    /// Get the metric name.
    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// All added scores in insertion order.
    #[must_use]
    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    /// Add an already loaded score.
    ///
    /// # Errors
    ///
    /// Returns `Error::MetricMismatch` if the score tracks another metric.
    pub fn push_score(&mut self, score: Score) -> Result<&mut Self> {
        if score.metric() != self.metric {
            return Err(Error::MetricMismatch {
                expected: self.metric.clone(),
                found: score.metric().to_string(),
                experiment: score.experiment().to_string(),
            });
        }
        debug!(experiment = score.experiment(), group = score.group(), "added score");
        self.scores.push(score);
        Ok(self)
    }

    /// Load one experiment from `source` and add it to `group`.
    ///
    /// # Errors
    ///
    /// Returns error if loading fails or the metric does not match.
    pub fn add_score(
        &mut self,
        experiment: &str,
        group: &str,
        source: &ScoreSource,
    ) -> Result<&mut Self> {
        if source.metric_name() != self.metric {
            return Err(Error::MetricMismatch {
                expected: self.metric.clone(),
                found: source.metric_name().to_string(),
                experiment: experiment.to_string(),
            });
        }
        let score = Score::load(experiment, group, source)?;
        self.push_score(score)
    }

    /// Add several experiments to the same group.
    ///
    /// # Errors
    ///
    /// Stops at the first experiment that fails to load.
    pub fn add_many_scores<I, S>(
        &mut self,
        experiments: I,
        group: &str,
        source: &ScoreSource,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for experiment in experiments {
            self.add_score(experiment.as_ref(), group, source)?;
        }
        Ok(self)
    }

    /// Add every experiment found under `<root>/<directory>/<runs>/`.
    ///
    /// Experiments are added in name order.
    ///
    /// # Errors
    ///
    /// Returns error if the runs directory cannot be listed or any
    /// experiment fails to load.
    pub fn add_all_scores_dir(
        &mut self,
        directory: &str,
        group: &str,
        source: &ScoreSource,
    ) -> Result<&mut Self> {
        let source = source.clone().directory(directory);
        let runs_dir = source.runs_dir();

        let mut experiments = Vec::new();
        for entry in fs::read_dir(&runs_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                experiments.push(name.to_string());
            }
        }
        experiments.sort();

        info!(dir = %runs_dir.display(), count = experiments.len(), %group, "adding experiment directory");
        self.add_many_scores(&experiments, group, &source)
    }

    /// Set the constant reference score.
    pub fn add_flat_score(&mut self, score: f64, name: impl Into<String>) -> &mut Self {
        self.flat_score = Some(FlatScore {
            score,
            name: name.into(),
        });
        self
    }

    /// Get the constant reference score, if any.
    #[must_use]
    pub const fn flat_score(&self) -> Option<&FlatScore> {
        self.flat_score.as_ref()
    }

    /// Group names in first-seen order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for score in &self.scores {
            if !groups.contains(&score.group()) {
                groups.push(score.group());
            }
        }
        groups
    }

    /// Scores belonging to `group`, in insertion order.
    #[must_use]
    pub fn get_group(&self, group: &str) -> Vec<&Score> {
        self.scores.iter().filter(|s| s.group() == group).collect()
    }

    /// Recompute group averages with interpolation onto the global time axis.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoScores` if nothing was added.
    pub fn average_scores(&mut self) -> Result<&mut Self> {
        self.average_scores_with(Averaging::Interpolated)
    }

    /// Recompute group averages with the given strategy.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoScores` if nothing was added.
    pub fn average_scores_with(&mut self, averaging: Averaging) -> Result<&mut Self> {
        if self.scores.is_empty() {
            return Err(Error::NoScores);
        }

        let axis = time_axis(self.scores.iter().map(Score::series));
        let averages: Vec<(String, ScoreSeries)> = self
            .groups()
            .into_iter()
            .map(|group| {
                let members = self.get_group(group);
                let series = members.iter().map(|s| s.series());
                let average = match averaging {
                    Averaging::Simple => mean_by_time(series),
                    Averaging::Interpolated => interpolated_mean(&axis, series),
                };
                debug!(%group, runs = members.len(), points = average.len(), "averaged group");
                (group.to_string(), average)
            })
            .collect();

        info!(groups = averages.len(), axis = axis.len(), ?averaging, "averaged scores");
        self.averages = averages;
        Ok(self)
    }

    /// Group averages from the last averaging call, in group order.
    #[must_use]
    pub fn averages(&self) -> &[(String, ScoreSeries)] {
        &self.averages
    }

    /// Average of one group from the last averaging call.
    #[must_use]
    pub fn average(&self, group: &str) -> Option<&ScoreSeries> {
        self.averages
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, series)| series)
    }

    /// Merge the current averages into one table.
    ///
    /// # Errors
    ///
    /// Returns error if the table cannot be assembled.
    pub fn table(&self, step_limit: Option<i64>) -> Result<ScoreTable> {
        ScoreTable::merge(
            self.averages.iter().map(|(name, s)| (name.as_str(), s)),
            step_limit,
        )
    }

    /// Average with interpolation and draw the comparison chart.
    ///
    /// Gaps left in the merged table are rejected instead of drawn.
    ///
    /// # Errors
    ///
    /// Returns error if there are no scores, the merged table has missing
    /// values, or drawing/saving the chart fails.
    pub fn draw_avg(&mut self, options: &PlotOptions) -> Result<RenderedChart> {
        self.draw_with(Averaging::Interpolated, options)
    }

    /// Average raw points and draw; gaps are drawn as broken lines.
    ///
    /// # Errors
    ///
    /// Returns error if there are no scores or drawing/saving fails.
    pub fn draw_simple_avg(&mut self, options: &PlotOptions) -> Result<RenderedChart> {
        self.draw_with(Averaging::Simple, options)
    }

    /// Average with `averaging` and draw.
    ///
    /// # Errors
    ///
    /// See [`Scorer::draw_avg`] and [`Scorer::draw_simple_avg`].
    pub fn draw_with(
        &mut self,
        averaging: Averaging,
        options: &PlotOptions,
    ) -> Result<RenderedChart> {
        self.average_scores_with(averaging)?;
        let table = self.table(options.step_limit)?;
        if averaging == Averaging::Interpolated {
            table.ensure_complete()?;
        }
        render_chart(&table, &self.metric, self.flat_score.as_ref(), options)
    }
}
