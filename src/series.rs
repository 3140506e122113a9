//! Time-ordered score series
//!
//! A [`ScoreSeries`] is the per-run curve: `(time, score)` points sorted
//! strictly ascending by checkpoint time. Alignment of several runs onto a
//! shared time axis and the per-time averages used by the scorer live here
//! as plain ordered-map operations.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A single `(time, score)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    /// Checkpoint time (training step)
    pub time: i64,
    /// Metric value at that checkpoint
    pub score: f64,
}

impl ScorePoint {
    /// Create a new point.
    #[must_use]
    pub const fn new(time: i64, score: f64) -> Self {
        Self { time, score }
    }
}

/// Score series sorted strictly ascending by time.
///
/// Built from any iterator of `(time, score)` pairs; a repeated time keeps
/// the last value seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSeries {
    points: Vec<ScorePoint>,
}

impl ScoreSeries {
    /// Create an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Build a series from an ordered map of time to score.
    #[must_use]
    pub fn from_map(map: BTreeMap<i64, f64>) -> Self {
        Self {
            points: map
                .into_iter()
                .map(|(time, score)| ScorePoint::new(time, score))
                .collect(),
        }
    }

    /// Points in ascending time order.
    #[must_use]
    pub fn points(&self) -> &[ScorePoint] {
        &self.points
    }

    /// Checkpoint times in ascending order.
    pub fn times(&self) -> impl Iterator<Item = i64> + '_ {
        self.points.iter().map(|p| p.time)
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exact value recorded at `time`, if any.
    #[must_use]
    pub fn value_at(&self, time: i64) -> Option<f64> {
        self.points
            .binary_search_by_key(&time, |p| p.time)
            .ok()
            .map(|i| self.points[i].score)
    }

    /// Value at `time`, linearly interpolated between the neighbouring
    /// observations.
    ///
    /// Returns `None` before the first observation. After the last one the
    /// last score carries forward.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn interpolate_at(&self, time: i64) -> Option<f64> {
        match self.points.binary_search_by_key(&time, |p| p.time) {
            Ok(i) => Some(self.points[i].score),
            Err(0) => None,
            Err(i) if i == self.points.len() => self.points.last().map(|p| p.score),
            Err(i) => {
                let left = self.points[i - 1];
                let right = self.points[i];
                // i128 so extreme checkpoint stems cannot overflow
                let offset = (i128::from(time) - i128::from(left.time)) as f64;
                let span = (i128::from(right.time) - i128::from(left.time)) as f64;
                Some(left.score + offset / span * (right.score - left.score))
            }
        }
    }

    /// Reindex onto `axis`, one entry per axis time.
    #[must_use]
    pub fn reindex(&self, axis: &[i64]) -> Vec<Option<f64>> {
        axis.iter().map(|&t| self.interpolate_at(t)).collect()
    }

    /// Copy of the series without points after `limit`.
    #[must_use]
    pub fn truncated(&self, limit: i64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .take_while(|p| p.time <= limit)
                .copied()
                .collect(),
        }
    }
}

impl FromIterator<(i64, f64)> for ScoreSeries {
    fn from_iter<I: IntoIterator<Item = (i64, f64)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl FromIterator<ScorePoint> for ScoreSeries {
    fn from_iter<I: IntoIterator<Item = ScorePoint>>(iter: I) -> Self {
        iter.into_iter().map(|p| (p.time, p.score)).collect()
    }
}

/// Sorted union of every time present in `series`.
pub fn time_axis<'a, I>(series: I) -> Vec<i64>
where
    I: IntoIterator<Item = &'a ScoreSeries>,
{
    series
        .into_iter()
        .flat_map(ScoreSeries::times)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Running `(sum, count)` per time.
#[derive(Debug, Default)]
struct MeanAccumulator {
    totals: BTreeMap<i64, (f64, usize)>,
}

impl MeanAccumulator {
    fn push(&mut self, time: i64, score: f64) {
        let entry = self.totals.entry(time).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> ScoreSeries {
        self.totals
            .into_iter()
            .map(|(time, (sum, count))| (time, sum / count as f64))
            .collect()
    }
}

/// Average raw series per observed time.
///
/// A run contributes only at times it actually recorded; nothing is
/// interpolated.
pub fn mean_by_time<'a, I>(series: I) -> ScoreSeries
where
    I: IntoIterator<Item = &'a ScoreSeries>,
{
    let mut acc = MeanAccumulator::default();
    for s in series {
        for p in s.points() {
            acc.push(p.time, p.score);
        }
    }
    acc.finish()
}

/// Reindex every run onto `axis` with interpolation, then average per time.
///
/// A run ending early contributes its last score to later times. Times
/// before every run's first observation are left out of the result.
pub fn interpolated_mean<'a, I>(axis: &[i64], series: I) -> ScoreSeries
where
    I: IntoIterator<Item = &'a ScoreSeries>,
{
    let mut acc = MeanAccumulator::default();
    for s in series {
        for (&time, value) in axis.iter().zip(s.reindex(axis)) {
            if let Some(score) = value {
                acc.push(time, score);
            }
        }
    }
    acc.finish()
}
