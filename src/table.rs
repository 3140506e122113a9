//! Merged score table
//!
//! All group averages outer-joined on time into one wide Arrow
//! `RecordBatch`:
//!
//! ```text
//! time (Int64, non-null) | <group 1> (Float64, nullable) | <group 2> ...
//! ```
//!
//! Rows are sorted ascending by time. A null means the group has no value
//! at that time; [`ScoreTable::ensure_complete`] turns those into an error
//! before anything is plotted.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use tracing::debug;

use crate::series::{time_axis, ScoreSeries};
use crate::{Error, Result};

/// Name of the time column.
pub const TIME_COLUMN: &str = "time";

/// Wide table of group averages keyed by time.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    batch: RecordBatch,
}

impl ScoreTable {
    /// Outer-join group series on time.
    ///
    /// Points after `step_limit` are dropped first when a limit is given.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a group is named like the time column, or
    /// error if the Arrow batch cannot be assembled.
    pub fn merge<'a, I>(groups: I, step_limit: Option<i64>) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a ScoreSeries)>,
    {
        let groups: Vec<(&str, ScoreSeries)> = groups
            .into_iter()
            .map(|(name, series)| {
                if name == TIME_COLUMN {
                    return Err(Error::Config(format!(
                        "group name '{TIME_COLUMN}' is reserved for the time column"
                    )));
                }
                let series = match step_limit {
                    Some(limit) => series.truncated(limit),
                    None => series.clone(),
                };
                Ok((name, series))
            })
            .collect::<Result<_>>()?;

        let times = time_axis(groups.iter().map(|(_, s)| s));

        let mut fields = vec![Field::new(TIME_COLUMN, DataType::Int64, false)];
        let mut columns: Vec<ArrayRef> = vec![Arc::new(Int64Array::from(times.clone()))];
        for (name, series) in &groups {
            let values: Vec<Option<f64>> = times.iter().map(|&t| series.value_at(t)).collect();
            fields.push(Field::new(*name, DataType::Float64, true));
            columns.push(Arc::new(Float64Array::from(values)));
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        debug!(rows = batch.num_rows(), groups = groups.len(), "merged score table");
        Ok(Self { batch })
    }

    /// Get the underlying record batch.
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of time rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Group names in column order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .skip(1)
            .map(|f| f.name().as_str())
            .collect()
    }

    /// Time column.
    #[must_use]
    pub fn times(&self) -> &Int64Array {
        self.batch.column(0).as_primitive::<Int64Type>()
    }

    /// Score column for `group`.
    #[must_use]
    pub fn column(&self, group: &str) -> Option<&Float64Array> {
        let index = self.batch.schema_ref().index_of(group).ok()?;
        if index == 0 {
            return None;
        }
        Some(self.batch.column(index).as_primitive::<Float64Type>())
    }

    /// `(time, score)` rows of one group, `None` where the group has a gap.
    #[must_use]
    pub fn rows(&self, group: &str) -> Option<Vec<(i64, Option<f64>)>> {
        let column = self.column(group)?;
        Some(
            self.times()
                .values()
                .iter()
                .enumerate()
                .map(|(i, &t)| (t, column.is_valid(i).then(|| column.value(i))))
                .collect(),
        )
    }

    /// Fail if any group has a missing value.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingValues` naming the first group with nulls.
    pub fn ensure_complete(&self) -> Result<()> {
        for (field, column) in self
            .batch
            .schema_ref()
            .fields()
            .iter()
            .zip(self.batch.columns())
            .skip(1)
        {
            if column.null_count() > 0 {
                return Err(Error::MissingValues {
                    group: field.name().clone(),
                    missing: column.null_count(),
                });
            }
        }
        Ok(())
    }

    /// Write the table as CSV: `time,<group>...`, empty cells for gaps.
    ///
    /// # Errors
    ///
    /// Returns error if the file or its parent directory cannot be written.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec![TIME_COLUMN.to_string()];
        header.extend(self.groups().into_iter().map(str::to_string));
        writer.write_record(&header)?;

        let columns: Vec<&Float64Array> = self
            .batch
            .columns()
            .iter()
            .skip(1)
            .map(|c| c.as_primitive::<Float64Type>())
            .collect();

        for (row, time) in self.times().values().iter().enumerate() {
            let mut record = vec![time.to_string()];
            record.extend(columns.iter().map(|c| {
                if c.is_valid(row) {
                    c.value(row).to_string()
                } else {
                    String::new()
                }
            }));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), rows = self.num_rows(), "wrote score table");
        Ok(())
    }
}
