//! Error types for run-scorer
//!
//! Every failure aborts the current call. Messages name the file, group or
//! value involved so a broken report can be fixed without a debugger.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// run-scorer error types
#[derive(Error, Debug)]
pub enum Error {
    /// A score was added whose metric differs from the scorer's metric
    #[error("Metric mismatch: scorer tracks '{expected}', score for '{experiment}' uses '{found}'")]
    MetricMismatch {
        /// Metric configured on the scorer
        expected: String,
        /// Metric of the rejected score
        found: String,
        /// Experiment the rejected score belongs to
        experiment: String,
    },

    /// No row in a checkpoint CSV names the expected model
    #[error("No row for model '{model}' in {}", .file.display())]
    MissingModelRow {
        /// Model key searched for (`models/<experiment>/<time>.pt`)
        model: String,
        /// Checkpoint file that was searched
        file: PathBuf,
    },

    /// A checkpoint CSV lacks a required column
    #[error("Column '{column}' not found in {}", .file.display())]
    MissingColumn {
        /// Missing column name
        column: String,
        /// Offending checkpoint file
        file: PathBuf,
    },

    /// Checkpoint file name is not an integer training step
    #[error("Invalid checkpoint file name: {}\nExpected '<time>.csv' with an integer time", .0.display())]
    InvalidCheckpoint(PathBuf),

    /// Two checkpoint files map to the same training step
    #[error("Duplicate checkpoint time {time} in {}", .dir.display())]
    DuplicateCheckpoint {
        /// Repeated training step
        time: i64,
        /// Experiment directory
        dir: PathBuf,
    },

    /// Metric cell could not be parsed as a number
    #[error("Invalid score '{value}' for model '{model}' in {}", .file.display())]
    InvalidScore {
        /// Raw cell content
        value: String,
        /// Model key of the row
        model: String,
        /// Checkpoint file
        file: PathBuf,
    },

    /// Averaging or drawing was requested without any scores
    #[error("No scores added: nothing to average")]
    NoScores,

    /// Merged table still has gaps after averaging
    #[error("Missing values in scores detected for group '{group}' ({missing} rows). Probably interpolation failed.")]
    MissingValues {
        /// First group with a gap
        group: String,
        /// Number of null rows in that group
        missing: usize,
    },

    /// Unrecognised chart color specification
    #[error("Invalid color '{0}': expected C0..C9 or #rrggbb")]
    InvalidColor(String),

    /// Plotting backend failure
    #[error("Plot error: {0}")]
    Plot(String),

    /// Report manifest is inconsistent
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON manifest error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
