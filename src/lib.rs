//! # run-scorer: grouped training-score comparison charts
//!
//! Loads per-checkpoint score CSVs for many training runs, averages runs
//! into groups on a shared time axis and draws one comparison line chart.
//!
//! ## Pipeline
//!
//! ```text
//! <root>/<directory>/<runs>/<experiment>/<time>.csv
//!         │  score::load_series        (one Score per experiment)
//!         ▼
//!     Scorer ── average_scores         (per-group mean, interpolated)
//!         │
//!         ▼
//!     ScoreTable (Arrow RecordBatch)   (outer join on time, gap check)
//!         │  render::render_chart
//!         ▼
//!     RenderedChart (+ <file_dir>/<file>.png)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use run_scorer::{PlotOptions, ScoreSource, Scorer};
//!
//! let source = ScoreSource::new().experiments_path("../experiments");
//!
//! let mut scorer = Scorer::new("trueskill");
//! scorer
//!     .add_many_scores(["ppo-1", "ppo-2"], "ppo", &source)?
//!     .add_many_scores(["a2c-1", "a2c-2"], "a2c", &source)?
//!     .add_flat_score(25.0, "scripted");
//!
//! let chart = scorer.draw_avg(&PlotOptions::new("TrueSkill").file("trueskill"))?;
//! println!("saved to {:?}", chart.path);
//! # Ok::<(), run_scorer::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod render;
pub mod score;
pub mod scorer;
pub mod series;
pub mod table;

pub use config::{GroupConfig, Report, ReportConfig, SourceConfig};
pub use error::{Error, Result};
pub use render::{ChartColor, PlotOptions, RenderedChart};
pub use score::{Score, ScoreSource};
pub use scorer::{Averaging, FlatScore, Scorer};
pub use series::{ScorePoint, ScoreSeries};
pub use table::ScoreTable;
