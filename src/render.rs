//! Chart rendering (plotters)
//!
//! Draws a [`ScoreTable`] as one line per group, x = training step,
//! y = metric value, with gridlines. Optional overlays:
//!
//! - a flat reference score (horizontal line in `C0`, first legend entry)
//! - black vertical/horizontal marker lines labelled with their exact value
//!
//! The chart is always rasterised into an in-memory RGB buffer that is
//! returned to the caller. When a file name is set it is also written to
//! `<file_dir>/<file>.png`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::scorer::FlatScore;
use crate::table::ScoreTable;
use crate::{Error, Result};

/// matplotlib "tab10" color cycle (`C0`..`C9`).
const TAB10: [(u8, u8, u8); 10] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
    (188, 189, 34),
    (23, 190, 207),
];

/// Chart line color: a cycle slot (`C3`) or an explicit `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChartColor {
    /// Index into the tab10 cycle, wrapping past 9
    Cycle(usize),
    /// Explicit RGB
    Rgb(u8, u8, u8),
}

impl ChartColor {
    /// Resolve to a plotters color.
    #[must_use]
    pub const fn rgb(self) -> RGBColor {
        match self {
            Self::Cycle(i) => {
                let (r, g, b) = TAB10[i % TAB10.len()];
                RGBColor(r, g, b)
            }
            Self::Rgb(r, g, b) => RGBColor(r, g, b),
        }
    }
}

impl FromStr for ChartColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(s.to_string());
        if let Some(index) = s.strip_prefix('C') {
            return index.parse().map(Self::Cycle).map_err(|_| invalid());
        }
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for ChartColor {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ChartColor> for String {
    fn from(color: ChartColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for ChartColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle(i) => write!(f, "C{i}"),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

/// Chart options.
///
/// ## Example
///
/// ```rust
/// use run_scorer::render::PlotOptions;
///
/// let options = PlotOptions::new("TrueSkill")
///     .step_limit(5_000)
///     .x_line(2_500.0)
///     .file("trueskill")
///     .file_dir("out");
///
/// assert_eq!(options.output_path(), Some("out/trueskill.png".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Chart caption
    pub title: String,
    /// Drop points with a later time
    pub step_limit: Option<i64>,
    /// Per-group colors; groups without an entry use the default cycle
    pub colors: Option<BTreeMap<String, ChartColor>>,
    /// Vertical marker line
    pub x_line: Option<f64>,
    /// Horizontal marker line
    pub y_line: Option<f64>,
    /// PNG file stem; nothing is written when unset
    pub file: Option<String>,
    /// Directory for the PNG
    pub file_dir: PathBuf,
    /// Width and height in pixels
    pub size: (u32, u32),
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            step_limit: None,
            colors: None,
            x_line: None,
            y_line: None,
            file: None,
            file_dir: PathBuf::from("plots"),
            size: (1024, 768),
        }
    }
}

impl PlotOptions {
    /// Create options with a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the step limit.
    #[must_use]
    pub const fn step_limit(mut self, limit: i64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Set the color of one group.
    #[must_use]
    pub fn color(mut self, group: impl Into<String>, color: ChartColor) -> Self {
        self.colors
            .get_or_insert_with(BTreeMap::new)
            .insert(group.into(), color);
        self
    }

    /// Set the vertical marker line.
    #[must_use]
    pub const fn x_line(mut self, x: f64) -> Self {
        self.x_line = Some(x);
        self
    }

    /// Set the horizontal marker line.
    #[must_use]
    pub const fn y_line(mut self, y: f64) -> Self {
        self.y_line = Some(y);
        self
    }

    /// Save the chart as `<file_dir>/<file>.png`.
    #[must_use]
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn file_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file_dir = dir.into();
        self
    }

    /// Set the image size in pixels.
    #[must_use]
    pub const fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// PNG path, if a file name is set.
    #[must_use]
    pub fn output_path(&self) -> Option<PathBuf> {
        self.file
            .as_ref()
            .map(|file| self.file_dir.join(format!("{file}.png")))
    }
}

/// Rendered chart: RGB pixels plus the PNG path when one was written.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGB8 pixels
    pub pixels: Vec<u8>,
    /// Saved PNG
    pub path: Option<PathBuf>,
}

/// One group's line, split into continuous segments.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLine {
    /// Group name (legend label)
    pub name: String,
    /// Line color
    pub color: ChartColor,
    /// Continuous runs of `(time, score)`; a gap starts a new segment
    pub segments: Vec<Vec<(f64, f64)>>,
}

/// Everything needed to draw, resolved from the table and options.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    /// Caption
    pub title: String,
    /// y axis description
    pub y_desc: String,
    /// One line per group, in group order
    pub lines: Vec<GroupLine>,
    /// Flat reference score
    pub flat: Option<FlatScore>,
    /// Vertical marker
    pub x_line: Option<f64>,
    /// Horizontal marker
    pub y_line: Option<f64>,
    /// x axis range
    pub x_range: (f64, f64),
    /// y axis range
    pub y_range: (f64, f64),
    /// Whether the legend is drawn
    pub show_legend: bool,
}

impl ChartLayout {
    /// Resolve colors, segments and axis ranges.
    ///
    /// Rows after the step limit are skipped even if the table still has
    /// them.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(
        table: &ScoreTable,
        metric: &str,
        flat: Option<&FlatScore>,
        options: &PlotOptions,
    ) -> Self {
        let lines: Vec<GroupLine> = table
            .groups()
            .into_iter()
            .enumerate()
            .map(|(i, group)| {
                let color = options
                    .colors
                    .as_ref()
                    .and_then(|colors| colors.get(group).copied())
                    .unwrap_or(ChartColor::Cycle(i + 1));

                let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
                for (time, value) in table.rows(group).unwrap_or_default() {
                    if options.step_limit.is_some_and(|limit| time > limit) {
                        break;
                    }
                    match value {
                        Some(score) => {
                            if let Some(segment) = segments.last_mut() {
                                segment.push((time as f64, score));
                            }
                        }
                        None if segments.last().is_some_and(|s| !s.is_empty()) => {
                            segments.push(Vec::new());
                        }
                        None => {}
                    }
                }
                segments.retain(|s| !s.is_empty());

                GroupLine {
                    name: group.to_string(),
                    color,
                    segments,
                }
            })
            .collect();

        let points = || lines.iter().flat_map(|l| l.segments.iter().flatten());
        let xs = points().map(|&(x, _)| x).chain(options.x_line);
        let ys = points()
            .map(|&(_, y)| y)
            .chain(flat.map(|f| f.score))
            .chain(options.y_line);

        Self {
            title: options.title.clone(),
            y_desc: format!("{metric} metric"),
            flat: flat.cloned(),
            x_line: options.x_line,
            y_line: options.y_line,
            x_range: padded_range(xs, 0.0),
            y_range: padded_range(ys, 0.05),
            show_legend: flat.is_some() || lines.len() > 1,
            lines,
        }
    }
}

/// Min/max of `values` widened by `margin` of the span.
///
/// Degenerate ranges are widened by one unit each side.
fn padded_range(values: impl Iterator<Item = f64>, margin: f64) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span == 0.0 {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * margin, hi + span * margin)
}

fn plot_error(e: impl fmt::Display) -> Error {
    Error::Plot(e.to_string())
}

fn value_label(v: f64) -> String {
    format!("{v}")
}

/// Draw the chart into memory and, if configured, save it as PNG.
///
/// # Errors
///
/// Returns error if the output directory cannot be created or the plotting
/// backend fails (for example when no font is available).
pub fn render_chart(
    table: &ScoreTable,
    metric: &str,
    flat: Option<&FlatScore>,
    options: &PlotOptions,
) -> Result<RenderedChart> {
    let layout = ChartLayout::build(table, metric, flat, options);
    let (width, height) = options.size;

    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        draw(&root, &layout)?;
    }

    let path = match options.output_path() {
        Some(path) => {
            fs::create_dir_all(&options.file_dir)?;
            {
                let root = BitMapBackend::new(&path, (width, height)).into_drawing_area();
                draw(&root, &layout)?;
            }
            info!(path = %path.display(), "saved chart");
            Some(path)
        }
        None => None,
    };

    Ok(RenderedChart {
        width,
        height,
        pixels,
        path,
    })
}

fn draw<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, layout: &ChartLayout) -> Result<()> {
    root.fill(&WHITE).map_err(plot_error)?;

    let (x0, x1) = layout.x_range;
    let (y0, y1) = layout.y_range;
    let mut chart = ChartBuilder::on(root)
        .caption(&layout.title, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("training step")
        .y_desc(layout.y_desc.as_str())
        .draw()
        .map_err(plot_error)?;

    let label_font = ("sans-serif", 14).into_font();

    if let Some(flat) = &layout.flat {
        let color = ChartColor::Cycle(0).rgb();
        chart
            .draw_series(LineSeries::new(
                vec![(x0, flat.score), (x1, flat.score)],
                color.stroke_width(2),
            ))
            .map_err(plot_error)?
            .label(flat.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart
            .draw_series(std::iter::once(Text::new(
                value_label(flat.score),
                (x0, flat.score),
                label_font.clone(),
            )))
            .map_err(plot_error)?;
    }

    for line in &layout.lines {
        let color = line.color.rgb();
        for (i, segment) in line.segments.iter().enumerate() {
            let series = chart
                .draw_series(LineSeries::new(segment.iter().copied(), color.stroke_width(2)))
                .map_err(plot_error)?;
            if i == 0 {
                series
                    .label(line.name.as_str())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
            }
        }
    }

    if let Some(x) = layout.x_line {
        chart
            .draw_series(LineSeries::new(vec![(x, y0), (x, y1)], BLACK.stroke_width(1)))
            .map_err(plot_error)?;
        chart
            .draw_series(std::iter::once(Text::new(value_label(x), (x, y0), label_font.clone())))
            .map_err(plot_error)?;
    }

    if let Some(y) = layout.y_line {
        chart
            .draw_series(LineSeries::new(vec![(x0, y), (x1, y)], BLACK.stroke_width(1)))
            .map_err(plot_error)?;
        chart
            .draw_series(std::iter::once(Text::new(value_label(y), (x0, y), label_font.clone())))
            .map_err(plot_error)?;
    }

    if layout.show_legend {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)?;
    Ok(())
}
