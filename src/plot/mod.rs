//! Diagnostic plots for ALDEx2 results.
//!
//! - **ma**: abundance (`rab.all`) against between-group difference (`diff.btw`)
//! - **volcano**: `-log10(p)` against log-fold-change
//!
//! Both render to SVG text and leave persistence to the caller.

pub mod ma;
pub mod volcano;

pub use ma::ma_plot;
pub use volcano::volcano_plot;

use crate::error::{DaaError, Result};
use crate::data::result::WE_EBH;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Thresholds and canvas size shared by both plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// MA plot: points with `|effect| >= effect_threshold` are highlighted.
    pub effect_threshold: f64,
    /// Volcano plot: vertical guides at `±lfc_threshold`.
    pub lfc_threshold: f64,
    /// Volcano plot: horizontal guide at `-log10(alpha)`.
    pub alpha: f64,
    /// Volcano plot: column holding the (corrected) p-values.
    pub p_value_column: String,
    pub width: u32,
    pub height: u32,
}

impl PlotOptions {
    /// Reject thresholds and sizes no chart can be drawn with.
    pub fn validate(&self) -> Result<()> {
        if !(self.effect_threshold.is_finite() && self.effect_threshold >= 0.0) {
            return Err(DaaError::InvalidParameter(format!(
                "effect_threshold must be finite and non-negative, got {}",
                self.effect_threshold
            )));
        }
        if !(self.lfc_threshold.is_finite() && self.lfc_threshold >= 0.0) {
            return Err(DaaError::InvalidParameter(format!(
                "lfc_threshold must be finite and non-negative, got {}",
                self.lfc_threshold
            )));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(DaaError::InvalidParameter(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(DaaError::InvalidParameter(format!(
                "Canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            effect_threshold: 1.0,
            lfc_threshold: 1.0,
            alpha: 0.05,
            p_value_column: WE_EBH.to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// A rendered chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    pub title: String,
    /// SVG document.
    pub svg: String,
}

impl Figure {
    /// Write the SVG document to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, &self.svg)?;
        Ok(())
    }
}

/// A group of points drawn in one color with one legend entry.
pub(crate) struct Bucket {
    pub label: String,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

/// Everything [`render_scatter`] needs to draw a chart.
pub(crate) struct Scatter {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub buckets: Vec<Bucket>,
    /// Straight reference lines, each given by its two end points.
    pub guides: Vec<[(f64, f64); 2]>,
}

pub(crate) const HIGHLIGHT: RGBColor = RGBColor(200, 40, 40);
pub(crate) const MUTED: RGBColor = RGBColor(150, 150, 150);

/// Largest axis magnitude handed to plotters. Beyond this the span of a
/// symmetric axis is no longer a finite `f64`.
pub(crate) const AXIS_LIMIT: f64 = 1e300;

fn check_axis(name: &str, (lo, hi): (f64, f64)) -> Result<()> {
    if lo.is_finite() && hi.is_finite() && lo < hi && (hi - lo).is_finite() {
        Ok(())
    } else {
        Err(DaaError::Plot(format!(
            "Cannot draw {} axis over {}..{}",
            name, lo, hi
        )))
    }
}

fn plot_error<E: std::fmt::Display>(e: E) -> DaaError {
    DaaError::Plot(e.to_string())
}

/// Draw a scatter chart into an SVG string.
///
/// Empty buckets are skipped; the legend is only drawn when more than one
/// bucket has points.
pub(crate) fn render_scatter(scatter: Scatter, width: u32, height: u32) -> Result<Figure> {
    check_axis("x", scatter.x_range)?;
    check_axis("y", scatter.y_range)?;
    let (x0, x1) = scatter.x_range;
    let (y0, y1) = scatter.y_range;
    let populated: Vec<&Bucket> = scatter
        .buckets
        .iter()
        .filter(|b| !b.points.is_empty())
        .collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&scatter.title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .x_desc(scatter.x_desc.as_str())
            .y_desc(scatter.y_desc.as_str())
            .draw()
            .map_err(plot_error)?;

        for guide in &scatter.guides {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    guide.to_vec(),
                    BLACK.mix(0.4),
                )))
                .map_err(plot_error)?;
        }

        for bucket in &populated {
            let color = bucket.color;
            chart
                .draw_series(
                    bucket
                        .points
                        .iter()
                        .map(|&p| Circle::new(p, 3, color.mix(0.7).filled())),
                )
                .map_err(plot_error)?
                .label(bucket.label.clone())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }

        if populated.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(plot_error)?;
        }

        root.present().map_err(plot_error)?;
    }

    Ok(Figure {
        title: scatter.title,
        svg,
    })
}

/// Data range of the finite values, padded by 5% on both sides.
///
/// Falls back to `-1..1` without finite values, widens a degenerate range
/// and clamps to `±AXIS_LIMIT`.
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(-AXIS_LIMIT, AXIS_LIMIT))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (-1.0, 1.0);
    }
    if hi - lo < f64::EPSILON {
        let half = (lo.abs() * 0.05).max(1.0);
        return (lo - half, hi + half);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Half-width of an axis centred on zero that holds every finite value and
/// `floor`, capped at `1.1 * AXIS_LIMIT`.
pub(crate) fn symmetric_limit(values: impl IntoIterator<Item = f64>, floor: f64) -> f64 {
    let max_abs = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(floor.abs(), |acc, v| acc.max(v.abs()))
        .min(AXIS_LIMIT);
    if max_abs > 0.0 {
        max_abs * 1.1
    } else {
        1.0
    }
}
