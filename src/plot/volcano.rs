//! Volcano plot: `-log10(p)` against log-fold-change.

use crate::data::result::DIFF_BTW;
use crate::data::AldexResult;
use crate::error::Result;
use crate::plot::{render_scatter, symmetric_limit, Bucket, Figure, PlotOptions, Scatter, HIGHLIGHT, MUTED};

/// Legend label of points passing both thresholds.
pub const SIGNIFICANT: &str = "significant";
/// Legend label of the remaining points.
pub const NOT_SIGNIFICANT: &str = "not significant";

/// `-log10(p)`, with `p` clamped away from zero so the result stays finite.
pub fn neg_log10(p: f64) -> f64 {
    -p.max(f64::MIN_POSITIVE).log10()
}

/// Whether a feature passes both the p-value and the fold-change threshold.
pub fn is_significant(p: f64, lfc: f64, alpha: f64, lfc_threshold: f64) -> bool {
    p < alpha && lfc.abs() >= lfc_threshold
}

/// Render the volcano plot of an ALDEx2 result.
///
/// Uses `diff.btw` as log-fold-change and `options.p_value_column` as
/// p-value. Threshold guides are drawn at `-log10(alpha)` and
/// `±lfc_threshold`; the x axis is symmetric around zero.
pub fn volcano_plot(result: &AldexResult, options: &PlotOptions) -> Result<Figure> {
    options.validate()?;
    render_scatter(volcano_scatter(result, options)?, options.width, options.height)
}

pub(crate) fn volcano_scatter(result: &AldexResult, options: &PlotOptions) -> Result<Scatter> {
    let lfc = result.require_column(DIFF_BTW)?;
    let p_values = result.require_column(&options.p_value_column)?;

    let mut significant = Vec::new();
    let mut rest = Vec::new();
    for (&x, &p) in lfc.iter().zip(p_values) {
        if !(x.is_finite() && p.is_finite()) {
            continue;
        }
        let point = (x, neg_log10(p));
        if is_significant(p, x, options.alpha, options.lfc_threshold) {
            significant.push(point);
        } else {
            rest.push(point);
        }
    }

    let x_limit = symmetric_limit(lfc.iter().copied(), options.lfc_threshold);
    let alpha_line = neg_log10(options.alpha);
    // -log10 of a positive f64 is at most ~308, so y_max is always finite
    let y_max = significant
        .iter()
        .chain(&rest)
        .map(|&(_, y)| y)
        .fold(alpha_line, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    Ok(Scatter {
        title: "Volcano plot".to_string(),
        x_desc: "median log2 difference".to_string(),
        y_desc: format!("-log10({})", options.p_value_column),
        x_range: (-x_limit, x_limit),
        y_range: (0.0, y_max),
        buckets: vec![
            Bucket {
                label: NOT_SIGNIFICANT.to_string(),
                color: MUTED,
                points: rest,
            },
            Bucket {
                label: SIGNIFICANT.to_string(),
                color: HIGHLIGHT,
                points: significant,
            },
        ],
        guides: vec![
            [(-x_limit, alpha_line), (x_limit, alpha_line)],
            [(-options.lfc_threshold, 0.0), (-options.lfc_threshold, y_max)],
            [(options.lfc_threshold, 0.0), (options.lfc_threshold, y_max)],
        ],
    })
}
