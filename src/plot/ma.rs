//! MA plot: median clr abundance against median between-group difference.

use crate::data::result::{DIFF_BTW, EFFECT, RAB_ALL};
use crate::data::AldexResult;
use crate::error::Result;
use crate::plot::{padded_range, render_scatter, Bucket, Figure, PlotOptions, Scatter, HIGHLIGHT, MUTED};

/// Legend label of points at or above the effect threshold.
pub const HIGH_EFFECT: &str = "high effect";
/// Legend label of points below the effect threshold.
pub const LOW_EFFECT: &str = "low effect";

/// Whether an effect size reaches the highlight threshold. `NaN` never does.
pub fn is_high_effect(effect: f64, threshold: f64) -> bool {
    effect.abs() >= threshold
}

/// Render the MA plot of an ALDEx2 result.
///
/// Requires the `rab.all`, `diff.btw` and `effect` columns. Points are
/// colored by `|effect| >= options.effect_threshold`; rows with a non-finite
/// coordinate are left out.
pub fn ma_plot(result: &AldexResult, options: &PlotOptions) -> Result<Figure> {
    options.validate()?;
    render_scatter(ma_scatter(result, options)?, options.width, options.height)
}

pub(crate) fn ma_scatter(result: &AldexResult, options: &PlotOptions) -> Result<Scatter> {
    let abundance = result.require_column(RAB_ALL)?;
    let difference = result.require_column(DIFF_BTW)?;
    let effect = result.require_column(EFFECT)?;

    let mut high = Vec::new();
    let mut low = Vec::new();
    for ((&x, &y), &e) in abundance.iter().zip(difference).zip(effect) {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        if is_high_effect(e, options.effect_threshold) {
            high.push((x, y));
        } else {
            low.push((x, y));
        }
    }

    let x_range = padded_range(abundance.iter().copied());
    let y_range = padded_range(difference.iter().copied().chain([0.0]));

    Ok(Scatter {
        title: "MA plot".to_string(),
        x_desc: "median log2 relative abundance".to_string(),
        y_desc: "median log2 difference".to_string(),
        x_range,
        y_range,
        buckets: vec![
            Bucket {
                label: LOW_EFFECT.to_string(),
                color: MUTED,
                points: low,
            },
            Bucket {
                label: HIGH_EFFECT.to_string(),
                color: HIGHLIGHT,
                points: high,
            },
        ],
        guides: vec![[(x_range.0, 0.0), (x_range.1, 0.0)]],
    })
}
