//! Orientation correction and sample alignment between counts and metadata.

use crate::data::{CountMatrix, Metadata};
use crate::error::{DaaError, Result};
use log::debug;

/// Counts oriented features × samples, with conditions in count-column order.
#[derive(Debug, Clone)]
pub struct AlignedInput {
    /// Counts with samples as columns.
    pub counts: CountMatrix,
    /// One condition label per count column.
    pub conditions: Vec<String>,
    /// Whether the counts had to be transposed.
    pub transposed: bool,
}

/// Orient `counts` so its columns are samples and line the metadata up with them.
///
/// If the number of count columns differs from the number of metadata rows the
/// table is transposed. If the dimensions still disagree the inputs are
/// incompatible and [`DaaError::DimensionMismatch`] is returned; this is a
/// precondition failure, not something to recover from.
///
/// `column` selects the metadata label column (`None` for the first one).
pub fn align_samples(
    counts: &CountMatrix,
    metadata: &Metadata,
    column: Option<&str>,
) -> Result<AlignedInput> {
    let transposed = counts.n_samples() != metadata.n_samples();
    let counts = if transposed {
        debug!(
            "Transposing counts ({} x {}) to match {} metadata rows",
            counts.n_features(),
            counts.n_samples(),
            metadata.n_samples()
        );
        counts.transpose()?
    } else {
        counts.clone()
    };

    if counts.n_samples() != metadata.n_samples() {
        return Err(DaaError::DimensionMismatch {
            expected: metadata.n_samples(),
            actual: counts.n_samples(),
        });
    }

    let conditions = metadata
        .align_to(counts.sample_ids())?
        .labels(column)?;

    Ok(AlignedInput {
        counts,
        conditions,
        transposed,
    })
}
