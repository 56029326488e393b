//! Removal of features that are zero in every sample.

use crate::data::CountMatrix;
use crate::error::{DaaError, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// Result of feature filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResult {
    /// Number of features before filtering.
    pub n_before: usize,
    /// Number of features after filtering.
    pub n_after: usize,
    /// Number of features removed.
    pub n_removed: usize,
    /// Proportion of features retained.
    pub retention_rate: f64,
}

impl std::fmt::Display for FilterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Filter Result")?;
        writeln!(f, "  Before:    {} features", self.n_before)?;
        writeln!(f, "  After:     {} features", self.n_after)?;
        writeln!(f, "  Removed:   {} features", self.n_removed)?;
        writeln!(f, "  Retained:  {:.1}%", self.retention_rate * 100.0)?;
        Ok(())
    }
}

/// Drop features whose counts sum to zero.
///
/// ALDEx2 discards these rows itself before the CLR step, so they are
/// removed up front to keep feature identifiers in step with its output.
pub fn drop_zero_features(counts: &CountMatrix) -> Result<(CountMatrix, FilterResult)> {
    let keep_indices: Vec<usize> = counts
        .row_sums()
        .iter()
        .enumerate()
        .filter(|(_, &total)| total > 0)
        .map(|(row, _)| row)
        .collect();

    if keep_indices.is_empty() {
        return Err(DaaError::EmptyData(
            "All features have zero counts".to_string(),
        ));
    }

    let n_before = counts.n_features();
    let n_after = keep_indices.len();
    if n_after < n_before {
        warn!("Dropping {} all-zero features", n_before - n_after);
    }

    let filtered = counts.subset_features(&keep_indices)?;
    Ok((
        filtered,
        FilterResult {
            n_before,
            n_after,
            n_removed: n_before - n_after,
            retention_rate: n_after as f64 / n_before as f64,
        },
    ))
}
