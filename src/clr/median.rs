//! Median clr values across ALDEx2 Monte-Carlo instances.

use crate::aldex::{AldexRoutine, McSamples};
use crate::align::align_samples;
use crate::data::{group_sizes, CountMatrix, Metadata};
use crate::error::{DaaError, Result};
use crate::filter::drop_zero_features;
use log::{debug, info};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// A transformed matrix with metadata about the transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformedMatrix {
    /// The transformed data (features × samples).
    #[serde(skip)]
    pub data: DMatrix<f64>,
    /// Feature identifiers.
    pub feature_ids: Vec<String>,
    /// Sample identifiers.
    pub sample_ids: Vec<String>,
    /// Name of the transformation applied.
    pub transformation: String,
    /// Number of Monte-Carlo instances aggregated.
    pub n_instances: usize,
}

impl TransformedMatrix {
    /// Get the transformed value for a feature and sample.
    pub fn get(&self, feature: usize, sample: usize) -> f64 {
        self.data[(feature, sample)]
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Get reference to the underlying matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }
}

/// Median of a slice; the mean of the two middle values for even lengths.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Element-wise median across equally shaped matrices.
///
/// The result does not depend on the order of `instances`.
pub fn median_of_instances(instances: &[DMatrix<f64>]) -> Result<DMatrix<f64>> {
    let first = instances.first().ok_or_else(|| {
        DaaError::EmptyData("No Monte-Carlo instances to aggregate".to_string())
    })?;
    let (nrows, ncols) = first.shape();
    for m in instances {
        if m.nrows() != nrows {
            return Err(DaaError::DimensionMismatch {
                expected: nrows,
                actual: m.nrows(),
            });
        }
        if m.ncols() != ncols {
            return Err(DaaError::DimensionMismatch {
                expected: ncols,
                actual: m.ncols(),
            });
        }
    }

    let mut buffer = vec![0.0; instances.len()];
    Ok(DMatrix::from_fn(nrows, ncols, |i, j| {
        for (slot, m) in buffer.iter_mut().zip(instances) {
            *slot = m[(i, j)];
        }
        median(&mut buffer)
    }))
}

/// Stabilized clr matrix: the element-wise median over Monte-Carlo instances.
///
/// Counts are aligned to the metadata (first column as conditions) and
/// all-zero features are dropped before ALDEx2 is called once per entry of
/// `instances` (0-based). `None` uses every instance `0..mc_samples`.
pub fn extract_median_clr<R: AldexRoutine + ?Sized>(
    routine: &mut R,
    counts: &CountMatrix,
    metadata: &Metadata,
    mc_samples: McSamples,
    instances: Option<&[usize]>,
) -> Result<TransformedMatrix> {
    extract_median_clr_with(routine, counts, metadata, None, mc_samples, instances)
}

/// [`extract_median_clr`] with an explicit metadata label column.
pub fn extract_median_clr_with<R: AldexRoutine + ?Sized>(
    routine: &mut R,
    counts: &CountMatrix,
    metadata: &Metadata,
    group_column: Option<&str>,
    mc_samples: McSamples,
    instances: Option<&[usize]>,
) -> Result<TransformedMatrix> {
    let aligned = align_samples(counts, metadata, group_column)?;
    let (counts, filtered) = drop_zero_features(&aligned.counts)?;
    debug!("{}", filtered);
    let mc_samples = mc_samples.resolve(&group_sizes(&aligned.conditions))?;

    let all: Vec<usize>;
    let instances = match instances {
        Some(list) => list,
        None => {
            all = (0..mc_samples).collect();
            &all
        }
    };
    if instances.is_empty() {
        return Err(DaaError::InvalidParameter(
            "At least one Monte-Carlo instance is required".to_string(),
        ));
    }
    if let Some(&bad) = instances.iter().find(|&&i| i >= mc_samples) {
        return Err(DaaError::InvalidParameter(format!(
            "Monte-Carlo instance {} out of range for {} samples",
            bad, mc_samples
        )));
    }

    info!(
        "Extracting clr values from {} of {} Monte-Carlo instances",
        instances.len(),
        mc_samples
    );
    let mut tables = Vec::with_capacity(instances.len());
    for &instance in instances {
        let table = routine.clr_instance(&counts, &aligned.conditions, mc_samples, instance)?;
        if table.shape() != (counts.n_features(), counts.n_samples()) {
            return Err(DaaError::DimensionMismatch {
                expected: counts.n_features() * counts.n_samples(),
                actual: table.nrows() * table.ncols(),
            });
        }
        tables.push(table);
    }

    Ok(TransformedMatrix {
        data: median_of_instances(&tables)?,
        feature_ids: counts.feature_ids().to_vec(),
        sample_ids: counts.sample_ids().to_vec(),
        transformation: "median-CLR".to_string(),
        n_instances: tables.len(),
    })
}
