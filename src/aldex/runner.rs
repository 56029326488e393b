//! Statistical adapter: align inputs, size the Monte-Carlo draw, call ALDEx2.

use crate::aldex::{AldexRoutine, AldexTest, McSamples};
use crate::align::align_samples;
use crate::clr::{extract_median_clr_with, TransformedMatrix};
use crate::config::AldexConfig;
use crate::data::{group_sizes, AldexResult, CountMatrix, Metadata};
use crate::error::Result;
use log::info;

/// Run ALDEx2 on raw counts, labelling samples by the first metadata column.
///
/// The counts are transposed if needed so that their columns line up with
/// the metadata rows; incompatible shapes fail with
/// [`crate::error::DaaError::DimensionMismatch`]. `McSamples::Auto` resolves
/// to `floor(1000 / smallest_group_size)`. Anything the routine itself
/// reports is returned unchanged.
pub fn run_aldex<R: AldexRoutine + ?Sized>(
    routine: &mut R,
    counts: &CountMatrix,
    metadata: &Metadata,
    test: AldexTest,
    mc_samples: McSamples,
) -> Result<AldexResult> {
    Aldex::new()
        .test(test)
        .mc_samples(mc_samples)
        .run(routine, counts, metadata)
}

/// Builder holding the options of an ALDEx2 call.
#[derive(Debug, Clone)]
pub struct Aldex {
    test: AldexTest,
    mc_samples: McSamples,
    group_column: Option<String>,
    clr_instances: Option<Vec<usize>>,
}

impl Default for Aldex {
    fn default() -> Self {
        Self::new()
    }
}

impl Aldex {
    /// Welch's t-test with automatically sized Monte-Carlo draws.
    pub fn new() -> Self {
        Self {
            test: AldexTest::T,
            mc_samples: McSamples::Auto,
            group_column: None,
            clr_instances: None,
        }
    }

    /// Create from a config.
    pub fn from_config(config: &AldexConfig) -> Self {
        Self {
            test: config.test,
            mc_samples: config.mc_samples,
            group_column: config.group_column.clone(),
            clr_instances: config.clr_instances.clone(),
        }
    }

    /// Select the statistical test.
    pub fn test(mut self, test: AldexTest) -> Self {
        self.test = test;
        self
    }

    /// Set the Monte-Carlo sample count.
    pub fn mc_samples(mut self, mc_samples: McSamples) -> Self {
        self.mc_samples = mc_samples;
        self
    }

    /// Use a metadata column other than the first one as conditions.
    pub fn group_column<S: Into<String>>(mut self, column: S) -> Self {
        self.group_column = Some(column.into());
        self
    }

    /// Monte-Carlo instances to aggregate in [`Aldex::clr`]; all by default.
    pub fn clr_instances(mut self, instances: Vec<usize>) -> Self {
        self.clr_instances = Some(instances);
        self
    }

    /// Run `aldex()` through `routine`.
    pub fn run<R: AldexRoutine + ?Sized>(
        &self,
        routine: &mut R,
        counts: &CountMatrix,
        metadata: &Metadata,
    ) -> Result<AldexResult> {
        let aligned = align_samples(counts, metadata, self.group_column.as_deref())?;
        let mc_samples = self.mc_samples.resolve(&group_sizes(&aligned.conditions))?;

        info!("Running ALDEx2 ({} test) with {} Monte-Carlo samples", self.test, mc_samples);
        let result = routine.run(&aligned.counts, &aligned.conditions, mc_samples, self.test)?;
        info!("Finished ALDEx2: {} features", result.len());

        Ok(result)
    }

    /// Median clr values across the configured Monte-Carlo instances.
    pub fn clr<R: AldexRoutine + ?Sized>(
        &self,
        routine: &mut R,
        counts: &CountMatrix,
        metadata: &Metadata,
    ) -> Result<TransformedMatrix> {
        extract_median_clr_with(
            routine,
            counts,
            metadata,
            self.group_column.as_deref(),
            self.mc_samples,
            self.clr_instances.as_deref(),
        )
    }
}
