//! The external statistics routine seen from Rust.

use crate::data::{AldexResult, CountMatrix};
use crate::error::Result;
use crate::aldex::AldexTest;
use nalgebra::DMatrix;

/// An implementation of the ALDEx2 entry points.
///
/// The statistics happen entirely on the other side of this trait. Both
/// methods take `&mut self`: a routine handle wraps a runtime that is not
/// safe for concurrent reuse and belongs to one caller for the duration of
/// each call. Failures are returned as reported, without interpretation.
pub trait AldexRoutine {
    /// Run `aldex()` on features × samples counts with one condition per sample.
    fn run(
        &mut self,
        counts: &CountMatrix,
        conditions: &[String],
        mc_samples: usize,
        test: AldexTest,
    ) -> Result<AldexResult>;

    /// Run `aldex.clr()` and return the clr values of one Monte-Carlo
    /// instance (0-based) as a features × samples matrix.
    fn clr_instance(
        &mut self,
        counts: &CountMatrix,
        conditions: &[String],
        mc_samples: usize,
        instance: usize,
    ) -> Result<DMatrix<f64>>;
}
