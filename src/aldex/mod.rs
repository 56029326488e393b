//! ALDEx2 adapter.
//!
//! - **test_kind**: the tests ALDEx2 can run
//! - **mc_samples**: Monte-Carlo sample count, explicit or derived from group sizes
//! - **routine**: the [`AldexRoutine`] trait the external library sits behind
//! - **rscript**: an `Rscript`-backed routine
//! - **runner**: [`run_aldex`] and the [`Aldex`] builder

pub mod mc_samples;
pub mod routine;
pub mod rscript;
pub mod runner;
pub mod test_kind;

pub use mc_samples::{McSamples, INSTANCES_PER_GROUP};
pub use routine::AldexRoutine;
pub use rscript::{RoutineScript, RscriptRoutine, BUNDLED_SCRIPT, RSCRIPT_ENV};
pub use runner::{run_aldex, Aldex};
pub use test_kind::AldexTest;
