//! ALDEx2 bridge for compositional differential abundance analysis.
//!
//! This library prepares count tables for ALDEx2, calls it, reads its
//! result table back, and draws the usual diagnostic plots. The statistics
//! themselves stay inside ALDEx2, which is reached through the
//! [`aldex::AldexRoutine`] trait (by default via `Rscript`).
//!
//! # Overview
//!
//! - **data**: Core data structures (CountMatrix, Metadata, AldexResult)
//! - **align**: Orientation correction and sample alignment
//! - **filter**: Removal of all-zero features
//! - **aldex**: Test selection, Monte-Carlo sizing and the ALDEx2 adapter
//! - **clr**: Median clr values across Monte-Carlo instances
//! - **plot**: MA and volcano plots
//! - **config**: YAML run configuration
//!
//! # Example
//!
//! ```no_run
//! use aldex_bridge::prelude::*;
//!
//! let counts = CountMatrix::from_tsv("counts.tsv").unwrap();
//! let metadata = Metadata::from_tsv("metadata.tsv").unwrap();
//!
//! let mut routine = RscriptRoutine::new("run_aldex.R");
//! let result = run_aldex(&mut routine, &counts, &metadata, AldexTest::T, McSamples::Auto).unwrap();
//!
//! let options = PlotOptions::default();
//! ma_plot(&result, &options).unwrap().save("ma.svg").unwrap();
//! volcano_plot(&result, &options).unwrap().save("volcano.svg").unwrap();
//! ```

pub mod aldex;
pub mod align;
pub mod clr;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod plot;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::aldex::{
        run_aldex, Aldex, AldexRoutine, AldexTest, McSamples, RoutineScript, RscriptRoutine,
    };
    pub use crate::align::{align_samples, AlignedInput};
    pub use crate::clr::{extract_median_clr, median_of_instances, TransformedMatrix};
    pub use crate::config::AldexConfig;
    pub use crate::data::{AldexResult, CountMatrix, Metadata, ResultColumn, ResultSummary};
    pub use crate::error::{DaaError, Result};
    pub use crate::filter::{drop_zero_features, FilterResult};
    pub use crate::plot::{ma_plot, volcano_plot, Figure, PlotOptions};
}
