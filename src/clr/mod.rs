//! CLR extraction from ALDEx2 Monte-Carlo instances.

pub mod median;

pub use median::{extract_median_clr, extract_median_clr_with, median_of_instances, TransformedMatrix};
