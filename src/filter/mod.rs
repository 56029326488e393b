//! Filtering primitives for count matrices.

pub mod zero;

pub use zero::{drop_zero_features, FilterResult};
