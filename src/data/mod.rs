//! Data structures: counts, sample labels and the ALDEx2 result table.

mod count_matrix;
mod metadata;
pub mod result;

pub use count_matrix::CountMatrix;
pub use metadata::{group_sizes, Metadata};
pub use result::{AldexResult, ResultColumn, ResultSummary};
pub(crate) use result::read_numeric_tsv;
