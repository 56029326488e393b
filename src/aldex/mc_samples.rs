//! Monte-Carlo sample count selection.

use crate::error::{DaaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Total Dirichlet instances the smallest group should receive.
///
/// ALDEx2 recommends roughly 1000 instances per group; `Auto` divides this
/// budget by the size of the smallest group.
pub const INSTANCES_PER_GROUP: usize = 1000;

/// Number of Monte-Carlo instances to draw per sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "McSamplesRepr", into = "McSamplesRepr")]
pub enum McSamples {
    /// `floor(1000 / smallest_group_size)`.
    #[default]
    Auto,
    /// An explicit count, used unchanged.
    Fixed(usize),
}

impl McSamples {
    /// Resolve to a concrete count given the number of samples in each group.
    pub fn resolve(&self, group_sizes: &BTreeMap<String, usize>) -> Result<usize> {
        let n = match *self {
            Self::Fixed(n) => n,
            Self::Auto => {
                let smallest = group_sizes.values().copied().min().ok_or_else(|| {
                    DaaError::EmptyData("No condition groups to size Monte-Carlo samples".to_string())
                })?;
                INSTANCES_PER_GROUP / smallest
            }
        };
        if n == 0 {
            return Err(DaaError::InvalidParameter(
                "Monte-Carlo sample count resolved to 0".to_string(),
            ));
        }
        Ok(n)
    }
}

impl fmt::Display for McSamples {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for McSamples {
    type Err = DaaError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<usize>().map(Self::Fixed).map_err(|_| {
            DaaError::InvalidParameter(format!(
                "Monte-Carlo samples must be 'auto' or a positive integer, got '{}'",
                s
            ))
        })
    }
}

/// Serialized form: either an integer or the keyword `auto`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum McSamplesRepr {
    Count(usize),
    Keyword(String),
}

impl TryFrom<McSamplesRepr> for McSamples {
    type Error = DaaError;

    fn try_from(repr: McSamplesRepr) -> Result<Self> {
        match repr {
            McSamplesRepr::Count(n) => Ok(Self::Fixed(n)),
            McSamplesRepr::Keyword(s) => s.parse(),
        }
    }
}

impl From<McSamples> for McSamplesRepr {
    fn from(mc: McSamples) -> Self {
        match mc {
            McSamples::Auto => Self::Keyword("auto".to_string()),
            McSamples::Fixed(n) => Self::Count(n),
        }
    }
}
