//! Statistical tests ALDEx2 can run.

use crate::error::DaaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Test selector passed to `aldex(..., test = ...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AldexTest {
    /// Welch's t-test together with the non-parametric Wilcoxon test.
    #[serde(rename = "t")]
    T,
    /// Kruskal-Wallis test together with a glm test.
    #[serde(rename = "kw")]
    Kw,
    /// Generalized linear model built with `model.matrix`.
    #[serde(rename = "glm")]
    Glm,
    /// Correlation test using `cor.test`.
    #[serde(rename = "corr")]
    Corr,
}

impl AldexTest {
    /// Name understood by ALDEx2.
    pub fn r_name(&self) -> &'static str {
        match self {
            Self::T => "t",
            Self::Kw => "kw",
            Self::Glm => "glm",
            Self::Corr => "corr",
        }
    }
}

impl fmt::Display for AldexTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.r_name())
    }
}

impl FromStr for AldexTest {
    type Err = DaaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "t" => Ok(Self::T),
            "kw" => Ok(Self::Kw),
            "glm" => Ok(Self::Glm),
            "corr" => Ok(Self::Corr),
            other => Err(DaaError::InvalidParameter(format!(
                "Unknown ALDEx2 test '{}' (expected one of t, kw, glm, corr)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for test in [AldexTest::T, AldexTest::Kw, AldexTest::Glm, AldexTest::Corr] {
            assert_eq!(test.to_string().parse::<AldexTest>().unwrap(), test);
        }
        assert!("wilcoxon".parse::<AldexTest>().is_err());
    }

    #[test]
    fn test_yaml_names() {
        let test: AldexTest = serde_yaml::from_str("kw").unwrap();
        assert_eq!(test, AldexTest::Kw);
        assert_eq!(serde_yaml::to_string(&AldexTest::Corr).unwrap().trim(), "corr");
    }
}
