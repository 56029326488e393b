//! YAML configuration for an ALDEx2 run and its plots.

use crate::aldex::{AldexTest, McSamples, RscriptRoutine};
use crate::error::{DaaError, Result};
use crate::plot::PlotOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Run configuration.
///
/// ```yaml
/// test: kw
/// mc_samples: auto
/// group_column: diagnosis
/// script: scripts/run_aldex.R
/// plot:
///   alpha: 0.1
///   p_value_column: kw.eBH
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AldexConfig {
    #[serde(default = "default_test")]
    pub test: AldexTest,
    #[serde(default)]
    pub mc_samples: McSamples,
    /// Metadata column holding the conditions; the first column if unset.
    #[serde(default)]
    pub group_column: Option<String>,
    /// Routine definitions; the bundled script if unset.
    #[serde(default)]
    pub script: Option<PathBuf>,
    /// `Rscript` executable; `$ALDEX_RSCRIPT` or `Rscript` if unset.
    #[serde(default)]
    pub rscript: Option<String>,
    /// Monte-Carlo instances aggregated by the CLR extraction; all if unset.
    #[serde(default)]
    pub clr_instances: Option<Vec<usize>>,
    #[serde(default)]
    pub plot: PlotOptions,
}

fn default_test() -> AldexTest {
    AldexTest::T
}

impl Default for AldexConfig {
    fn default() -> Self {
        Self {
            test: default_test(),
            mc_samples: McSamples::Auto,
            group_column: None,
            script: None,
            rscript: None,
            clr_instances: None,
            plot: PlotOptions::default(),
        }
    }
}

impl AldexConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(DaaError::from)
    }

    /// Load from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(DaaError::from)
    }

    /// The `Rscript` routine this configuration describes.
    pub fn routine(&self) -> RscriptRoutine {
        let routine = match &self.script {
            Some(path) => RscriptRoutine::new(path.clone()),
            None => RscriptRoutine::bundled(),
        };
        match &self.rscript {
            Some(executable) => routine.with_executable(executable.clone()),
            None => routine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aldex::RoutineScript;

    #[test]
    fn test_defaults_from_empty_mapping() {
        let config = AldexConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AldexConfig::default());
        assert_eq!(config.test, AldexTest::T);
        assert_eq!(config.mc_samples, McSamples::Auto);
    }

    #[test]
    fn test_full_config() {
        let yaml = "\
test: kw
mc_samples: 256
group_column: diagnosis
script: /opt/aldex/run_aldex.R
rscript: /usr/local/bin/Rscript
clr_instances: [0, 5, 9]
plot:
  alpha: 0.1
  p_value_column: kw.eBH
";
        let config = AldexConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.test, AldexTest::Kw);
        assert_eq!(config.mc_samples, McSamples::Fixed(256));
        assert_eq!(config.group_column.as_deref(), Some("diagnosis"));
        assert_eq!(config.clr_instances, Some(vec![0, 5, 9]));
        assert_eq!(config.plot.alpha, 0.1);
        assert_eq!(config.plot.lfc_threshold, 1.0);

        let routine = config.routine();
        assert_eq!(routine.executable(), "/usr/local/bin/Rscript");
        assert_eq!(
            routine.script(),
            &RoutineScript::Path(PathBuf::from("/opt/aldex/run_aldex.R"))
        );
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = AldexConfig {
            test: AldexTest::Glm,
            mc_samples: McSamples::Fixed(64),
            group_column: Some("group".to_string()),
            ..AldexConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(AldexConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_bad_test_name() {
        assert!(AldexConfig::from_yaml("test: anova").is_err());
    }

    #[test]
    fn test_bundled_routine_by_default() {
        assert_eq!(AldexConfig::default().routine().script(), &RoutineScript::Bundled);
    }
}
