//! ALDEx2 driven through an `Rscript` subprocess.
//!
//! Each call writes the inputs into a fresh temporary directory, generates a
//! small driver script that sources the routine definitions and calls into
//! them, runs it with `Rscript`, and reads the table the driver wrote back.

use crate::aldex::{AldexRoutine, AldexTest};
use crate::data::{read_numeric_tsv, AldexResult, CountMatrix};
use crate::error::{DaaError, Result};
use log::debug;
use nalgebra::DMatrix;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable overriding the `Rscript` executable.
pub const RSCRIPT_ENV: &str = "ALDEX_RSCRIPT";

/// Routine definitions shipped with the crate (`run_aldex`, `run_aldex_clr`).
pub const BUNDLED_SCRIPT: &str = include_str!("../../r/run_aldex.R");

const COUNTS_FILE: &str = "counts.tsv";
const CONDITIONS_FILE: &str = "conditions.txt";
const OUTPUT_FILE: &str = "result.tsv";
const DRIVER_FILE: &str = "driver.R";
const BUNDLED_FILE: &str = "run_aldex.R";

/// Where the routine definitions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutineScript {
    /// A user-supplied R file defining `run_aldex` (and `run_aldex_clr`).
    Path(PathBuf),
    /// [`BUNDLED_SCRIPT`].
    Bundled,
}

/// The R-side function to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RoutineCall {
    Run { mc_samples: usize, test: AldexTest },
    Clr { mc_samples: usize, instance: usize },
}

/// [`AldexRoutine`] backed by an R installation with ALDEx2.
#[derive(Debug, Clone)]
pub struct RscriptRoutine {
    executable: String,
    script: RoutineScript,
}

impl RscriptRoutine {
    /// Use the routine definitions in `script_path`.
    pub fn new<P: Into<PathBuf>>(script_path: P) -> Self {
        Self {
            executable: default_executable(),
            script: RoutineScript::Path(script_path.into()),
        }
    }

    /// Use the routine definitions bundled with the crate.
    pub fn bundled() -> Self {
        Self {
            executable: default_executable(),
            script: RoutineScript::Bundled,
        }
    }

    /// Override the `Rscript` executable.
    pub fn with_executable<S: Into<String>>(mut self, executable: S) -> Self {
        self.executable = executable.into();
        self
    }

    /// The configured `Rscript` executable.
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// The configured routine definitions.
    pub fn script(&self) -> &RoutineScript {
        &self.script
    }

    /// Write inputs, run the driver and return the path of the output table
    /// inside `workdir`.
    fn invoke(
        &self,
        workdir: &Path,
        counts: &CountMatrix,
        conditions: &[String],
        call: RoutineCall,
    ) -> Result<PathBuf> {
        let script_path = match &self.script {
            RoutineScript::Path(path) => {
                if !path.is_file() {
                    return Err(DaaError::InvalidParameter(format!(
                        "Routine script '{}' does not exist",
                        path.display()
                    )));
                }
                path.clone()
            }
            RoutineScript::Bundled => {
                let path = workdir.join(BUNDLED_FILE);
                fs::write(&path, BUNDLED_SCRIPT)?;
                path
            }
        };

        let counts_path = workdir.join(COUNTS_FILE);
        let conditions_path = workdir.join(CONDITIONS_FILE);
        let output_path = workdir.join(OUTPUT_FILE);
        let driver_path = workdir.join(DRIVER_FILE);

        counts.to_tsv(&counts_path)?;
        let mut labels = conditions.join("\n");
        labels.push('\n');
        fs::write(&conditions_path, labels)?;
        fs::write(
            &driver_path,
            driver_script(&script_path, &counts_path, &conditions_path, &output_path, call),
        )?;

        debug!(
            "Running {} {} in {}",
            self.executable,
            driver_path.display(),
            workdir.display()
        );
        let output = Command::new(&self.executable)
            .arg(&driver_path)
            .current_dir(workdir)
            .output()
            .map_err(|e| {
                DaaError::External(format!(
                    "Could not execute '{}' (set {} to override): {}",
                    self.executable, RSCRIPT_ENV, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let detail = if !stderr.is_empty() {
                stderr
            } else if !stdout.is_empty() {
                stdout
            } else {
                format!("exit status {}", output.status)
            };
            return Err(DaaError::External(detail));
        }

        if !output_path.is_file() {
            return Err(DaaError::External(format!(
                "Routine finished without writing '{}'",
                output_path.display()
            )));
        }
        Ok(output_path)
    }
}

impl Default for RscriptRoutine {
    fn default() -> Self {
        Self::bundled()
    }
}

impl AldexRoutine for RscriptRoutine {
    fn run(
        &mut self,
        counts: &CountMatrix,
        conditions: &[String],
        mc_samples: usize,
        test: AldexTest,
    ) -> Result<AldexResult> {
        let workdir = tempfile::tempdir()?;
        let output = self.invoke(
            workdir.path(),
            counts,
            conditions,
            RoutineCall::Run { mc_samples, test },
        )?;
        AldexResult::from_tsv(output)
    }

    fn clr_instance(
        &mut self,
        counts: &CountMatrix,
        conditions: &[String],
        mc_samples: usize,
        instance: usize,
    ) -> Result<DMatrix<f64>> {
        let workdir = tempfile::tempdir()?;
        let output = self.invoke(
            workdir.path(),
            counts,
            conditions,
            RoutineCall::Clr {
                mc_samples,
                instance,
            },
        )?;
        let table = read_numeric_tsv(output)?;
        let n_cols = table.column_names.len();
        Ok(DMatrix::from_fn(table.rows.len(), n_cols, |i, j| {
            table.rows[i][j]
        }))
    }
}

fn default_executable() -> String {
    std::env::var(RSCRIPT_ENV).unwrap_or_else(|_| "Rscript".to_string())
}

/// Quote a path as an R string literal.
fn r_path_literal(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    format!("\"{}\"", raw.replace('"', "\\\""))
}

/// R source that loads the routine definitions, runs one call and writes the
/// returned table next to the inputs.
pub(crate) fn driver_script(
    script: &Path,
    counts: &Path,
    conditions: &Path,
    output: &Path,
    call: RoutineCall,
) -> String {
    let invocation = match call {
        RoutineCall::Run { mc_samples, test } => format!(
            "run_aldex(counts, conds, {}L, \"{}\")",
            mc_samples,
            test.r_name()
        ),
        // R indexes instances from 1.
        RoutineCall::Clr {
            mc_samples,
            instance,
        } => format!(
            "run_aldex_clr(counts, conds, {}L, {}L)",
            mc_samples,
            instance + 1
        ),
    };

    format!(
        "source({script})\n\
         counts <- read.delim({counts}, row.names = 1, check.names = FALSE, quote = \"\")\n\
         conds <- readLines({conditions})\n\
         result <- {invocation}\n\
         write.table(result, {output}, sep = \"\\t\", quote = FALSE, col.names = NA)\n",
        script = r_path_literal(script),
        counts = r_path_literal(counts),
        conditions = r_path_literal(conditions),
        invocation = invocation,
        output = r_path_literal(output),
    )
}
