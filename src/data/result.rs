//! Result table returned by ALDEx2.

use crate::error::{DaaError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Median clr abundance across all samples.
pub const RAB_ALL: &str = "rab.all";
/// Median difference in clr values between groups.
pub const DIFF_BTW: &str = "diff.btw";
/// Median of the largest within-group difference.
pub const DIFF_WIN: &str = "diff.win";
/// Effect size: `diff.btw / max(diff.win)`.
pub const EFFECT: &str = "effect";
/// Expected Benjamini-Hochberg corrected p-value of Welch's t-test.
pub const WE_EBH: &str = "we.eBH";
/// Expected p-value of Welch's t-test.
pub const WE_EP: &str = "we.ep";
/// Expected Benjamini-Hochberg corrected p-value of the Wilcoxon test.
pub const WI_EBH: &str = "wi.eBH";
/// Expected Benjamini-Hochberg corrected p-value of the Kruskal-Wallis test.
pub const KW_EBH: &str = "kw.eBH";
/// Expected Benjamini-Hochberg corrected p-value of the glm test.
pub const GLM_EBH: &str = "glm.eBH";

/// One named numeric column of the result table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// Per-feature ALDEx2 output: one row per feature, named numeric columns.
///
/// The set of columns depends on the test that was run; `NA` cells are
/// stored as `NaN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AldexResult {
    feature_ids: Vec<String>,
    columns: Vec<ResultColumn>,
}

impl AldexResult {
    /// Create a result table, checking that every column has one value per feature.
    pub fn new(feature_ids: Vec<String>, columns: Vec<ResultColumn>) -> Result<Self> {
        for column in &columns {
            if column.values.len() != feature_ids.len() {
                return Err(DaaError::DimensionMismatch {
                    expected: feature_ids.len(),
                    actual: column.values.len(),
                });
            }
        }
        Ok(Self {
            feature_ids,
            columns,
        })
    }

    /// Load a result table from TSV as written by R's `write.table(..., col.names = NA)`.
    ///
    /// The first header cell (row-name header) is ignored.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = read_numeric_tsv(path)?;
        let columns = table
            .column_names
            .iter()
            .enumerate()
            .map(|(j, name)| ResultColumn {
                name: name.clone(),
                values: table.rows.iter().map(|row| row[j]).collect(),
            })
            .collect();
        Self::new(table.row_names, columns)
    }

    /// Write the result table to TSV. `NaN` is written as `NA`.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "feature_id")?;
        for column in &self.columns {
            write!(writer, "\t{}", column.name)?;
        }
        writeln!(writer)?;

        for (i, feature_id) in self.feature_ids.iter().enumerate() {
            write!(writer, "{}", feature_id)?;
            for column in &self.columns {
                let v = column.values[i];
                if v.is_nan() {
                    write!(writer, "\tNA")?;
                } else {
                    write!(writer, "\t{}", v)?;
                }
            }
            writeln!(writer)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Serialize to pretty JSON (`NaN` becomes `null`).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.feature_ids.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.feature_ids.is_empty()
    }

    /// Feature identifiers in row order.
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Values of a column, if present.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Values of a column, failing with [`DaaError::MissingColumn`] if absent.
    pub fn require_column(&self, name: &str) -> Result<&[f64]> {
        self.column(name)
            .ok_or_else(|| DaaError::MissingColumn(name.to_string()))
    }

    /// Features whose value in `column` is below `alpha`.
    pub fn significant_at(&self, column: &str, alpha: f64) -> Result<Vec<&str>> {
        let values = self.require_column(column)?;
        Ok(self
            .feature_ids
            .iter()
            .zip(values)
            .filter(|(_, &p)| p < alpha)
            .map(|(id, _)| id.as_str())
            .collect())
    }

    /// Count features below the usual thresholds in a p-value column.
    pub fn summary(&self, column: &str) -> Result<ResultSummary> {
        let values = self.require_column(column)?;
        let below = |alpha: f64| values.iter().filter(|&&p| p < alpha).count();
        Ok(ResultSummary {
            column: column.to_string(),
            total: self.len(),
            significant_001: below(0.001),
            significant_01: below(0.01),
            significant_05: below(0.05),
            significant_10: below(0.10),
        })
    }
}

/// Summary statistics for one p-value column of a result table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub column: String,
    pub total: usize,
    pub significant_001: usize,
    pub significant_01: usize,
    pub significant_05: usize,
    pub significant_10: usize,
}

impl std::fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total features tested: {}", self.total)?;
        writeln!(f, "Significant at {} < 0.001: {}", self.column, self.significant_001)?;
        writeln!(f, "Significant at {} < 0.01:  {}", self.column, self.significant_01)?;
        writeln!(f, "Significant at {} < 0.05:  {}", self.column, self.significant_05)?;
        writeln!(f, "Significant at {} < 0.10:  {}", self.column, self.significant_10)?;
        Ok(())
    }
}

/// A numeric table with row and column names, as exchanged with R.
#[derive(Debug, Clone)]
pub(crate) struct NumericTable {
    pub row_names: Vec<String>,
    pub column_names: Vec<String>,
    /// Row-major values.
    pub rows: Vec<Vec<f64>>,
}

fn parse_cell(raw: &str, row: &str, column: &str) -> Result<f64> {
    let raw = raw.trim();
    match raw {
        "" | "NA" | "NaN" => Ok(f64::NAN),
        "Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        _ => raw.parse::<f64>().map_err(|_| {
            DaaError::InvalidParameter(format!(
                "Non-numeric value '{}' for feature '{}' in column '{}'",
                raw, row, column
            ))
        }),
    }
}

/// Read a tab-separated numeric table whose first column holds row names.
pub(crate) fn read_numeric_tsv<P: AsRef<Path>>(path: P) -> Result<NumericTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .quoting(false)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(DaaError::EmptyData("Table has no header".to_string()));
    }
    let column_names: Vec<String> = headers.iter().skip(1).map(|h| h.to_string()).collect();

    let mut row_names = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row_name = record.get(0).unwrap_or_default().to_string();
        let values = column_names
            .iter()
            .enumerate()
            .map(|(j, name)| parse_cell(record.get(j + 1).unwrap_or_default(), &row_name, name))
            .collect::<Result<Vec<f64>>>()?;
        row_names.push(row_name);
        rows.push(values);
    }

    Ok(NumericTable {
        row_names,
        column_names,
        rows,
    })
}
