//! Sample metadata handling: categorical labels indexed by sample ID.

use crate::error::{DaaError, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Sample metadata containing one or more label columns per sample.
///
/// Values are kept as raw strings; ALDEx2 receives them as condition labels
/// and decides itself how to interpret them.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// Sample IDs in order.
    sample_ids: Vec<String>,
    /// Column names.
    column_names: Vec<String>,
    /// Data stored as sample_id -> row of values (one per column).
    data: HashMap<String, Vec<String>>,
}

impl Metadata {
    /// Build single-column metadata from `(sample_id, label)` pairs.
    pub fn from_labels<S, L>(column: &str, labels: impl IntoIterator<Item = (S, L)>) -> Result<Self>
    where
        S: Into<String>,
        L: Into<String>,
    {
        let mut sample_ids = Vec::new();
        let mut data = HashMap::new();
        for (sample, label) in labels {
            let sample = sample.into();
            if data.insert(sample.clone(), vec![label.into()]).is_some() {
                return Err(DaaError::SampleMismatch(format!(
                    "Duplicate sample '{}' in metadata",
                    sample
                )));
            }
            sample_ids.push(sample);
        }
        Ok(Self {
            sample_ids,
            column_names: vec![column.to_string()],
            data,
        })
    }

    /// Load metadata from a TSV file.
    ///
    /// Expected format:
    /// - First row: header with column names (first column is sample ID)
    /// - Subsequent rows: sample ID followed by one value per column
    ///
    /// Cells may be empty, but every row must have all of its cells.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| DaaError::EmptyData("Empty metadata file".to_string()))??;
        let header: Vec<&str> = header_line.split('\t').collect();
        if header.len() < 2 {
            return Err(DaaError::EmptyData(
                "Metadata must have at least one variable column".to_string(),
            ));
        }
        let column_names: Vec<String> = header[1..].iter().map(|s| s.trim().to_string()).collect();

        let mut sample_ids = Vec::new();
        let mut data = HashMap::new();
        for line_result in lines {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() - 1 != column_names.len() {
                return Err(DaaError::DimensionMismatch {
                    expected: column_names.len(),
                    actual: fields.len() - 1,
                });
            }
            let sample_id = fields[0].trim().to_string();
            let values: Vec<String> = fields[1..].iter().map(|s| s.trim().to_string()).collect();
            if data.insert(sample_id.clone(), values).is_some() {
                return Err(DaaError::SampleMismatch(format!(
                    "Duplicate sample '{}' in metadata",
                    sample_id
                )));
            }
            sample_ids.push(sample_id);
        }

        if sample_ids.is_empty() {
            return Err(DaaError::EmptyData("No samples in metadata".to_string()));
        }

        Ok(Self {
            sample_ids,
            column_names,
            data,
        })
    }

    /// Sample IDs in order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of samples (rows).
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Resolve a column name, defaulting to the first column.
    fn column_index(&self, column: Option<&str>) -> Result<usize> {
        match column {
            Some(name) => self
                .column_names
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| DaaError::MissingColumn(name.to_string())),
            None if self.column_names.is_empty() => Err(DaaError::EmptyData(
                "Metadata has no label columns".to_string(),
            )),
            None => Ok(0),
        }
    }

    /// Get the label of one sample in a column.
    pub fn get(&self, sample_id: &str, column: &str) -> Option<&str> {
        let idx = self.column_names.iter().position(|c| c == column)?;
        self.data.get(sample_id).map(|row| row[idx].as_str())
    }

    /// Labels of a column in sample order. `None` selects the first column.
    ///
    /// A sample with an empty label is an error rather than a group of its own.
    pub fn labels(&self, column: Option<&str>) -> Result<Vec<String>> {
        let idx = self.column_index(column)?;
        self.sample_ids
            .iter()
            .map(|sid| {
                let label = &self.data[sid][idx];
                if label.is_empty() {
                    Err(DaaError::EmptyData(format!(
                        "Sample '{}' has no label in column '{}'",
                        sid, self.column_names[idx]
                    )))
                } else {
                    Ok(label.clone())
                }
            })
            .collect()
    }

    /// Number of samples per distinct label, sorted by label.
    pub fn group_sizes(&self, column: Option<&str>) -> Result<BTreeMap<String, usize>> {
        Ok(group_sizes(&self.labels(column)?))
    }

    /// Reorder (and subset) metadata to match the given sample order.
    pub fn align_to(&self, sample_ids: &[String]) -> Result<Self> {
        let mut data = HashMap::with_capacity(sample_ids.len());
        for sid in sample_ids {
            let row = self.data.get(sid).ok_or_else(|| {
                DaaError::SampleMismatch(format!("Sample '{}' not found in metadata", sid))
            })?;
            data.insert(sid.clone(), row.clone());
        }

        Ok(Self {
            sample_ids: sample_ids.to_vec(),
            column_names: self.column_names.clone(),
            data,
        })
    }

}

/// Count occurrences of each label.
pub fn group_sizes(labels: &[String]) -> BTreeMap<String, usize> {
    let mut sizes = BTreeMap::new();
    for label in labels {
        *sizes.entry(label.clone()).or_insert(0) += 1;
    }
    sizes
}
