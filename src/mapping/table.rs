/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Tabulated mapping results
//!
//! One row per child, labelled with its configuration name, and one column
//! group per parent, labelled with the base name of the parent identifier.
//! Every cell holds the three costs and the record they were taken from.

use super::config_name::config_name_from_child_path;
use super::errors::{MappingError, Result};
use super::orchestrator::NestedMappingResults;
use super::record::MappingRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names of the values stored for every parent column group
pub const CELL_FIELDS: [&str; 4] = ["atomic_cost", "lattice_cost", "total_cost", "mapping_results"];

/// Costs and record of the best mapping of one child onto one parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub atomic_cost: f64,
    pub lattice_cost: f64,
    pub total_cost: f64,
    pub record: MappingRecord,
}

impl From<&MappingRecord> for TableCell {
    fn from(record: &MappingRecord) -> Self {
        Self {
            atomic_cost: record.atomic_cost(),
            lattice_cost: record.lattice_cost(),
            total_cost: record.total_cost(),
            record: record.clone(),
        }
    }
}

/// Mapping results of every child onto every parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    cells: Vec<Vec<TableCell>>,
}

impl ResultTable {
    /// Create a table from labels and a row-major grid of cells
    pub fn new(row_labels: Vec<String>, column_labels: Vec<String>, cells: Vec<Vec<TableCell>>) -> Result<Self> {
        if cells.len() != row_labels.len() {
            return Err(MappingError::TableError(format!(
                "{} row labels for {} rows",
                row_labels.len(),
                cells.len()
            )));
        }
        if let Some(row) = cells.iter().position(|row| row.len() != column_labels.len()) {
            return Err(MappingError::TableError(format!(
                "row {} has {} cells but there are {} columns",
                row,
                cells[row].len(),
                column_labels.len()
            )));
        }
        Ok(Self {
            row_labels,
            column_labels,
            cells,
        })
    }

    /// Flatten nested mapping results into a table
    ///
    /// Only the first record of every (child, parent) pair is kept. Row labels
    /// are configuration names of the child identifiers and column labels are
    /// base names of the parent identifiers of the first row.
    pub fn from_mapping_results(results: &NestedMappingResults) -> Result<Self> {
        let Some(first_row) = results.first() else {
            return Err(MappingError::EmptyResultSet("no children were mapped".to_string()));
        };
        if first_row.is_empty() {
            return Err(MappingError::EmptyResultSet("no parents were mapped".to_string()));
        }
        let width = first_row.len();

        let mut row_labels = Vec::with_capacity(results.len());
        let mut cells = Vec::with_capacity(results.len());
        for (index, results_for_child) in results.iter().enumerate() {
            if results_for_child.len() != width {
                return Err(MappingError::EmptyResultSet(format!(
                    "child {} was mapped onto {} parents, expected {}",
                    index,
                    results_for_child.len(),
                    width
                )));
            }
            let firsts = first_records(results_for_child, index)?;
            row_labels.push(config_name_from_child_path(firsts[0].child_id())?);
            cells.push(firsts.into_iter().map(TableCell::from).collect());
        }

        let column_labels = first_records(first_row, 0)?
            .into_iter()
            .map(|record| base_name(record.parent_id()))
            .collect();

        Self::new(row_labels, column_labels, cells)
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&TableCell> {
        self.cells.get(row).and_then(|cells| cells.get(column))
    }

    /// Rows with their labels
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[TableCell])> {
        self.row_labels
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(Vec::as_slice))
    }

    pub fn row_count(&self) -> usize {
        self.row_labels.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty() || self.column_labels.is_empty()
    }
}

fn first_records(results_for_child: &[Vec<MappingRecord>], index: usize) -> Result<Vec<&MappingRecord>> {
    results_for_child
        .iter()
        .map(|records| {
            records.first().ok_or_else(|| {
                MappingError::EmptyResultSet(format!("child {} has a pair without records", index))
            })
        })
        .collect()
}

/// Final path component of an identifier
pub fn base_name(identifier: &str) -> String {
    Path::new(identifier)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| identifier.to_string())
}
