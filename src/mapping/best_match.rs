/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Picking the best parent for every child

use super::errors::{MappingError, Result};
use super::record::MappingRecord;
use super::table::ResultTable;
use serde::{Deserialize, Serialize};

/// Default tolerance for flagging conflicting maps
pub const DEFAULT_CONFLICT_TOL: f64 = 1e-4;

/// The lowest-cost record of a list and the records that tie with it
#[derive(Debug, Clone, PartialEq)]
pub struct BestMap<'a> {
    /// Position of the best record in the input
    pub index: usize,
    pub best: &'a MappingRecord,
    /// Other records whose total cost is within tolerance of the best, in input order
    pub conflicts: Vec<&'a MappingRecord>,
}

/// Find the record with the lowest total cost and flag records close to it
///
/// Undefined costs are ignored. On exact ties the first record wins. A
/// record conflicts with the best one when
/// `|c - c_best| <= tol + tol * max(|c|, |c_best|)`.
///
/// # Arguments
///
/// * `records` - Candidate records, typically one per parent
/// * `tol` - Absolute and relative tolerance
///
/// # Returns
///
/// The best record and its conflicts, or `AllUndefinedCosts` when no record has a cost
pub fn find_best_map_and_flag_conflicts(records: &[MappingRecord], tol: f64) -> Result<BestMap<'_>> {
    let mut best: Option<(usize, f64)> = None;
    for (index, record) in records.iter().enumerate() {
        let cost = record.total_cost();
        if cost.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, best_cost)| cost < best_cost) {
            best = Some((index, cost));
        }
    }
    let (best_index, best_cost) = best.ok_or(MappingError::AllUndefinedCosts)?;

    let conflicts = records
        .iter()
        .enumerate()
        .filter(|&(index, record)| {
            let cost = record.total_cost();
            index != best_index && (cost - best_cost).abs() <= tol + tol * cost.abs().max(best_cost.abs())
        })
        .map(|(_, record)| record)
        .collect();

    Ok(BestMap {
        index: best_index,
        best: &records[best_index],
        conflicts,
    })
}

/// Best parent of one child
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestMatchEntry {
    /// Column label of the best parent
    pub best_parent_id: String,
    pub best_record: MappingRecord,
    /// Records within tolerance of the best one, possibly empty
    pub tied_records: Vec<MappingRecord>,
}

impl BestMatchEntry {
    pub fn has_conflicts(&self) -> bool {
        !self.tied_records.is_empty()
    }
}

/// Best parent of every child, in table row order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BestMatchTable {
    rows: Vec<(String, BestMatchEntry)>,
}

impl BestMatchTable {
    pub fn new(rows: Vec<(String, BestMatchEntry)>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[(String, BestMatchEntry)] {
        &self.rows
    }

    pub fn get(&self, child_label: &str) -> Option<&BestMatchEntry> {
        self.rows
            .iter()
            .find(|(label, _)| label == child_label)
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Find the best parent of every child in a result table
pub fn analyze_mapping_data(table: &ResultTable, tol: f64) -> Result<BestMatchTable> {
    if table.is_empty() {
        return Err(MappingError::EmptyResultSet(
            "the table does not contain mapping records".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(table.row_count());
    for (label, cells) in table.rows() {
        let records: Vec<MappingRecord> = cells.iter().map(|cell| cell.record.clone()).collect();
        let best = find_best_map_and_flag_conflicts(&records, tol)?;
        rows.push((
            label.to_string(),
            BestMatchEntry {
                best_parent_id: table.column_labels()[best.index].clone(),
                best_record: best.best.clone(),
                tied_records: best.conflicts.into_iter().cloned().collect(),
            },
        ));
    }

    Ok(BestMatchTable::new(rows))
}
