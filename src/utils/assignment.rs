/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Minimum-cost assignment (Hungarian algorithm)
//!
//! Used by the atom mapping step to pair every parent supercell site with
//! exactly one child atom. The solver works on dense square cost matrices
//! stored as `faer::Mat<f64>` and runs in O(n³).

use super::errors::{Result, UtilsError};
use faer::Mat;

/// Solution of an assignment problem
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// `row_to_col[i]` is the column assigned to row `i`
    pub row_to_col: Vec<usize>,
    /// Sum of the selected costs
    pub total_cost: f64,
}

/// Solve the square assignment problem for `cost`
///
/// Rows and columns are matched one to one so that the sum of the selected
/// entries is minimal. Entries must be finite; callers encode forbidden pairs
/// with a large finite penalty and check the result.
///
/// # Arguments
///
/// * `cost` - Square cost matrix
///
/// # Returns
///
/// The optimal assignment
pub fn solve_assignment(cost: &Mat<f64>) -> Result<Assignment> {
    let n = cost.nrows();
    if cost.ncols() != n {
        return Err(UtilsError::DimensionMismatch(format!(
            "assignment needs a square cost matrix, got {}x{}",
            n,
            cost.ncols()
        )));
    }
    if n == 0 {
        return Ok(Assignment {
            row_to_col: Vec::new(),
            total_cost: 0.0,
        });
    }
    for i in 0..n {
        for j in 0..n {
            if !cost[(i, j)].is_finite() {
                return Err(UtilsError::Math(format!(
                    "non-finite assignment cost at ({}, {})",
                    i, j
                )));
            }
        }
    }

    // Potentials and matching are 1-indexed; index 0 is a virtual column.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut matched_row = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        matched_row[0] = row;
        let mut j0 = 0usize;
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = matched_row[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost[(i0 - 1, j - 1)] - u[i0] - v[j];
                if reduced < min_slack[j] {
                    min_slack[j] = reduced;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[matched_row[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if matched_row[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            matched_row[j0] = matched_row[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0usize; n];
    for j in 1..=n {
        row_to_col[matched_row[j] - 1] = j - 1;
    }
    let total_cost = row_to_col
        .iter()
        .enumerate()
        .map(|(i, &j)| cost[(i, j)])
        .sum();

    Ok(Assignment {
        row_to_col,
        total_cost,
    })
}
