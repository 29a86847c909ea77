/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Crystal lattice representation

use super::errors::{Result, XtalError};
use crate::utils::matrix3::{self, IMatrix3, Matrix3, Vector3};

/// Squared-length improvements smaller than this do not count during reduction
const REDUCTION_EPSILON: f64 = 1e-10;

/// Upper bound on reduction passes
const MAX_REDUCTION_PASSES: usize = 256;

/// A 3D lattice stored as a matrix whose columns are the lattice vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    column_vectors: Matrix3,
}

impl Lattice {
    /// Create a lattice from a matrix of column lattice vectors
    pub fn new(column_vectors: Matrix3) -> Result<Self> {
        if matrix3::det(&column_vectors).abs() < 1e-8 {
            return Err(XtalError::InvalidLattice(
                "lattice vectors are linearly dependent".to_string(),
            ));
        }
        Ok(Self { column_vectors })
    }

    /// Create a lattice from lattice vectors given as rows, as in structure files
    pub fn from_row_vectors(rows: &Matrix3) -> Result<Self> {
        Self::new(matrix3::transpose(rows))
    }

    /// Matrix whose columns are the lattice vectors
    pub fn column_vectors(&self) -> &Matrix3 {
        &self.column_vectors
    }

    /// Lattice vectors as rows
    pub fn row_vectors(&self) -> Matrix3 {
        matrix3::transpose(&self.column_vectors)
    }

    /// Lattice vector `index` (0, 1 or 2)
    pub fn vector(&self, index: usize) -> Vector3 {
        matrix3::column(&self.column_vectors, index)
    }

    /// Signed cell volume
    pub fn signed_volume(&self) -> f64 {
        matrix3::det(&self.column_vectors)
    }

    /// Cell volume
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Metric tensor `Lᵀ L`
    pub fn metric(&self) -> Matrix3 {
        matrix3::mul(&matrix3::transpose(&self.column_vectors), &self.column_vectors)
    }

    pub fn inverse(&self) -> Result<Matrix3> {
        Ok(matrix3::inverse(&self.column_vectors)?)
    }

    pub fn frac_to_cart(&self, frac: &Vector3) -> Vector3 {
        matrix3::mul_vec(&self.column_vectors, frac)
    }

    pub fn cart_to_frac(&self, cart: &Vector3) -> Result<Vector3> {
        Ok(matrix3::mul_vec(&self.inverse()?, cart))
    }

    /// Lattice of the supercell `L T` for an integer transformation matrix `T`
    pub fn supercell(&self, transformation: &IMatrix3) -> Result<Self> {
        Self::new(matrix3::mul(
            &self.column_vectors,
            &matrix3::to_real(transformation),
        ))
    }

    /// Apply a linear map to every lattice vector
    pub fn transformed(&self, map: &Matrix3) -> Result<Self> {
        Self::new(matrix3::mul(map, &self.column_vectors))
    }

    /// Reduce the basis to short, nearly orthogonal vectors
    ///
    /// Every vector is repeatedly replaced by the shortest of
    /// `b_i + s b_j + t b_k` with `s, t ∈ {-1, 0, 1}` after removing its
    /// rounded projections onto the other vectors, until no vector gets shorter.
    ///
    /// # Returns
    ///
    /// The reduced lattice and the unimodular matrix `U` with `L_reduced = L U`
    pub fn reduced(&self) -> (Self, IMatrix3) {
        let mut basis = self.column_vectors;
        let mut unimodular = matrix3::int_identity();

        for _ in 0..MAX_REDUCTION_PASSES {
            let mut changed = false;

            for i in 0..3 {
                let (j, k) = ((i + 1) % 3, (i + 2) % 3);

                for other in [j, k] {
                    let bi = matrix3::column(&basis, i);
                    let bo = matrix3::column(&basis, other);
                    let ratio = matrix3::dot(&bi, &bo) / matrix3::norm_sq(&bo);
                    if ratio.abs() > 0.5 + 1e-9 {
                        let factor = ratio.round();
                        let reduced = matrix3::vec_sub(&bi, &matrix3::vec_scale(&bo, factor));
                        matrix3::set_column(&mut basis, i, &reduced);
                        for row in unimodular.iter_mut() {
                            row[i] -= factor as i64 * row[other];
                        }
                        changed = true;
                    }
                }

                let bi = matrix3::column(&basis, i);
                let bj = matrix3::column(&basis, j);
                let bk = matrix3::column(&basis, k);
                let mut best = (matrix3::norm_sq(&bi), 0i64, 0i64);
                for s in -1i64..=1 {
                    for t in -1i64..=1 {
                        if s == 0 && t == 0 {
                            continue;
                        }
                        let candidate = matrix3::vec_add(
                            &bi,
                            &matrix3::vec_add(
                                &matrix3::vec_scale(&bj, s as f64),
                                &matrix3::vec_scale(&bk, t as f64),
                            ),
                        );
                        let length = matrix3::norm_sq(&candidate);
                        if length < best.0 - REDUCTION_EPSILON * (1.0 + best.0) {
                            best = (length, s, t);
                        }
                    }
                }
                if best.1 != 0 || best.2 != 0 {
                    let (s, t) = (best.1, best.2);
                    let candidate = matrix3::vec_add(
                        &bi,
                        &matrix3::vec_add(
                            &matrix3::vec_scale(&bj, s as f64),
                            &matrix3::vec_scale(&bk, t as f64),
                        ),
                    );
                    matrix3::set_column(&mut basis, i, &candidate);
                    for row in unimodular.iter_mut() {
                        row[i] += s * row[j] + t * row[k];
                    }
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        (Self { column_vectors: basis }, unimodular)
    }

    /// Proper and improper rotations that map the lattice onto itself
    ///
    /// Candidate operations are integer matrices with entries in {-1, 0, 1}
    /// acting on the reduced basis; an operation is kept when it preserves the
    /// metric within `tol` (a length tolerance in Cartesian units).
    ///
    /// # Returns
    ///
    /// Cartesian rotation matrices
    pub fn point_group(&self, tol: f64) -> Result<Vec<Matrix3>> {
        let (reduced, _) = self.reduced();
        let basis = reduced.column_vectors;
        let basis_inverse = matrix3::inverse(&basis)?;
        let metric = reduced.metric();
        let max_length = (0..3).map(|i| metric[i][i].sqrt()).fold(0.0, f64::max);
        let metric_tol = 2.0 * tol * max_length;

        let mut operations = Vec::new();
        for candidate in signed_unit_matrices() {
            if int_det_is_unit(&candidate).is_none() {
                continue;
            }
            let m = matrix3::to_real(&candidate);
            let transformed = matrix3::mul(&matrix3::mul(&matrix3::transpose(&m), &metric), &m);
            if matrix3::max_abs_diff(&transformed, &metric) <= metric_tol {
                operations.push(matrix3::mul(&matrix3::mul(&basis, &m), &basis_inverse));
            }
        }
        Ok(operations)
    }
}

/// Iterator over every 3x3 integer matrix with entries in {-1, 0, 1}
pub(crate) fn signed_unit_matrices() -> impl Iterator<Item = IMatrix3> {
    (0..19683u32).map(|mut code| {
        let mut m = [[0i64; 3]; 3];
        for row in m.iter_mut() {
            for value in row.iter_mut() {
                *value = (code % 3) as i64 - 1;
                code /= 3;
            }
        }
        m
    })
}

/// Determinant of `m` when it is ±1
pub(crate) fn int_det_is_unit(m: &IMatrix3) -> Option<i64> {
    let d = matrix3::int_det(m);
    if d.abs() == 1 {
        Some(d)
    } else {
        None
    }
}
