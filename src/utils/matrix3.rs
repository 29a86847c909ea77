/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Fixed size 3x3 matrix helpers
//!
//! Lattices, deformation gradients and symmetry operations are all 3x3, so
//! they are stored as plain row-major arrays (`m[row][col]`) instead of heap
//! allocated matrices. Lattice matrices hold lattice vectors as columns.

#![allow(clippy::needless_range_loop)]

use super::errors::{Result, UtilsError};
use faer::linalg::solvers::DenseSolveCore;
use faer::{Mat, Side};

/// Real 3-vector
pub type Vector3 = [f64; 3];

/// Real row-major 3x3 matrix
pub type Matrix3 = [[f64; 3]; 3];

/// Integer row-major 3x3 matrix
pub type IMatrix3 = [[i64; 3]; 3];

/// Determinants with a magnitude below this are treated as singular
const SINGULAR_THRESHOLD: f64 = 1e-12;

pub fn identity() -> Matrix3 {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

pub fn int_identity() -> IMatrix3 {
    [[1, 0, 0], [0, 1, 0], [0, 0, 1]]
}

pub fn zeros() -> Matrix3 {
    [[0.0; 3]; 3]
}

pub fn transpose(m: &Matrix3) -> Matrix3 {
    let mut out = zeros();
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = m[j][i];
        }
    }
    out
}

pub fn mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = zeros();
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

pub fn mul_vec(m: &Matrix3, v: &Vector3) -> Vector3 {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

pub fn add(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = zeros();
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = a[i][j] + b[i][j];
        }
    }
    out
}

pub fn sub(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = zeros();
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = a[i][j] - b[i][j];
        }
    }
    out
}

pub fn scale(m: &Matrix3, factor: f64) -> Matrix3 {
    let mut out = *m;
    for row in out.iter_mut() {
        for value in row.iter_mut() {
            *value *= factor;
        }
    }
    out
}

pub fn trace(m: &Matrix3) -> f64 {
    m[0][0] + m[1][1] + m[2][2]
}

pub fn det(m: &Matrix3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Invert a matrix through its LU factorization
pub fn inverse(m: &Matrix3) -> Result<Matrix3> {
    let d = det(m);
    if d.abs() < SINGULAR_THRESHOLD {
        return Err(UtilsError::SingularMatrix(d));
    }

    let inv = to_faer(m).partial_piv_lu().inverse();
    from_faer(&inv)
}

/// Copy into a dense faer matrix
fn to_faer(m: &Matrix3) -> Mat<f64> {
    Mat::from_fn(3, 3, |i, j| m[i][j])
}

fn from_faer(m: &Mat<f64>) -> Result<Matrix3> {
    if m.nrows() != 3 || m.ncols() != 3 {
        return Err(UtilsError::DimensionMismatch(format!(
            "expected a 3x3 matrix, got {}x{}",
            m.nrows(),
            m.ncols()
        )));
    }
    let mut out = zeros();
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = m[(i, j)];
        }
    }
    Ok(out)
}

/// Squared Frobenius norm
pub fn frobenius_norm_sq(m: &Matrix3) -> f64 {
    m.iter().flatten().map(|v| v * v).sum()
}

/// Largest absolute element-wise difference between two matrices
pub fn max_abs_diff(a: &Matrix3, b: &Matrix3) -> f64 {
    let mut worst: f64 = 0.0;
    for i in 0..3 {
        for j in 0..3 {
            worst = worst.max((a[i][j] - b[i][j]).abs());
        }
    }
    worst
}

pub fn approx_eq(a: &Matrix3, b: &Matrix3, tol: f64) -> bool {
    max_abs_diff(a, b) <= tol
}

pub fn column(m: &Matrix3, j: usize) -> Vector3 {
    [m[0][j], m[1][j], m[2][j]]
}

pub fn set_column(m: &mut Matrix3, j: usize, v: &Vector3) {
    for i in 0..3 {
        m[i][j] = v[i];
    }
}

pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm_sq(v: &Vector3) -> f64 {
    dot(v, v)
}

pub fn vec_add(a: &Vector3, b: &Vector3) -> Vector3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn vec_sub(a: &Vector3, b: &Vector3) -> Vector3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn vec_scale(v: &Vector3, factor: f64) -> Vector3 {
    [v[0] * factor, v[1] * factor, v[2] * factor]
}

pub fn to_real(m: &IMatrix3) -> Matrix3 {
    let mut out = zeros();
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = m[i][j] as f64;
        }
    }
    out
}

/// Round a real matrix to integers, provided every entry is within `tol` of one
pub fn round_to_int(m: &Matrix3, tol: f64) -> Option<IMatrix3> {
    let mut out = [[0i64; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let rounded = m[i][j].round();
            if (m[i][j] - rounded).abs() > tol {
                return None;
            }
            out[i][j] = rounded as i64;
        }
    }
    Some(out)
}

pub fn int_mul(a: &IMatrix3, b: &IMatrix3) -> IMatrix3 {
    let mut out = [[0i64; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

pub fn int_det(m: &IMatrix3) -> i64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Inverse of a unimodular integer matrix
pub fn int_unimodular_inverse(m: &IMatrix3) -> Result<IMatrix3> {
    let d = int_det(m);
    if d.abs() != 1 {
        return Err(UtilsError::Math(format!(
            "matrix with determinant {} is not unimodular",
            d
        )));
    }
    let mut out = [[0i64; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            out[i][j] = (m[j1][i1] * m[j2][i2] - m[j1][i2] * m[j2][i1]) * d;
        }
    }
    Ok(out)
}

/// Eigen decomposition of a symmetric matrix
///
/// # Returns
///
/// Eigenvalues in nondecreasing order and a matrix whose columns are the
/// matching orthonormal eigenvectors, so that `m = V diag(λ) Vᵀ`.
pub fn symmetric_eigen(m: &Matrix3) -> Result<(Vector3, Matrix3)> {
    let evd = to_faer(m)
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| UtilsError::Math(format!("eigen decomposition failed: {:?}", e)))?;

    let mut values = [0.0; 3];
    for (value, &s) in values.iter_mut().zip(evd.S().column_vector().iter()) {
        *value = s;
    }
    let u = evd.U();
    let mut vectors = zeros();
    for i in 0..3 {
        for j in 0..3 {
            vectors[i][j] = u[(i, j)];
        }
    }
    Ok((values, vectors))
}

/// Principal square root of a symmetric positive semi-definite matrix
pub fn symmetric_sqrt(m: &Matrix3) -> Result<Matrix3> {
    let (values, vectors) = symmetric_eigen(m)?;
    let mut out = zeros();
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = (0..3)
                .map(|k| vectors[i][k] * values[k].max(0.0).sqrt() * vectors[j][k])
                .sum();
        }
    }
    Ok(out)
}

/// Polar decomposition `F = Q U = V Q`
#[derive(Debug, Clone, Copy)]
pub struct PolarDecomposition {
    /// Proper rotation
    pub isometry: Matrix3,
    /// Right stretch tensor
    pub right_stretch: Matrix3,
    /// Left stretch tensor
    pub left_stretch: Matrix3,
}

/// Decompose a deformation gradient into a rotation and stretch
pub fn polar_decomposition(f: &Matrix3) -> Result<PolarDecomposition> {
    let right_stretch = symmetric_sqrt(&mul(&transpose(f), f))?;
    let isometry = mul(f, &inverse(&right_stretch)?);
    let left_stretch = mul(&mul(&isometry, &right_stretch), &transpose(&isometry));
    Ok(PolarDecomposition {
        isometry,
        right_stretch,
        left_stretch,
    })
}

/// Returns true when `m` is orthogonal within `tol`
pub fn is_orthogonal(m: &Matrix3, tol: f64) -> bool {
    approx_eq(&mul(&transpose(m), m), &identity(), tol)
}
