/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Factor groups of structures and prims
//!
//! A factor group operation is a point operation of the lattice combined with
//! a fractional translation such that every site lands on a site holding the
//! same species (or the same allowed occupants for a prim).

use super::errors::Result;
use super::lattice::Lattice;
use super::structure::{Prim, Structure};
use crate::utils::matrix3::{self, IMatrix3, Matrix3, Vector3};

/// Default Cartesian tolerance for symmetry and site comparisons
pub const DEFAULT_XTAL_TOL: f64 = 1e-4;

/// A symmetry operation `x -> R x + t`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymOp {
    /// Rotation acting on fractional coordinates of the owning lattice
    pub frac_rotation: IMatrix3,
    /// Rotation acting on Cartesian coordinates
    pub cart_rotation: Matrix3,
    /// Translation in fractional coordinates, wrapped into [0, 1)
    pub frac_translation: Vector3,
}

impl SymOp {
    pub fn identity() -> Self {
        Self {
            frac_rotation: matrix3::int_identity(),
            cart_rotation: matrix3::identity(),
            frac_translation: [0.0; 3],
        }
    }

    /// Image of a fractional coordinate
    pub fn apply_frac(&self, frac: &Vector3) -> Vector3 {
        let rotated = matrix3::mul_vec(&matrix3::to_real(&self.frac_rotation), frac);
        matrix3::vec_add(&rotated, &self.frac_translation)
    }
}

/// Factor group of a child structure
pub fn make_structure_factor_group(structure: &Structure, tol: f64) -> Result<Vec<SymOp>> {
    let keys: Vec<String> = structure.atom_types().to_vec();
    let coords: Vec<Vector3> = (0..structure.atom_count())
        .map(|i| structure.frac_coord(i))
        .collect();
    factor_group(structure.lattice(), &coords, &keys, tol)
}

/// Factor group of a parent prim
pub fn make_prim_factor_group(prim: &Prim, tol: f64) -> Result<Vec<SymOp>> {
    let keys: Vec<String> = prim
        .occupants()
        .iter()
        .map(|occupants| {
            let mut sorted = occupants.clone();
            sorted.sort();
            sorted.join(",")
        })
        .collect();
    let coords: Vec<Vector3> = (0..prim.site_count()).map(|i| prim.frac_coord(i)).collect();
    factor_group(prim.lattice(), &coords, &keys, tol)
}

/// Distinct Cartesian rotations of a factor group
pub fn point_group_of(factor_group: &[SymOp], tol: f64) -> Vec<Matrix3> {
    let mut rotations: Vec<Matrix3> = Vec::new();
    for op in factor_group {
        if !rotations
            .iter()
            .any(|existing| matrix3::approx_eq(existing, &op.cart_rotation, tol))
        {
            rotations.push(op.cart_rotation);
        }
    }
    rotations
}

/// Wrap a fractional coordinate difference into [-0.5, 0.5)
pub fn wrap_difference(diff: &Vector3) -> Vector3 {
    [
        diff[0] - diff[0].round(),
        diff[1] - diff[1].round(),
        diff[2] - diff[2].round(),
    ]
}

/// Wrap a fractional coordinate into [0, 1)
pub fn wrap_coordinate(frac: &Vector3) -> Vector3 {
    let mut wrapped = [frac[0] - frac[0].floor(), frac[1] - frac[1].floor(), frac[2] - frac[2].floor()];
    for value in wrapped.iter_mut() {
        if *value >= 1.0 - 1e-12 {
            *value = 0.0;
        }
    }
    wrapped
}

fn factor_group(lattice: &Lattice, coords: &[Vector3], keys: &[String], tol: f64) -> Result<Vec<SymOp>> {
    if coords.is_empty() {
        return Ok(vec![SymOp::identity()]);
    }

    let column_vectors = lattice.column_vectors();
    let inverse = lattice.inverse()?;
    let mut operations = Vec::new();

    for cart_rotation in lattice.point_group(tol)? {
        let frac_real = matrix3::mul(&matrix3::mul(&inverse, &cart_rotation), column_vectors);
        let Some(frac_rotation) = matrix3::round_to_int(&frac_real, 1e-3) else {
            continue;
        };
        let rotation_real = matrix3::to_real(&frac_rotation);
        let rotated_origin = matrix3::mul_vec(&rotation_real, &coords[0]);

        let mut translations: Vec<Vector3> = Vec::new();
        for (target, key) in coords.iter().zip(keys) {
            if key != &keys[0] {
                continue;
            }
            let translation = wrap_coordinate(&matrix3::vec_sub(target, &rotated_origin));
            if translations.iter().any(|existing| {
                let diff = wrap_difference(&matrix3::vec_sub(existing, &translation));
                matrix3::norm_sq(&lattice.frac_to_cart(&diff)).sqrt() <= tol
            }) {
                continue;
            }

            let maps_every_site = coords.iter().zip(keys).all(|(site, site_key)| {
                let image = matrix3::vec_add(&matrix3::mul_vec(&rotation_real, site), &translation);
                coords.iter().zip(keys).any(|(other, other_key)| {
                    if other_key != site_key {
                        return false;
                    }
                    let diff = wrap_difference(&matrix3::vec_sub(&image, other));
                    matrix3::norm_sq(&lattice.frac_to_cart(&diff)).sqrt() <= tol
                })
            });

            if maps_every_site {
                translations.push(translation);
                operations.push(SymOp {
                    frac_rotation,
                    cart_rotation,
                    frac_translation: translation,
                });
            }
        }
    }

    Ok(operations)
}
