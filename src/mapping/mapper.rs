/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! The structure mapper seam
//!
//! The orchestrator only talks to mappers through [`StructureMapper`]. The
//! crate ships [`LatticeMapper`](super::lattice_mapper::LatticeMapper) as its
//! implementation; tests substitute scripted mappers.

use super::errors::Result;
use super::options::MappingOptions;
use crate::utils::matrix3::{IMatrix3, Matrix3, Vector3};
use crate::xtal::{Prim, Structure, SymOp};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Everything a mapper needs to map one child onto one parent
#[derive(Debug, Clone, Copy)]
pub struct MappingRequest<'a> {
    pub parent: &'a Prim,
    pub child: &'a Structure,
    /// Volume of the parent supercells to consider, in units of the prim volume
    pub max_vol: usize,
    pub parent_factor_group: &'a [SymOp],
    pub child_factor_group: &'a [SymOp],
    pub options: &'a MappingOptions,
}

/// Costs of one structure mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappingCost {
    pub lattice_cost: f64,
    pub atom_cost: f64,
    pub total_cost: f64,
}

/// How the parent lattice is deformed onto the child lattice
///
/// `F L_parent T N = L_child`, with `F = Q U = V Q`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeMapping {
    pub deformation_gradient: Matrix3,
    pub transformation_matrix_to_super: IMatrix3,
    pub reorientation: IMatrix3,
    pub isometry: Matrix3,
    pub left_stretch: Matrix3,
}

/// How parent supercell sites are paired with child atoms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomMapping {
    /// Cartesian displacement per supercell site, in the parent frame (3 x N)
    pub displacement: Array2<f64>,
    /// `permutation[site]` is the child atom placed on that supercell site
    pub permutation: Vec<usize>,
    /// Cartesian translation applied to the child, in the deformed frame
    pub translation: Vector3,
}

/// One complete mapping of a child onto a parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureMapping {
    pub cost: MappingCost,
    pub lattice: LatticeMapping,
    pub atoms: AtomMapping,
}

/// Finds low-cost mappings of a child structure onto a parent prim
pub trait StructureMapper {
    /// Return the mappings of `request.child` onto `request.parent` whose
    /// total cost lies within the option bounds, lowest cost first
    ///
    /// An empty result means no mapping was found and is not an error.
    fn map_structures(&self, request: &MappingRequest<'_>) -> Result<Vec<StructureMapping>>;
}
