/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Mapping options
//!
//! The defaults are the settings every (child, parent) pair is mapped with.
//! A JSON settings file may override any subset of them:
//!
//! ```json
//! { "max_cost": 0.2, "strain_cost_method": "isotropic_strain_cost" }
//! ```

use super::errors::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the lattice deformation is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrainCostMethod {
    /// Full strain of the volume-normalized stretch tensor
    #[serde(rename = "isotropic_strain_cost")]
    Isotropic,
    /// Strain left after removing the part invariant under the parent point group
    #[serde(rename = "symmetry_breaking_strain_cost")]
    SymmetryBreaking,
}

/// How atomic displacements are scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtomCostMethod {
    /// Mean squared displacement
    #[serde(rename = "isotropic_atom_cost")]
    Isotropic,
    /// Mean squared displacement after removing the symmetry-preserving part
    #[serde(rename = "symmetry_breaking_atom_cost")]
    SymmetryBreaking,
}

/// Options passed to a structure mapper for one (child, parent) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingOptions {
    /// Use the parent factor group to skip equivalent lattice mappings
    pub use_parent_symmetry: bool,

    /// Use the child factor group to skip equivalent lattice mappings
    pub use_child_symmetry: bool,

    /// Lowest total cost kept
    pub min_cost: f64,

    /// Highest total cost kept
    pub max_cost: f64,

    pub strain_cost_method: StrainCostMethod,

    pub atom_cost_method: AtomCostMethod,

    /// Weight `w` in `total = w * lattice + (1 - w) * atomic`
    pub lattice_cost_weight: f64,

    /// Number of lowest-cost results kept per pair (ties within `cost_tol` are added)
    pub k_best: usize,

    /// Tolerance for ties at the `k_best` cutoff
    pub cost_tol: f64,

    /// Cartesian tolerance used for symmetry analysis
    pub tolerance: f64,
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            use_parent_symmetry: true,
            use_child_symmetry: true,
            min_cost: -0.0001,
            max_cost: 0.1,
            strain_cost_method: StrainCostMethod::SymmetryBreaking,
            atom_cost_method: AtomCostMethod::SymmetryBreaking,
            lattice_cost_weight: 0.5,
            k_best: 1,
            cost_tol: 1e-5,
            tolerance: crate::xtal::DEFAULT_XTAL_TOL,
        }
    }
}

impl MappingOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read options from a JSON settings file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
