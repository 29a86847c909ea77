/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Reading `properties.calc.json` / `structure.json` documents

use super::errors::{Result, XtalError};
use super::lattice::Lattice;
use super::structure::{Prim, Structure};
use crate::utils::matrix3::{Matrix3, Vector3};
use ndarray::Array2;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// How `atom_coords` are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CoordinateMode {
    #[serde(alias = "direct", alias = "Fractional", alias = "fractional", alias = "FRAC")]
    Direct,
    #[serde(alias = "cartesian", alias = "CART")]
    Cartesian,
}

/// The subset of a structure document needed to build a structure
///
/// Lattice vectors are given as rows and coordinates one atom per row.
/// Any other keys in the document are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StructureProperties {
    pub lattice_vectors: Matrix3,
    pub atom_coords: Vec<Vector3>,
    pub coordinate_mode: CoordinateMode,
    pub atom_type: Vec<String>,
}

impl StructureProperties {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Lattice, fractional coordinates (3 x N) and atom types
    pub fn structure_info(&self) -> Result<(Lattice, Array2<f64>, Vec<String>)> {
        if self.atom_coords.len() != self.atom_type.len() {
            return Err(XtalError::SiteCountMismatch {
                given: self.atom_type.len(),
                expected: self.atom_coords.len(),
            });
        }

        let lattice = Lattice::from_row_vectors(&self.lattice_vectors)?;
        let mut coords = Array2::zeros((3, self.atom_coords.len()));
        for (index, coord) in self.atom_coords.iter().enumerate() {
            let frac = match self.coordinate_mode {
                CoordinateMode::Direct => *coord,
                CoordinateMode::Cartesian => lattice.cart_to_frac(coord)?,
            };
            for axis in 0..3 {
                coords[[axis, index]] = frac[axis];
            }
        }

        Ok((lattice, coords, self.atom_type.clone()))
    }

    pub fn to_structure(&self) -> Result<Structure> {
        let (lattice, coords, atom_types) = self.structure_info()?;
        Structure::new(lattice, coords, atom_types)
    }

    /// Prim whose sites allow only the atom type listed in the document
    pub fn to_prim(&self) -> Result<Prim> {
        let (lattice, coords, atom_types) = self.structure_info()?;
        let occupants = atom_types.into_iter().map(|atom| vec![atom]).collect();
        Prim::new(lattice, coords, occupants)
    }
}

/// Read a structure document from disk
pub fn read_structure_json<P: AsRef<Path>>(path: P) -> Result<Structure> {
    StructureProperties::from_file(path)?.to_structure()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FCC_CONVENTIONAL: &str = r#"{
        "lattice_vectors": [[3.6, 0.0, 0.0], [0.0, 3.6, 0.0], [0.0, 0.0, 3.6]],
        "atom_coords": [[0.0, 0.0, 0.0], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0]],
        "coordinate_mode": "Direct",
        "atom_type": ["Ni", "Ni", "Al", "Al"],
        "global_vals": {"energy": {"value": -12.0}}
    }"#;

    #[test]
    fn test_direct_coordinates() {
        let structure = StructureProperties::from_json_str(FCC_CONVENTIONAL)
            .unwrap()
            .to_structure()
            .unwrap();
        assert_eq!(structure.atom_count(), 4);
        assert_eq!(structure.atom_types()[2], "Al");
        assert_relative_eq!(structure.lattice().volume(), 3.6f64.powi(3), epsilon = 1e-9);
        assert_relative_eq!(structure.frac_coord(3)[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cartesian_coordinates() {
        let json = r#"{
            "lattice_vectors": [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 2.0]],
            "atom_coords": [[2.0, 1.0, 1.0]],
            "coordinate_mode": "Cartesian",
            "atom_type": ["Zr"]
        }"#;
        let structure = StructureProperties::from_json_str(json)
            .unwrap()
            .to_structure()
            .unwrap();
        let frac = structure.frac_coord(0);
        assert_relative_eq!(frac[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(frac[1], 0.25, epsilon = 1e-12);
        assert_relative_eq!(frac[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let json = r#"{"lattice_vectors": [[1,0,0],[0,1,0],[0,0,1]], "atom_type": []}"#;
        assert!(matches!(
            StructureProperties::from_json_str(json),
            Err(XtalError::JsonError(_))
        ));
    }

    #[test]
    fn test_prim_from_document() {
        let prim = StructureProperties::from_json_str(FCC_CONVENTIONAL)
            .unwrap()
            .to_prim()
            .unwrap();
        assert_eq!(prim.site_count(), 4);
        assert!(prim.allows(0, "Ni"));
    }
}
