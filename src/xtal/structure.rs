/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Child structures and parent prims

use super::errors::{Result, XtalError};
use super::lattice::Lattice;
use crate::utils::matrix3::Vector3;
use ndarray::Array2;

/// Atom type every child site is replaced with before mapping
pub const DEFAULT_MASKING_ATOM_TYPE: &str = "A";

/// A periodic structure with one atom per site
///
/// This is what child configurations are read into.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    lattice: Lattice,
    /// Fractional coordinates as a 3 x N matrix
    frac_coords: Array2<f64>,
    atom_types: Vec<String>,
}

impl Structure {
    /// Create a structure from fractional coordinates (3 x N) and atom types
    pub fn new(lattice: Lattice, frac_coords: Array2<f64>, atom_types: Vec<String>) -> Result<Self> {
        check_coordinate_shape(&frac_coords, atom_types.len())?;
        Ok(Self {
            lattice,
            frac_coords,
            atom_types,
        })
    }

    /// Create a structure from Cartesian coordinates (3 x N) and atom types
    pub fn from_cartesian(
        lattice: Lattice,
        cart_coords: &Array2<f64>,
        atom_types: Vec<String>,
    ) -> Result<Self> {
        check_coordinate_shape(cart_coords, atom_types.len())?;
        let frac_coords = cartesian_to_fractional(&lattice, cart_coords)?;
        Self::new(lattice, frac_coords, atom_types)
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn frac_coords(&self) -> &Array2<f64> {
        &self.frac_coords
    }

    /// Fractional coordinate of site `index`
    pub fn frac_coord(&self, index: usize) -> Vector3 {
        column_of(&self.frac_coords, index)
    }

    /// Cartesian coordinates as a 3 x N matrix
    pub fn cart_coords(&self) -> Array2<f64> {
        fractional_to_cartesian(&self.lattice, &self.frac_coords)
    }

    pub fn atom_types(&self) -> &[String] {
        &self.atom_types
    }

    /// Number of atoms in the structure
    pub fn atom_count(&self) -> usize {
        self.atom_types.len()
    }

    /// Copy of this structure with new atom types on every site
    pub fn with_atom_types(&self, atom_types: Vec<String>) -> Result<Self> {
        if atom_types.len() != self.atom_count() {
            return Err(XtalError::SiteCountMismatch {
                given: atom_types.len(),
                expected: self.atom_count(),
            });
        }
        Self::new(self.lattice, self.frac_coords.clone(), atom_types)
    }

    /// Copy of this structure with every atom type replaced by `masking_atom_type`
    pub fn masked(&self, masking_atom_type: &str) -> Self {
        Self {
            lattice: self.lattice,
            frac_coords: self.frac_coords.clone(),
            atom_types: vec![masking_atom_type.to_string(); self.atom_count()],
        }
    }
}

/// A primitive parent structure where every site lists its allowed occupants
#[derive(Debug, Clone, PartialEq)]
pub struct Prim {
    lattice: Lattice,
    frac_coords: Array2<f64>,
    occupants: Vec<Vec<String>>,
}

impl Prim {
    pub fn new(lattice: Lattice, frac_coords: Array2<f64>, occupants: Vec<Vec<String>>) -> Result<Self> {
        check_coordinate_shape(&frac_coords, occupants.len())?;
        if occupants.iter().any(|site| site.is_empty()) {
            return Err(XtalError::InvalidStructure(
                "every prim site needs at least one allowed occupant".to_string(),
            ));
        }
        Ok(Self {
            lattice,
            frac_coords,
            occupants,
        })
    }

    /// Build a prim whose sites each allow only the atom found there
    pub fn from_structure(structure: &Structure) -> Self {
        Self {
            lattice: *structure.lattice(),
            frac_coords: structure.frac_coords().clone(),
            occupants: structure
                .atom_types()
                .iter()
                .map(|atom_type| vec![atom_type.clone()])
                .collect(),
        }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn frac_coords(&self) -> &Array2<f64> {
        &self.frac_coords
    }

    pub fn frac_coord(&self, index: usize) -> Vector3 {
        column_of(&self.frac_coords, index)
    }

    /// Allowed occupants per site
    pub fn occupants(&self) -> &[Vec<String>] {
        &self.occupants
    }

    /// Number of sites in the prim
    pub fn site_count(&self) -> usize {
        self.occupants.len()
    }

    /// Whether `atom_type` may occupy site `index`
    pub fn allows(&self, index: usize, atom_type: &str) -> bool {
        self.occupants
            .get(index)
            .is_some_and(|site| site.iter().any(|occupant| occupant == atom_type))
    }

    /// Copy of this prim with new allowed occupants on every site
    pub fn with_occupants(&self, occupants: Vec<Vec<String>>) -> Result<Self> {
        if occupants.len() != self.site_count() {
            return Err(XtalError::SiteCountMismatch {
                given: occupants.len(),
                expected: self.site_count(),
            });
        }
        Self::new(self.lattice, self.frac_coords.clone(), occupants)
    }

    /// Copy of this prim where every site only allows `masking_atom_type`
    pub fn masked(&self, masking_atom_type: &str) -> Self {
        Self {
            lattice: self.lattice,
            frac_coords: self.frac_coords.clone(),
            occupants: vec![vec![masking_atom_type.to_string()]; self.site_count()],
        }
    }
}

/// Replace the atom types of every child structure with `masking_atom_type`
pub fn mask_child_structure_atom_types(
    children: &[(String, Structure)],
    masking_atom_type: &str,
) -> Vec<(String, Structure)> {
    children
        .iter()
        .map(|(id, structure)| (id.clone(), structure.masked(masking_atom_type)))
        .collect()
}

fn check_coordinate_shape(coords: &Array2<f64>, site_count: usize) -> Result<()> {
    if coords.nrows() != 3 || coords.ncols() != site_count {
        return Err(XtalError::InvalidStructure(format!(
            "expected a 3 x {} coordinate matrix, got {} x {}",
            site_count,
            coords.nrows(),
            coords.ncols()
        )));
    }
    Ok(())
}

fn column_of(coords: &Array2<f64>, index: usize) -> Vector3 {
    [coords[[0, index]], coords[[1, index]], coords[[2, index]]]
}

/// Convert a 3 x N matrix of Cartesian coordinates to fractional coordinates
pub fn cartesian_to_fractional(lattice: &Lattice, cart: &Array2<f64>) -> Result<Array2<f64>> {
    let inverse = lattice.inverse()?;
    let mut frac = Array2::zeros(cart.raw_dim());
    for (index, column) in cart.columns().into_iter().enumerate() {
        let converted = crate::utils::matrix3::mul_vec(&inverse, &[column[0], column[1], column[2]]);
        for axis in 0..3 {
            frac[[axis, index]] = converted[axis];
        }
    }
    Ok(frac)
}

/// Convert a 3 x N matrix of fractional coordinates to Cartesian coordinates
pub fn fractional_to_cartesian(lattice: &Lattice, frac: &Array2<f64>) -> Array2<f64> {
    let mut cart = Array2::zeros(frac.raw_dim());
    for (index, column) in frac.columns().into_iter().enumerate() {
        let converted = lattice.frac_to_cart(&[column[0], column[1], column[2]]);
        for axis in 0..3 {
            cart[[axis, index]] = converted[axis];
        }
    }
    cart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::matrix3;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn cubic(a: f64) -> Lattice {
        Lattice::new(matrix3::scale(&matrix3::identity(), a)).unwrap()
    }

    #[test]
    fn test_structure_creation() {
        let coords = array![[0.0, 0.5], [0.0, 0.5], [0.0, 0.5]];
        let structure =
            Structure::new(cubic(3.0), coords, vec!["Fe".to_string(), "Fe".to_string()]).unwrap();
        assert_eq!(structure.atom_count(), 2);

        let cart = structure.cart_coords();
        assert_relative_eq!(cart[[0, 1]], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_mismatched_atom_types() {
        let coords = array![[0.0, 0.5], [0.0, 0.5], [0.0, 0.5]];
        assert!(Structure::new(cubic(3.0), coords, vec!["Fe".to_string()]).is_err());
    }

    #[test]
    fn test_cartesian_construction() {
        let cart = array![[1.5], [0.0], [0.75]];
        let structure = Structure::from_cartesian(cubic(3.0), &cart, vec!["Ni".to_string()]).unwrap();
        let frac = structure.frac_coord(0);
        assert_relative_eq!(frac[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(frac[2], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_masking() {
        let coords = array![[0.0, 0.5], [0.0, 0.5], [0.0, 0.5]];
        let structure =
            Structure::new(cubic(3.0), coords, vec!["Fe".to_string(), "Co".to_string()]).unwrap();
        let masked = structure.masked(DEFAULT_MASKING_ATOM_TYPE);
        assert!(masked.atom_types().iter().all(|t| t == "A"));
        assert_eq!(masked.frac_coords(), structure.frac_coords());

        assert!(structure.with_atom_types(vec!["A".to_string()]).is_err());
    }

    #[test]
    fn test_prim_occupants() {
        let coords = array![[0.0], [0.0], [0.0]];
        let structure = Structure::new(cubic(2.0), coords, vec!["Cu".to_string()]).unwrap();
        let prim = Prim::from_structure(&structure);
        assert_eq!(prim.site_count(), 1);
        assert!(prim.allows(0, "Cu"));
        assert!(!prim.allows(0, "A"));
        assert!(prim.masked("A").allows(0, "A"));
        assert!(prim.with_occupants(vec![vec![]]).is_err());
    }
}
