/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Mapping records: the result of mapping one child onto one parent

use super::mapper::{AtomMapping, LatticeMapping, StructureMapping};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier used when the source of a structure is unknown
pub const UNKNOWN_SOURCE: &str = "not available";

/// Geometric payload of a defined mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingGeometry {
    pub lattice: LatticeMapping,
    pub atoms: AtomMapping,
}

/// Result of mapping one child onto one parent
///
/// A record is undefined when no mapping was found. Undefined records have
/// NaN costs and no geometry; defined records always carry the full geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    parent_id: String,
    child_id: String,
    atomic_cost: f64,
    lattice_cost: f64,
    total_cost: f64,
    geometry: Option<MappingGeometry>,
}

impl MappingRecord {
    /// Placeholder for a pair that could not be mapped
    pub fn undefined(parent_id: impl Into<String>, child_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            child_id: child_id.into(),
            atomic_cost: f64::NAN,
            lattice_cost: f64::NAN,
            total_cost: f64::NAN,
            geometry: None,
        }
    }

    /// Convert a mapper result
    ///
    /// A mapping whose total cost is NaN becomes an undefined record.
    pub fn from_structure_mapping(
        mapping: StructureMapping,
        parent_id: impl Into<String>,
        child_id: impl Into<String>,
    ) -> Self {
        if mapping.cost.total_cost.is_nan() {
            return Self::undefined(parent_id, child_id);
        }
        Self {
            parent_id: parent_id.into(),
            child_id: child_id.into(),
            atomic_cost: mapping.cost.atom_cost,
            lattice_cost: mapping.cost.lattice_cost,
            total_cost: mapping.cost.total_cost,
            geometry: Some(MappingGeometry {
                lattice: mapping.lattice,
                atoms: mapping.atoms,
            }),
        }
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn child_id(&self) -> &str {
        &self.child_id
    }

    pub fn atomic_cost(&self) -> f64 {
        self.atomic_cost
    }

    pub fn lattice_cost(&self) -> f64 {
        self.lattice_cost
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn geometry(&self) -> Option<&MappingGeometry> {
        self.geometry.as_ref()
    }

    /// True when no mapping was found for this pair
    pub fn is_undefined(&self) -> bool {
        self.total_cost.is_nan()
    }
}

impl fmt::Display for MappingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total mapping cost is: {}", self.total_cost)
    }
}
