/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Crystal structure models and readers
//!
//! This module provides lattices, child structures and parent prims, readers
//! for structure JSON documents and POSCAR files, factor group construction
//! and the bundled parent prototype library.

pub mod errors;
pub mod lattice;
pub mod library;
pub mod poscar;
pub mod properties;
pub mod structure;
pub mod symmetry;

pub use errors::{Result, XtalError};
pub use lattice::Lattice;
pub use library::{all_parent_structures, frequent_parent_structures};
pub use poscar::{parse_poscar, read_poscar, Poscar};
pub use properties::{read_structure_json, CoordinateMode, StructureProperties};
pub use structure::{mask_child_structure_atom_types, Prim, Structure, DEFAULT_MASKING_ATOM_TYPE};
pub use symmetry::{make_prim_factor_group, make_structure_factor_group, SymOp, DEFAULT_XTAL_TOL};
