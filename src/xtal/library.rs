/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Bundled library of parent crystal prototypes
//!
//! Every prototype is a POSCAR file compiled into the binary. Identifiers look
//! like file paths (`xtallib/frequent/BCC.vasp`) so that their base name can be
//! used as a table column label, the same way user-supplied parent files are.

use super::errors::Result;
use super::poscar::parse_poscar;
use super::structure::{Prim, DEFAULT_MASKING_ATOM_TYPE};

/// A POSCAR file shipped with the crate
#[derive(Debug, Clone, Copy)]
pub struct BundledPrototype {
    pub identifier: &'static str,
    pub contents: &'static str,
}

impl BundledPrototype {
    /// Parse the prototype into a prim with every site masked to the default atom type
    pub fn load(&self) -> Result<Prim> {
        Ok(parse_poscar(self.contents)?
            .into_prim()
            .masked(DEFAULT_MASKING_ATOM_TYPE))
    }
}

/// BCC, FCC, HCP, SC, omega and DHCP
pub const FREQUENT_PROTOTYPES: &[BundledPrototype] = &[
    BundledPrototype {
        identifier: "xtallib/frequent/BCC.vasp",
        contents: include_str!("library/frequent/BCC.vasp"),
    },
    BundledPrototype {
        identifier: "xtallib/frequent/FCC.vasp",
        contents: include_str!("library/frequent/FCC.vasp"),
    },
    BundledPrototype {
        identifier: "xtallib/frequent/HCP.vasp",
        contents: include_str!("library/frequent/HCP.vasp"),
    },
    BundledPrototype {
        identifier: "xtallib/frequent/SC.vasp",
        contents: include_str!("library/frequent/SC.vasp"),
    },
    BundledPrototype {
        identifier: "xtallib/frequent/OMEGA.vasp",
        contents: include_str!("library/frequent/OMEGA.vasp"),
    },
    BundledPrototype {
        identifier: "xtallib/frequent/DHCP.vasp",
        contents: include_str!("library/frequent/DHCP.vasp"),
    },
];

/// Prototypes that are only part of the full library
pub const ADDITIONAL_PROTOTYPES: &[BundledPrototype] = &[
    BundledPrototype {
        identifier: "xtallib/DIAMOND.vasp",
        contents: include_str!("library/DIAMOND.vasp"),
    },
    BundledPrototype {
        identifier: "xtallib/A15.vasp",
        contents: include_str!("library/A15.vasp"),
    },
    BundledPrototype {
        identifier: "xtallib/BETA_SN.vasp",
        contents: include_str!("library/BETA_SN.vasp"),
    },
    BundledPrototype {
        identifier: "xtallib/SIMPLE_HEX.vasp",
        contents: include_str!("library/SIMPLE_HEX.vasp"),
    },
];

/// The frequently encountered parent prototypes with their identifiers
pub fn frequent_parent_structures() -> Result<Vec<(String, Prim)>> {
    load_all(FREQUENT_PROTOTYPES.iter())
}

/// Every bundled parent prototype with its identifier
pub fn all_parent_structures() -> Result<Vec<(String, Prim)>> {
    load_all(FREQUENT_PROTOTYPES.iter().chain(ADDITIONAL_PROTOTYPES))
}

fn load_all<'a>(prototypes: impl Iterator<Item = &'a BundledPrototype>) -> Result<Vec<(String, Prim)>> {
    prototypes
        .map(|prototype| Ok((prototype.identifier.to_string(), prototype.load()?)))
        .collect()
}
