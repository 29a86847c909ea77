/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Choosing the parent structures to map onto

use super::errors::{MappingError, Result};
use crate::xtal::{all_parent_structures, frequent_parent_structures, read_poscar, Prim, DEFAULT_MASKING_ATOM_TYPE};
use log::debug;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A named collection of bundled parent prototypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLibrary {
    /// BCC, FCC, HCP, SC, omega and DHCP (also accepted as `common`)
    Frequent,
    /// Every bundled prototype
    All,
}

impl FromStr for ParentLibrary {
    type Err = MappingError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "frequent" | "common" => Ok(Self::Frequent),
            "all" => Ok(Self::All),
            other => Err(MappingError::InvalidParentLibrary(other.to_string())),
        }
    }
}

impl fmt::Display for ParentLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frequent => write!(f, "frequent"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Parents given either as a bundled library or as POSCAR files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentSelection {
    Library(ParentLibrary),
    Files(Vec<PathBuf>),
}

impl ParentSelection {
    /// Load the parents as `(identifier, prim)` pairs with every site masked
    pub fn load(&self) -> Result<Vec<(String, Prim)>> {
        let parents = match self {
            Self::Library(ParentLibrary::Frequent) => frequent_parent_structures()?,
            Self::Library(ParentLibrary::All) => all_parent_structures()?,
            Self::Files(paths) => paths
                .iter()
                .map(|path| {
                    let prim = read_poscar(path)?.into_prim().masked(DEFAULT_MASKING_ATOM_TYPE);
                    Ok((path.display().to_string(), prim))
                })
                .collect::<Result<Vec<_>>>()?,
        };
        debug!("loaded {} parent structures", parents.len());
        Ok(parents)
    }
}
