/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Configuration names from child structure paths
//!
//! Child structures live in a project directory in one of two shapes:
//!
//! ```text
//! .../training_data/<scel>/<id>/structure.json
//! .../training_data/<scel>/<id>/calctype.<name>/properties.calc.json
//! ```
//!
//! and the configuration name is `<scel>/<id>` in both.

use super::errors::{MappingError, Result};
use std::path::{Component, Path};

pub const STRUCTURE_FILE_NAME: &str = "structure.json";
pub const PROPERTIES_FILE_NAME: &str = "properties.calc.json";
pub const CALCTYPE_PREFIX: &str = "calctype.";

/// A child path recognized as one of the project conventions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildPathConvention<'a> {
    /// `<scel>/<id>/structure.json`
    Unrelaxed { scel: &'a str, id: &'a str },
    /// `<scel>/<id>/calctype.<calctype>/properties.calc.json`
    Relaxed {
        scel: &'a str,
        id: &'a str,
        calctype: &'a str,
    },
}

impl<'a> ChildPathConvention<'a> {
    pub fn parse(child_path: &'a str) -> Result<Self> {
        let parts: Vec<&str> = Path::new(child_path)
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();

        match parts[..] {
            [.., scel, id, STRUCTURE_FILE_NAME] => Ok(Self::Unrelaxed { scel, id }),
            [.., scel, id, calctype_dir, PROPERTIES_FILE_NAME] => match calctype_dir.strip_prefix(CALCTYPE_PREFIX) {
                Some(calctype) => Ok(Self::Relaxed { scel, id, calctype }),
                None => Err(MappingError::UnrecognizedPathConvention(child_path.to_string())),
            },
            _ => Err(MappingError::UnrecognizedPathConvention(child_path.to_string())),
        }
    }

    /// `<scel>/<id>`
    pub fn config_name(&self) -> String {
        match self {
            Self::Unrelaxed { scel, id } | Self::Relaxed { scel, id, .. } => format!("{}/{}", scel, id),
        }
    }
}

/// Configuration name (`<scel>/<id>`) of a child structure path
pub fn config_name_from_child_path(child_path: &str) -> Result<String> {
    Ok(ChildPathConvention::parse(child_path)?.config_name())
}
