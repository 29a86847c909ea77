/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Project directory conventions
//!
//! A project is a directory containing a `.casm` marker directory. Structure
//! files of configuration `<config>` are found at
//! `training_data/<config>/calctype.<calctype>/properties.calc.json` once
//! relaxed, and at `training_data/<config>/structure.json` before.

use super::config_name::{CALCTYPE_PREFIX, PROPERTIES_FILE_NAME, STRUCTURE_FILE_NAME};
use super::errors::{MappingError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory marking the root of a project
pub const PROJECT_MARKER: &str = ".casm";

/// Directory holding calculation data below the project root
pub const TRAINING_DATA_DIR: &str = "training_data";

/// Which structure file to read for each configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildPathOptions {
    /// Calculation type whose relaxed properties are read
    pub calctype: String,
    /// Read relaxed properties instead of the initial structure
    pub relaxed: bool,
}

impl Default for ChildPathOptions {
    fn default() -> Self {
        Self {
            calctype: "default".to_string(),
            relaxed: true,
        }
    }
}

/// Walk up from `start` until a directory containing `.casm` is found
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_MARKER).is_dir())
        .map(Path::to_path_buf)
        .ok_or_else(|| MappingError::NotInProject(start.to_path_buf()))
}

/// Project root above the current working directory
pub fn current_project_root() -> Result<PathBuf> {
    find_project_root(&env::current_dir()?)
}

/// Structure file paths of `config_names` below `project_root`
pub fn properties_json_paths(
    project_root: &Path,
    config_names: &[String],
    options: &ChildPathOptions,
) -> Vec<PathBuf> {
    config_names
        .iter()
        .map(|name| {
            let config_dir = project_root.join(TRAINING_DATA_DIR).join(name);
            if options.relaxed {
                config_dir
                    .join(format!("{}{}", CALCTYPE_PREFIX, options.calctype))
                    .join(PROPERTIES_FILE_NAME)
            } else {
                config_dir.join(STRUCTURE_FILE_NAME)
            }
        })
        .collect()
}

/// Structure file paths of `config_names` in the project around the working directory
pub fn get_properties_json_paths(config_names: &[String], options: &ChildPathOptions) -> Result<Vec<PathBuf>> {
    let root = current_project_root()?;
    Ok(properties_json_paths(&root, config_names, options))
}

#[derive(Debug, Deserialize)]
struct ConfigurationEntry {
    name: String,
}

/// Configuration names from a JSON list of `{"name": ...}` objects
///
/// Other keys of each object are ignored.
pub fn read_config_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    let entries: Vec<ConfigurationEntry> = serde_json::from_str(&contents)?;
    Ok(entries.into_iter().map(|entry| entry.name).collect())
}
