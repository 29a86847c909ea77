/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Reading children, mapping them and tabulating the results

use super::errors::{MappingError, Result};
use super::mapper::StructureMapper;
use super::options::MappingOptions;
use super::orchestrator::map_child_structures_onto_parent_structures;
use super::parents::ParentSelection;
use super::table::ResultTable;
use crate::xtal::{mask_child_structure_atom_types, read_structure_json, Structure, DEFAULT_MASKING_ATOM_TYPE};
use log::info;
use std::path::{Path, PathBuf};

/// Read child structures from structure JSON documents
///
/// Files are identified by their path. Anything that is not a `.json` file
/// is rejected with `UnsupportedChildFormat`.
pub fn get_child_structures<P: AsRef<Path>>(child_paths: &[P]) -> Result<Vec<(String, Structure)>> {
    child_paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let is_json = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(".json"));
            if !is_json {
                return Err(MappingError::UnsupportedChildFormat(path.to_path_buf()));
            }
            Ok((path.display().to_string(), read_structure_json(path)?))
        })
        .collect()
}

/// Map structure files onto parent structures and tabulate the results
///
/// Child atom types are masked before mapping so that only the geometry is
/// compared; bundled and user-supplied parents are masked the same way.
///
/// # Arguments
///
/// * `mapper` - Mapper used for every feasible pair
/// * `child_paths` - Structure JSON files following the project conventions
/// * `parents` - Parent library or POSCAR files
/// * `options` - Mapping options
/// * `quiet` - Suppress per-pair progress
///
/// # Returns
///
/// One row per child and one column group per parent
pub fn map_configurations_onto_parent_structures<M: StructureMapper + ?Sized>(
    mapper: &M,
    child_paths: &[PathBuf],
    parents: &ParentSelection,
    options: &MappingOptions,
    quiet: bool,
) -> Result<ResultTable> {
    let parent_structures = parents.load()?;
    let children = get_child_structures(child_paths)?;
    let masked_children = mask_child_structure_atom_types(&children, DEFAULT_MASKING_ATOM_TYPE);
    info!(
        "Mapping {} structures onto {} parent structures",
        masked_children.len(),
        parent_structures.len()
    );

    let results = map_child_structures_onto_parent_structures(
        mapper,
        &parent_structures,
        &masked_children,
        options,
        quiet,
    )?;
    ResultTable::from_mapping_results(&results)
}
