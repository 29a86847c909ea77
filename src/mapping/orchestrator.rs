/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Mapping every child structure onto every parent structure

use super::errors::Result;
use super::mapper::{MappingRequest, StructureMapper};
use super::options::MappingOptions;
use super::record::MappingRecord;
use crate::xtal::{make_prim_factor_group, make_structure_factor_group, Prim, Structure};
use log::{info, warn};

/// Mapping records per child, then per parent, then per mapping found
pub type NestedMappingResults = Vec<Vec<Vec<MappingRecord>>>;

/// Parent supercell volume needed to hold every child atom
///
/// Parent supercells are enumerated but child supercells are not, so a child
/// can only be mapped when its atom count is a multiple of the parent site count.
///
/// # Returns
///
/// `atom_count(child) / site_count(parent)` when it divides evenly, `None` otherwise
pub fn max_vol(parent: &Prim, child: &Structure) -> Option<usize> {
    let sites = parent.site_count();
    if sites == 0 || child.atom_count() % sites != 0 {
        return None;
    }
    Some(child.atom_count() / sites)
}

/// Map every child onto every parent
///
/// Structures are expected to carry the atom types they should be compared
/// with (see [`mask_child_structure_atom_types`](crate::xtal::mask_child_structure_atom_types)).
/// Each pair produces at least one record: when the child cannot be mapped,
/// or the mapper finds nothing, a single undefined record stands in.
///
/// # Arguments
///
/// * `mapper` - Mapper invoked once per feasible pair
/// * `parents` - `(identifier, prim)` pairs
/// * `children` - `(identifier, structure)` pairs
/// * `options` - Options handed to the mapper
/// * `quiet` - Suppress the progress line after each pair
///
/// # Returns
///
/// Records ordered child-major, then parent, then as returned by the mapper
pub fn map_child_structures_onto_parent_structures<M: StructureMapper + ?Sized>(
    mapper: &M,
    parents: &[(String, Prim)],
    children: &[(String, Structure)],
    options: &MappingOptions,
    quiet: bool,
) -> Result<NestedMappingResults> {
    let tol = options.tolerance;
    let parent_factor_groups = parents
        .iter()
        .map(|(_, prim)| make_prim_factor_group(prim, tol))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut results = Vec::with_capacity(children.len());
    for (child_id, child) in children {
        let child_factor_group = make_structure_factor_group(child, tol)?;

        let mut results_for_child = Vec::with_capacity(parents.len());
        for ((parent_id, parent), parent_factor_group) in parents.iter().zip(&parent_factor_groups) {
            let mappings = match max_vol(parent, child) {
                Some(volume) => mapper.map_structures(&MappingRequest {
                    parent,
                    child,
                    max_vol: volume,
                    parent_factor_group,
                    child_factor_group: &child_factor_group,
                    options,
                })?,
                None => {
                    warn!(
                        "Skipping {} onto {}: {} atoms do not fill supercells of {} sites",
                        child_id,
                        parent_id,
                        child.atom_count(),
                        parent.site_count()
                    );
                    Vec::new()
                }
            };

            let records = if mappings.is_empty() {
                vec![MappingRecord::undefined(parent_id.as_str(), child_id.as_str())]
            } else {
                mappings
                    .into_iter()
                    .map(|mapping| {
                        MappingRecord::from_structure_mapping(mapping, parent_id.as_str(), child_id.as_str())
                    })
                    .collect()
            };

            if !quiet {
                info!("Finished mapping {} to {}...", child_id, parent_id);
            }
            results_for_child.push(records);
        }
        results.push(results_for_child);
    }

    Ok(results)
}
